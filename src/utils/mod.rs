//! Common utilities and helpers

pub mod logging;
pub mod path;
pub mod time;

pub use path::sanitize_filename;
pub use time::{hms_to_seconds, seconds_to_hms};
