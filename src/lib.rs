//! clipfetch library
//!
//! Fetches metadata for a web video, downloads it with `yt-dlp`, and trims
//! the selected range with `ffmpeg` into a video, audio or GIF clip. The
//! download -> clip pipeline runs as one tokio task per job and reports its
//! progress through an ordered event stream.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{JobHandle, PipelineOrchestrator, PipelineSettings};
pub use domain::errors::DomainError;
pub use domain::model::{
    ClipJob, ClipRequest, DownloadOutcome, JobState, OutputFormat, ProgressEvent, VideoInfo,
};
pub use ports::{FetchPort, MediaToolPort, ProgressCallback};
pub use utils::{hms_to_seconds, sanitize_filename, seconds_to_hms};
