// Domain errors - Error types for the domain layer
//
// The Display text of each variant is what a user sees in an `Error` event,
// so the wording here is part of the contract with callers.

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required request field was left empty
    #[error("Missing {0}.")]
    MissingField(&'static str),

    /// Start/end outside the video or in the wrong order
    #[error("Invalid start/end time: {0}")]
    InvalidTimeRange(String),

    /// Metadata lookup failed
    #[error("Failed to fetch video info: {0}")]
    FetchFailed(String),

    /// The download finished but no output file carries the temporary name
    #[error("Downloaded file not found.")]
    DownloadedFileNotFound,

    /// An external executable could not be located
    #[error("{tool} not found. Please ensure it is installed and in your system PATH.")]
    ToolMissing { tool: String },

    /// An external executable exited unsuccessfully
    #[error("{tool} error: {diagnostic}")]
    ToolFailed { tool: String, diagnostic: String },

    /// A stage exceeded its configured time limit
    #[error("{stage} timed out after {seconds} seconds.")]
    TimedOut { stage: &'static str, seconds: u64 },

    /// Filesystem failure (directory creation, spawning, reading output)
    #[error("{0}")]
    Io(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
