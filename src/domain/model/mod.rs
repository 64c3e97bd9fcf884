// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::rules::{ClipNaming, RequestValidator};
use crate::utils::time::seconds_to_hms;

/// Metadata of a remote video, produced once per lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    pub duration_seconds: u64,
    pub thumbnail_url: Option<String>,
}

impl VideoInfo {
    /// Create new video info
    pub fn new(title: impl Into<String>, duration_seconds: u64, thumbnail_url: Option<String>) -> Self {
        Self {
            title: title.into(),
            duration_seconds,
            thumbnail_url,
        }
    }

    /// Duration formatted as `HH:MM:SS`
    pub fn duration_hms(&self) -> String {
        seconds_to_hms(Some(self.duration_seconds))
    }
}

/// Kind of clip to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Stream-copied video with audio
    Video,
    /// Audio track only
    Audio,
    /// Re-encoded animated image
    AnimatedImage,
}

impl OutputFormat {
    /// File extension of the produced clip
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Video => "mp4",
            OutputFormat::Audio => "mp3",
            OutputFormat::AnimatedImage => "gif",
        }
    }

    /// Short label shown in status messages
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Video => "MP4",
            OutputFormat::Audio => "MP3",
            OutputFormat::AnimatedImage => "GIF",
        }
    }

    /// Parse format from string (`video`/`mp4`, `audio`/`mp3`, `gif`/`animated_image`)
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "video" | "mp4" => Ok(OutputFormat::Video),
            "audio" | "mp3" => Ok(OutputFormat::Audio),
            "gif" | "animated_image" | "animated-image" => Ok(OutputFormat::AnimatedImage),
            other => Err(DomainError::Config(format!(
                "Unsupported output format: {}. Valid formats: video, audio, gif",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated request to produce one clip.
///
/// Only constructible through [`ClipRequest::new`], which enforces
/// `0 <= start < end <= duration` and non-empty URL and output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRequest {
    source_url: String,
    output_directory: PathBuf,
    start_seconds: u64,
    end_seconds: u64,
    output_format: OutputFormat,
    video_title: String,
}

impl ClipRequest {
    /// Create new clip request with validation against the fetched metadata
    pub fn new(
        source_url: impl Into<String>,
        output_directory: impl Into<PathBuf>,
        start_seconds: u64,
        end_seconds: u64,
        output_format: OutputFormat,
        info: &VideoInfo,
    ) -> Result<Self, DomainError> {
        let source_url = source_url.into().trim().to_string();
        let output_directory = output_directory.into();

        RequestValidator::validate_inputs(&source_url, &output_directory)?;
        RequestValidator::validate_range(start_seconds, end_seconds, info.duration_seconds)?;

        Ok(Self {
            source_url,
            output_directory,
            start_seconds,
            end_seconds,
            output_format,
            video_title: info.title.clone(),
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn start_seconds(&self) -> u64 {
        self.start_seconds
    }

    pub fn end_seconds(&self) -> u64 {
        self.end_seconds
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn video_title(&self) -> &str {
        &self.video_title
    }

    /// Start as `HH:MM:SS`
    pub fn start_hms(&self) -> String {
        seconds_to_hms(Some(self.start_seconds))
    }

    /// End as `HH:MM:SS`
    pub fn end_hms(&self) -> String {
        seconds_to_hms(Some(self.end_seconds))
    }

    /// Where the finished clip will be written
    pub fn output_path(&self) -> PathBuf {
        self.output_directory.join(ClipNaming::clip_file_name(
            &self.video_title,
            self.start_seconds,
            self.end_seconds,
            self.output_format,
        ))
    }

    /// Build the trim/transcode job for a downloaded input file
    pub fn clip_job(&self, input_path: PathBuf) -> ClipJob {
        ClipJob {
            input_path,
            output_path: self.output_path(),
            start_time: self.start_hms(),
            end_time: self.end_hms(),
            format: self.output_format,
        }
    }
}

/// One invocation of the media tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Seek point, `HH:MM:SS`
    pub start_time: String,
    /// Cut point, `HH:MM:SS`
    pub end_time: String,
    pub format: OutputFormat,
}

/// Result of a download that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Full media written to this path
    Completed(PathBuf),
    /// Stopped because the job was cancelled
    Cancelled,
}

/// Status events delivered to the caller of a job, in order.
///
/// `Finished`, `Error` and `Cancelled` are terminal: exactly one of them ends
/// every job and nothing follows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProgressEvent {
    Downloading { percent: f64 },
    Clipping { message: String },
    Info { message: String },
    Finished { message: String },
    Error { message: String },
    Cancelled { message: String },
}

impl ProgressEvent {
    pub fn info(message: impl Into<String>) -> Self {
        ProgressEvent::Info {
            message: message.into(),
        }
    }

    pub fn clipping(message: impl Into<String>) -> Self {
        ProgressEvent::Clipping {
            message: message.into(),
        }
    }

    pub fn finished(message: impl Into<String>) -> Self {
        ProgressEvent::Finished {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ProgressEvent::Error {
            message: message.into(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        ProgressEvent::Cancelled {
            message: message.into(),
        }
    }

    /// Whether this event ends the job
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Finished { .. } | ProgressEvent::Error { .. } | ProgressEvent::Cancelled { .. }
        )
    }

    /// Text payload, if the variant carries one
    pub fn message(&self) -> Option<&str> {
        match self {
            ProgressEvent::Downloading { .. } => None,
            ProgressEvent::Clipping { message }
            | ProgressEvent::Info { message }
            | ProgressEvent::Finished { message }
            | ProgressEvent::Error { message }
            | ProgressEvent::Cancelled { message } => Some(message),
        }
    }
}

/// Lifecycle of a pipeline job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Idle,
    Downloading,
    DownloadedAwaitingClip,
    Clipping,
    Cancelled,
    DownloadFailed,
    Finished,
    ClipFailed,
}

impl JobState {
    /// Whether the job can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Cancelled | JobState::DownloadFailed | JobState::Finished | JobState::ClipFailed
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
