// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Receiver of job events raised inside adapters
pub trait ProgressCallback: Send + Sync {
    /// Called for every progress or status event, in order
    fn on_event(&self, event: ProgressEvent);
}

impl<F> ProgressCallback for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Port for metadata lookup and media download
#[async_trait]
pub trait FetchPort: Send + Sync {
    /// Look up title, duration and thumbnail without downloading the media
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, DomainError>;

    /// Download the best available media into `destination_dir`.
    ///
    /// Emits `Downloading` events while the total size is known and checks
    /// `cancel` at every progress tick. Cancellation is reported as
    /// `Ok(DownloadOutcome::Cancelled)`, never as an error.
    async fn download(
        &self,
        url: &str,
        destination_dir: &Path,
        progress: &dyn ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<DownloadOutcome, DomainError>;
}

/// Port for the external trim/transcode tool
#[async_trait]
pub trait MediaToolPort: Send + Sync {
    /// Produce `job.output_path` from `job.input_path`.
    ///
    /// Emits one `Clipping` event before invoking the tool and returns the
    /// success message. The input file is removed whatever the outcome.
    async fn run(&self, job: &ClipJob, progress: &dyn ProgressCallback) -> Result<String, DomainError>;
}
