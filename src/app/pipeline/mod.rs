// Pipeline interactor - Orchestrates the download -> clip use case
//
// Every submitted request runs as its own tokio task. Events reach the caller
// through an unbounded channel that closes after the job's terminal event.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::adapters::toml_config::AppConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

pub const STARTING_DOWNLOAD: &str = "Starting download...";
pub const DOWNLOAD_COMPLETE: &str = "Download complete. Starting clip...";
pub const DOWNLOAD_CANCELLED: &str = "Download cancelled.";

/// Identifier of one submitted job
pub type JobId = u64;

/// Receiving end of a job's event stream
pub type EventReceiver = mpsc::UnboundedReceiver<ProgressEvent>;

/// Optional limits on each stage; `None` waits indefinitely
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSettings {
    pub download_timeout: Option<Duration>,
    pub clip_timeout: Option<Duration>,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            download_timeout: config.download_timeout(),
            clip_timeout: config.clip_timeout(),
        }
    }
}

/// Handle to one in-flight job
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    cancel: CancellationToken,
    state: watch::Receiver<JobState>,
    task: JoinHandle<JobState>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Request cancellation. Only honoured while the job is downloading.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Current state of the job
    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    /// Wait for the job to end and return its terminal state
    pub async fn wait(self) -> JobState {
        match self.task.await {
            Ok(state) => state,
            Err(e) => {
                error!(job = self.id, "Pipeline task failed: {}", e);
                JobState::ClipFailed
            }
        }
    }
}

/// Interactor for the download -> clip use case
pub struct PipelineOrchestrator {
    fetch_port: Arc<dyn FetchPort>,
    media_tool_port: Arc<dyn MediaToolPort>,
    settings: PipelineSettings,
    next_job_id: AtomicU64,
}

impl PipelineOrchestrator {
    /// Create new orchestrator with injected ports
    pub fn new(fetch_port: Arc<dyn FetchPort>, media_tool_port: Arc<dyn MediaToolPort>) -> Self {
        Self {
            fetch_port,
            media_tool_port,
            settings: PipelineSettings::default(),
            next_job_id: AtomicU64::new(0),
        }
    }

    /// Replace the stage limits
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    /// Look up metadata for a URL
    pub async fn fetch_info(&self, url: &str) -> Result<VideoInfo, DomainError> {
        self.fetch_port.fetch_info(url).await
    }

    /// Start a job for a validated request.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, request: ClipRequest) -> (JobHandle, EventReceiver) {
        let id = self.next_job_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(JobState::Idle);
        let cancel = CancellationToken::new();

        info!(
            job = id,
            url = %request.source_url(),
            format = %request.output_format(),
            start = %request.start_hms(),
            end = %request.end_hms(),
            "Submitting clip job"
        );

        let job = PipelineJob {
            id,
            request,
            fetch_port: Arc::clone(&self.fetch_port),
            media_tool_port: Arc::clone(&self.media_tool_port),
            settings: self.settings,
            cancel: cancel.clone(),
            events: JobEvents { sender: event_tx },
            state: state_tx,
        };
        let task = tokio::spawn(job.run().instrument(info_span!("job", id)));

        let handle = JobHandle {
            id,
            cancel,
            state: state_rx,
            task,
        };
        (handle, event_rx)
    }

    /// Request cancellation of a job
    pub fn cancel(&self, handle: &JobHandle) {
        info!(job = handle.id(), "Cancellation requested");
        handle.cancel();
    }
}

/// Sending side of a job's event stream
struct JobEvents {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl JobEvents {
    fn emit(&self, event: ProgressEvent) {
        if self.sender.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}

/// Forwards adapter events, keeping terminal events for the orchestrator.
///
/// Download percentages are clamped to 0..=100, never go backwards, and stop
/// once cancellation has been requested.
struct StageEvents<'a> {
    events: &'a JobEvents,
    cancel: Option<&'a CancellationToken>,
    last_percent: Mutex<Option<f64>>,
}

impl<'a> StageEvents<'a> {
    fn download(events: &'a JobEvents, cancel: &'a CancellationToken) -> Self {
        Self {
            events,
            cancel: Some(cancel),
            last_percent: Mutex::new(None),
        }
    }

    fn clip(events: &'a JobEvents) -> Self {
        Self {
            events,
            cancel: None,
            last_percent: Mutex::new(None),
        }
    }
}

impl ProgressCallback for StageEvents<'_> {
    fn on_event(&self, event: ProgressEvent) {
        if event.is_terminal() {
            warn!(?event, "Ignoring terminal event raised by an adapter");
            return;
        }

        match event {
            ProgressEvent::Downloading { percent } => {
                if self.cancel.map(|c| c.is_cancelled()).unwrap_or(false) || percent.is_nan() {
                    return;
                }
                let mut last = self.last_percent.lock().unwrap_or_else(|e| e.into_inner());
                let percent = percent.clamp(0.0, 100.0).max(last.unwrap_or(0.0));
                if *last == Some(percent) {
                    return;
                }
                *last = Some(percent);
                self.events.emit(ProgressEvent::Downloading { percent });
            }
            other => self.events.emit(other),
        }
    }
}

/// Deletes the downloaded file when the job ends, whatever the outcome
struct TemporaryDownload {
    path: PathBuf,
}

impl TemporaryDownload {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TemporaryDownload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed temporary download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Error removing temporary file {}: {}", self.path.display(), e),
        }
    }
}

async fn with_timeout<T, F>(
    stage: &'static str,
    limit: Option<Duration>,
    future: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match limit {
        None => future.await,
        Some(limit) => match tokio::time::timeout(limit, future).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::TimedOut {
                stage,
                seconds: limit.as_secs(),
            }),
        },
    }
}

/// One running job
struct PipelineJob {
    id: JobId,
    request: ClipRequest,
    fetch_port: Arc<dyn FetchPort>,
    media_tool_port: Arc<dyn MediaToolPort>,
    settings: PipelineSettings,
    cancel: CancellationToken,
    events: JobEvents,
    state: watch::Sender<JobState>,
}

impl PipelineJob {
    async fn run(self) -> JobState {
        let state = self.execute().await;
        info!(job = self.id, state = %state, "Job finished");
        state
    }

    fn transition(&self, next: JobState) {
        let previous = self.state.send_replace(next);
        debug!(job = self.id, from = %previous, to = %next, "State transition");
    }

    /// Emit the terminal event and enter the matching terminal state
    fn finish(&self, event: ProgressEvent, state: JobState) -> JobState {
        self.events.emit(event);
        self.transition(state);
        state
    }

    async fn execute(&self) -> JobState {
        self.transition(JobState::Downloading);
        self.events.emit(ProgressEvent::info(STARTING_DOWNLOAD));

        let downloaded = match self.download_stage().await {
            Ok(DownloadOutcome::Completed(path)) => TemporaryDownload::new(path),
            Ok(DownloadOutcome::Cancelled) => {
                return self.finish(ProgressEvent::cancelled(DOWNLOAD_CANCELLED), JobState::Cancelled);
            }
            Err(e) if self.cancel.is_cancelled() => {
                debug!(job = self.id, "Download error after cancellation: {}", e);
                return self.finish(ProgressEvent::cancelled(DOWNLOAD_CANCELLED), JobState::Cancelled);
            }
            Err(e) => {
                warn!(job = self.id, "Download failed: {}", e);
                return self.finish(ProgressEvent::error(e.to_string()), JobState::DownloadFailed);
            }
        };

        self.transition(JobState::DownloadedAwaitingClip);
        self.events.emit(ProgressEvent::info(DOWNLOAD_COMPLETE));
        if self.cancel.is_cancelled() {
            debug!(job = self.id, "Cancellation ignored once the download has completed");
        }

        let clip_job = self.request.clip_job(downloaded.path().to_path_buf());
        self.transition(JobState::Clipping);

        let result = self.clip_stage(&clip_job).await;
        drop(downloaded);

        match result {
            Ok(message) => self.finish(ProgressEvent::finished(message), JobState::Finished),
            Err(e) => {
                warn!(job = self.id, "Clip failed: {}", e);
                self.finish(ProgressEvent::error(e.to_string()), JobState::ClipFailed)
            }
        }
    }

    async fn download_stage(&self) -> Result<DownloadOutcome, DomainError> {
        let progress = StageEvents::download(&self.events, &self.cancel);
        with_timeout(
            "Download",
            self.settings.download_timeout,
            self.fetch_port.download(
                self.request.source_url(),
                self.request.output_directory(),
                &progress,
                &self.cancel,
            ),
        )
        .await
    }

    async fn clip_stage(&self, job: &ClipJob) -> Result<String, DomainError> {
        let progress = StageEvents::clip(&self.events);
        with_timeout(
            "FFmpeg",
            self.settings.clip_timeout,
            self.media_tool_port.run(job, &progress),
        )
        .await
    }
}
