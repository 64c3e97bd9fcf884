//! Command implementations

use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use crate::adapters::toml_config::AppConfig;
use crate::cli::args::{ClipArgs, InfoArgs};
use crate::domain::errors::DomainError;
use crate::domain::model::{ClipRequest, JobState, ProgressEvent, VideoInfo};
use crate::domain::rules::RequestValidator;
use crate::app::{EventReceiver, JobHandle, PipelineOrchestrator};
use crate::utils::time::hms_to_seconds;

/// Shown to users whenever a metadata lookup fails
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch video info. Check URL and connection.";

/// Execute the info command
pub async fn info(pipeline: &PipelineOrchestrator, args: InfoArgs) -> Result<()> {
    info!("Fetching video info for {}", args.url);
    let video = fetch_video_info(pipeline, &args.url).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&video)
            .context("Failed to serialize video info to JSON")?;
        println!("{}", json);
    } else {
        display_video_info(&video);
    }
    Ok(())
}

/// Execute the clip command
pub async fn clip(pipeline: &PipelineOrchestrator, config: &AppConfig, args: ClipArgs) -> Result<()> {
    let start = hms_to_seconds(&args.start);
    let requested_end = args.end.as_deref().map(hms_to_seconds);

    // Reject what can be rejected before touching the network
    if let Some(end) = requested_end {
        if start >= end {
            bail!(DomainError::InvalidTimeRange(format!(
                "start ({}) must be before end ({})",
                args.start,
                args.end.as_deref().unwrap_or_default()
            )));
        }
    }
    let output_dir: PathBuf = args
        .out
        .clone()
        .or_else(|| config.output_dir.clone())
        .ok_or(DomainError::MissingField("output folder"))?;
    RequestValidator::validate_inputs(&args.url, &output_dir)?;

    let video = fetch_video_info(pipeline, &args.url).await?;
    let end = requested_end.unwrap_or(video.duration_seconds);

    let request = ClipRequest::new(&args.url, output_dir, start, end, args.format, &video)?;
    info!(output = %request.output_path().display(), "Clip request accepted");

    let (handle, events) = pipeline.submit(request);
    let mut renderer = EventRenderer::new(args.json_events);

    match drive_job(pipeline, handle, events, &mut renderer, tokio::signal::ctrl_c()).await? {
        JobState::Finished => Ok(()),
        JobState::Cancelled => Err(anyhow!("Clip cancelled")),
        state => Err(anyhow!("Clip job ended in state {}", state)),
    }
}

/// Render a job's events until its stream closes and return the terminal state.
///
/// The first completion of `interrupt` requests cancellation; it is never
/// polled again afterwards.
async fn drive_job<I>(
    pipeline: &PipelineOrchestrator,
    handle: JobHandle,
    mut events: EventReceiver,
    renderer: &mut EventRenderer,
    interrupt: I,
) -> Result<JobState>
where
    I: Future<Output = io::Result<()>>,
{
    tokio::pin!(interrupt);
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => renderer.render(&event)?,
                None => break,
            },
            signal = &mut interrupt, if !interrupted => {
                interrupted = true;
                match (signal, handle.state()) {
                    (Ok(()), JobState::Idle | JobState::Downloading) => pipeline.cancel(&handle),
                    (Ok(()), state) => info!(%state, "Interrupt ignored, download already complete"),
                    (Err(e), _) => warn!("Failed to listen for Ctrl-C: {}", e),
                }
            }
        }
    }

    Ok(handle.wait().await)
}

/// Metadata lookup with the generic user facing failure message
async fn fetch_video_info(pipeline: &PipelineOrchestrator, url: &str) -> Result<VideoInfo> {
    pipeline.fetch_info(url).await.map_err(|e| {
        warn!("Error fetching video info: {}", e);
        anyhow!(FETCH_FAILED_MESSAGE)
    })
}

/// Display video information in human-readable format
fn display_video_info(video: &VideoInfo) {
    println!("Title:     {}", video.title);
    println!("Duration:  {}", video.duration_hms());
    println!(
        "Thumbnail: {}",
        video.thumbnail_url.as_deref().unwrap_or("none")
    );
}

/// Renders job events to stdout
struct EventRenderer {
    json: bool,
    progress_line_open: bool,
}

impl EventRenderer {
    fn new(json: bool) -> Self {
        Self {
            json,
            progress_line_open: false,
        }
    }

    fn render(&mut self, event: &ProgressEvent) -> Result<()> {
        let mut out = io::stdout().lock();

        if self.json {
            let line = serde_json::to_string(event).context("Failed to serialize event")?;
            writeln!(out, "{}", line)?;
            return Ok(());
        }

        match event {
            ProgressEvent::Downloading { percent } => {
                write!(out, "\rDownloading video... {:>5.1}%", percent)?;
                out.flush()?;
                self.progress_line_open = true;
            }
            other => {
                if self.progress_line_open {
                    writeln!(out)?;
                    self.progress_line_open = false;
                }
                let prefix = match other {
                    ProgressEvent::Error { .. } => "error: ",
                    ProgressEvent::Cancelled { .. } => "cancelled: ",
                    _ => "",
                };
                writeln!(out, "{}{}", prefix, other.message().unwrap_or_default())?;
            }
        }
        Ok(())
    }
}
