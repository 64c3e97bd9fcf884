//! yt-dlp fetch adapter
//!
//! Metadata lookup and full-media download through the `yt-dlp` executable.
//! Download progress is read line by line from a custom progress template on
//! stdout; cancellation kills the child process.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::toml_config::AppConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::{files_for_base, find_completed_download};

/// Format selection: merged mp4/m4a, else best single mp4, else anything
const FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Marker prefixed to our progress template lines
const PROGRESS_MARKER: &str = "clipfetch-progress";

/// Prefix of temporary download names
const TEMP_PREFIX: &str = "clipfetch_dl";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

static DOWNLOAD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique temporary base name for one download
fn next_temp_base() -> String {
    format!(
        "{}_{}_{}",
        TEMP_PREFIX,
        std::process::id(),
        DOWNLOAD_COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

/// Subset of the yt-dlp info JSON we care about
#[derive(Debug, Deserialize)]
struct RawVideoInfo {
    title: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
}

/// Parse the output of `--dump-single-json`
pub fn parse_video_info(json: &[u8]) -> Result<VideoInfo, DomainError> {
    let raw: RawVideoInfo = serde_json::from_slice(json)
        .map_err(|e| DomainError::FetchFailed(format!("invalid metadata: {}", e)))?;

    let duration = raw
        .duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d as u64)
        .unwrap_or(0);

    Ok(VideoInfo {
        title: raw.title.unwrap_or_else(|| "N/A".to_string()),
        duration_seconds: duration,
        thumbnail_url: raw.thumbnail,
    })
}

/// One progress line emitted by the download template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressTick {
    pub downloaded_bytes: f64,
    pub total_bytes: Option<f64>,
    pub total_bytes_estimate: Option<f64>,
}

impl ProgressTick {
    /// Parse `clipfetch-progress <downloaded> <total> <estimate>`; `NA` marks unknown values
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix(PROGRESS_MARKER)?;
        let mut fields = rest.split_whitespace().map(parse_byte_count);

        let downloaded_bytes = fields.next()?.unwrap_or(0.0);
        let total_bytes = fields.next().flatten();
        let total_bytes_estimate = fields.next().flatten();

        Some(Self {
            downloaded_bytes,
            total_bytes,
            total_bytes_estimate,
        })
    }

    /// Percentage against the exact total, else the estimate; `None` when neither is known
    pub fn percent(&self) -> Option<f64> {
        let total = self
            .total_bytes
            .filter(|t| *t > 0.0)
            .or(self.total_bytes_estimate.filter(|t| *t > 0.0))?;
        Some(self.downloaded_bytes / total * 100.0)
    }
}

fn parse_byte_count(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Removes every file named after the temporary base unless disarmed
struct PartialDownloadGuard {
    dir: PathBuf,
    base: String,
    armed: bool,
}

impl PartialDownloadGuard {
    fn new(dir: &Path, base: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            base: base.to_string(),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartialDownloadGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        for path in files_for_base(&self.dir, &self.base) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Removed partial download"),
                Err(e) => warn!("Error removing partial download {}: {}", path.display(), e),
            }
        }
    }
}

/// Keep the tail of stderr for diagnostics
async fn collect_diagnostics<R: AsyncRead + Unpin>(stream: R) -> String {
    let mut lines = BufReader::new(stream).lines();
    let mut last = String::new();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "clipfetch::yt_dlp", "{}", line);
        if !line.trim().is_empty() {
            last = line;
        }
    }
    last
}

/// yt-dlp based fetch adapter
pub struct YtDlpAdapter {
    program: String,
}

impl YtDlpAdapter {
    /// Create new adapter using `yt-dlp` from the search path
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    /// Create adapter from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            program: config.ytdlp_path.clone(),
        }
    }

    fn missing_tool() -> DomainError {
        DomainError::ToolMissing {
            tool: "yt-dlp".to_string(),
        }
    }

    fn resolve_program(&self) -> Result<PathBuf, DomainError> {
        which::which(&self.program).map_err(|_| Self::missing_tool())
    }

    fn command(program: &Path) -> Command {
        let mut command = Command::new(program);
        command.stdin(Stdio::null()).kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);
        command
    }

    /// Arguments for a metadata-only lookup
    pub fn info_args(url: &str) -> Vec<String> {
        ["--dump-single-json", "--skip-download", "--no-playlist", "--no-warnings", url]
            .map(String::from)
            .to_vec()
    }

    /// Arguments for a full download to `output_template`
    pub fn download_args(url: &str, output_template: &Path) -> Vec<String> {
        vec![
            "--no-playlist".to_string(),
            "--newline".to_string(),
            "--progress-template".to_string(),
            format!(
                "download:{} %(progress.downloaded_bytes)s %(progress.total_bytes)s %(progress.total_bytes_estimate)s",
                PROGRESS_MARKER
            ),
            "-f".to_string(),
            FORMAT_SELECTOR.to_string(),
            "-o".to_string(),
            output_template.to_string_lossy().into_owned(),
            url.to_string(),
        ]
    }

    async fn abort(mut child: Child) -> Result<DownloadOutcome, DomainError> {
        info!("Download cancelled, stopping yt-dlp");
        if let Err(e) = child.kill().await {
            warn!("Failed to stop yt-dlp: {}", e);
        }
        Ok(DownloadOutcome::Cancelled)
    }
}

impl Default for YtDlpAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchPort for YtDlpAdapter {
    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, DomainError> {
        let program = self.resolve_program()?;
        let output = Self::command(&program)
            .args(Self::info_args(url))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Self::missing_tool(),
                _ => DomainError::FetchFailed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.lines().last().unwrap_or("unknown error").to_string();
            warn!(url = %url, "Error fetching video info: {}", reason);
            return Err(DomainError::FetchFailed(reason));
        }

        let info = parse_video_info(&output.stdout)?;
        info!(title = %info.title, duration = info.duration_seconds, "Fetched video info");
        Ok(info)
    }

    async fn download(
        &self,
        url: &str,
        destination_dir: &Path,
        progress: &dyn ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<DownloadOutcome, DomainError> {
        if cancel.is_cancelled() {
            return Ok(DownloadOutcome::Cancelled);
        }

        tokio::fs::create_dir_all(destination_dir).await.map_err(|e| {
            DomainError::Io(format!(
                "Failed to create download directory {}: {}",
                destination_dir.display(),
                e
            ))
        })?;

        let base = next_temp_base();
        let mut partials = PartialDownloadGuard::new(destination_dir, &base);
        let template = destination_dir.join(format!("{}.%(ext)s", base));
        let program = self.resolve_program()?;

        info!(url = %url, dir = %destination_dir.display(), "Starting yt-dlp download");
        let mut child = Self::command(&program)
            .args(Self::download_args(url, &template))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Self::missing_tool(),
                _ => DomainError::Io(format!("Failed to run yt-dlp: {}", e)),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DomainError::InternalError("yt-dlp stdout not captured".to_string()))?;
        let diagnostics = child.stderr.take().map(|stderr| tokio::spawn(collect_diagnostics(stderr)));

        let mut lines = BufReader::new(stdout).lines();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Self::abort(child).await,
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if cancel.is_cancelled() {
                            return Self::abort(child).await;
                        }
                        match ProgressTick::parse(&line) {
                            Some(tick) => {
                                if let Some(percent) = tick.percent() {
                                    progress.on_event(ProgressEvent::Downloading { percent });
                                }
                            }
                            None => debug!(target: "clipfetch::yt_dlp", "{}", line),
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read yt-dlp output: {}", e);
                        break;
                    }
                },
            }
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Self::abort(child).await,
            status = child.wait() => status.map_err(|e| DomainError::Io(format!("Failed to wait for yt-dlp: {}", e)))?,
        };

        let diagnostic = match diagnostics {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            return Err(DomainError::ToolFailed {
                tool: "yt-dlp".to_string(),
                diagnostic,
            });
        }

        match find_completed_download(destination_dir, &base) {
            Some(path) => {
                partials.disarm();
                info!(path = %path.display(), "Download complete");
                Ok(DownloadOutcome::Completed(path))
            }
            None => Err(DomainError::DownloadedFileNotFound),
        }
    }
}
