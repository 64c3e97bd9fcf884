//! FFmpeg execution adapter
//!
//! Trims (and for audio/GIF output, transcodes) a downloaded file by running
//! the `ffmpeg` executable as a child process.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::adapters::toml_config::AppConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::path::display_name;

/// Tool name used in user facing diagnostics
const TOOL_LABEL: &str = "FFmpeg";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// FFmpeg-based media tool adapter
pub struct FFmpegAdapter {
    program: String,
    gif_fps: u32,
    gif_width: u32,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter using `ffmpeg` from the search path
    pub fn new() -> Self {
        Self::from_config(&AppConfig::default())
    }

    /// Create adapter from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            program: config.ffmpeg_path.clone(),
            gif_fps: config.gif_fps,
            gif_width: config.gif_width,
        }
    }

    /// Command line for one clip job, excluding the program name
    pub fn build_args(&self, job: &ClipJob) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-i".into(),
            job.input_path.to_string_lossy().into_owned(),
            "-ss".into(),
            job.start_time.clone(),
            "-to".into(),
            job.end_time.clone(),
        ];

        match job.format {
            OutputFormat::Video => {
                args.extend(["-c", "copy", "-avoid_negative_ts", "1"].map(String::from));
            }
            OutputFormat::Audio => {
                args.extend(["-vn", "-q:a", "0", "-map", "a"].map(String::from));
            }
            OutputFormat::AnimatedImage => {
                args.push("-vf".into());
                args.push(format!(
                    "fps={},scale={}:-1:flags=lanczos",
                    self.gif_fps, self.gif_width
                ));
                args.extend(["-c", "gif"].map(String::from));
            }
        }

        args.push(job.output_path.to_string_lossy().into_owned());
        args
    }

    fn missing_tool(&self) -> DomainError {
        DomainError::ToolMissing {
            tool: "ffmpeg".to_string(),
        }
    }

    /// Locate the executable on the search path (or verify an explicit path)
    fn resolve_program(&self) -> Result<PathBuf, DomainError> {
        which::which(&self.program).map_err(|_| self.missing_tool())
    }

    async fn execute(&self, job: &ClipJob, progress: &dyn ProgressCallback) -> Result<String, DomainError> {
        if let Some(parent) = job.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    DomainError::Io(format!(
                        "Failed to create output directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        progress.on_event(ProgressEvent::clipping(format!(
            "Running FFmpeg for {}...",
            job.format.label()
        )));

        let program = self.resolve_program()?;
        let args = self.build_args(job);
        debug!(program = %program.display(), ?args, "Spawning ffmpeg");

        let mut command = Command::new(&program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let output = command.output().await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => self.missing_tool(),
            _ => DomainError::Io(format!("Failed to run ffmpeg: {}", e)),
        })?;

        if output.status.success() {
            info!(output = %job.output_path.display(), "Clip written");
            Ok(format!(
                "Successfully created clip: {}",
                display_name(&job.output_path)
            ))
        } else {
            let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), "ffmpeg failed");
            Err(DomainError::ToolFailed {
                tool: TOOL_LABEL.to_string(),
                diagnostic,
            })
        }
    }
}

impl Default for FFmpegAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Delete the downloaded input; failures are only logged
async fn remove_input(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed temporary input"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Error removing temporary file {}: {}", path.display(), e),
    }
}

#[async_trait]
impl MediaToolPort for FFmpegAdapter {
    async fn run(&self, job: &ClipJob, progress: &dyn ProgressCallback) -> Result<String, DomainError> {
        let result = self.execute(job, progress).await;
        remove_input(&job.input_path).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn job(dir: &Path, format: OutputFormat) -> ClipJob {
        ClipJob {
            input_path: dir.join("dl.mp4"),
            output_path: dir.join("out").join(format!("clip.{}", format.extension())),
            start_time: "00:00:10".to_string(),
            end_time: "00:00:20".to_string(),
            format,
        }
    }

    fn adapter_with(program: &str) -> FFmpegAdapter {
        FFmpegAdapter::from_config(&AppConfig {
            ffmpeg_path: program.to_string(),
            ..AppConfig::default()
        })
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ProgressEvent>>);

    impl ProgressCallback for Recorder {
        fn on_event(&self, event: ProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_video_args_stream_copy() {
        let args = FFmpegAdapter::new().build_args(&job(Path::new("/w"), OutputFormat::Video));
        assert_eq!(
            args,
            vec![
                "-y", "-i", "/w/dl.mp4", "-ss", "00:00:10", "-to", "00:00:20", "-c", "copy",
                "-avoid_negative_ts", "1", "/w/out/clip.mp4"
            ]
        );
    }

    #[test]
    fn test_audio_args_drop_video() {
        let args = FFmpegAdapter::new().build_args(&job(Path::new("/w"), OutputFormat::Audio));
        let tail: Vec<&str> = args[7..].iter().map(String::as_str).collect();
        assert_eq!(tail, vec!["-vn", "-q:a", "0", "-map", "a", "/w/out/clip.mp3"]);
    }

    #[test]
    fn test_gif_args_use_configured_filter() {
        let adapter = FFmpegAdapter::from_config(&AppConfig {
            gif_fps: 10,
            gif_width: 320,
            ..AppConfig::default()
        });
        let args = adapter.build_args(&job(Path::new("/w"), OutputFormat::AnimatedImage));
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "fps=10,scale=320:-1:flags=lanczos");
        assert_eq!(args[vf + 2..], ["-c", "gif", "/w/out/clip.gif"]);

        let default_args = FFmpegAdapter::new().build_args(&job(Path::new("/w"), OutputFormat::AnimatedImage));
        assert!(default_args.contains(&"fps=15,scale=480:-1:flags=lanczos".to_string()));
    }

    #[tokio::test]
    async fn test_missing_executable_reports_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), OutputFormat::Video);
        std::fs::write(&job.input_path, b"media").unwrap();
        let recorder = Recorder::default();

        let err = adapter_with("clipfetch-test-no-such-ffmpeg")
            .run(&job, &recorder)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "ffmpeg not found. Please ensure it is installed and in your system PATH."
        );
        assert!(!job.input_path.exists());
        assert!(job.output_path.parent().unwrap().is_dir());
        let events = recorder.0.lock().unwrap();
        assert_eq!(*events, vec![ProgressEvent::clipping("Running FFmpeg for MP4...")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), OutputFormat::Audio);
        std::fs::write(&job.input_path, b"media").unwrap();

        let err = adapter_with("false").run(&job, &Recorder::default()).await.unwrap_err();

        assert!(matches!(err, DomainError::ToolFailed { .. }));
        assert!(err.to_string().starts_with("FFmpeg error:"));
        assert!(!job.input_path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_reports_basename() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(dir.path(), OutputFormat::AnimatedImage);
        std::fs::write(&job.input_path, b"media").unwrap();

        let message = adapter_with("true").run(&job, &Recorder::default()).await.unwrap();

        assert_eq!(message, "Successfully created clip: clip.gif");
        assert!(!job.input_path.exists());
    }
}
