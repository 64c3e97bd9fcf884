use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from any config file or environment of the host
fn clipfetch(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("clipfetch").unwrap();
    cmd.current_dir(workdir.path())
        .env_remove("RUST_LOG")
        .env_remove("CLIPFETCH_OUTPUT_DIR")
        .env_remove("CLIPFETCH_LOG_LEVEL")
        .env("CLIPFETCH_YTDLP", "clipfetch-missing-yt-dlp")
        .env("CLIPFETCH_FFMPEG", "clipfetch-missing-ffmpeg");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let workdir = TempDir::new().unwrap();
    clipfetch(&workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("clip"));
}

#[test]
fn test_clip_rejects_reversed_range_before_fetching() {
    let workdir = TempDir::new().unwrap();
    clipfetch(&workdir)
        .args(["clip", "https://example.com/v", "-s", "00:00:20", "-e", "00:00:10", "-o"])
        .arg(workdir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid start/end time"))
        .stderr(predicate::str::contains("Failed to fetch video info").not());
}

#[test]
fn test_clip_requires_output_folder() {
    let workdir = TempDir::new().unwrap();
    clipfetch(&workdir)
        .args(["clip", "https://example.com/v", "-e", "00:00:10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing output folder."));
}

#[test]
fn test_clip_output_folder_from_environment() {
    let workdir = TempDir::new().unwrap();
    clipfetch(&workdir)
        .env("CLIPFETCH_OUTPUT_DIR", workdir.path())
        .args(["clip", "https://example.com/v", "-e", "00:00:10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch video info. Check URL and connection."));
}

#[test]
fn test_clip_rejects_unknown_format() {
    let workdir = TempDir::new().unwrap();
    clipfetch(&workdir)
        .args(["clip", "https://example.com/v", "-f", "webm", "-o"])
        .arg(workdir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported output format"));
}

#[test]
fn test_info_reports_fetch_failure() {
    let workdir = TempDir::new().unwrap();
    clipfetch(&workdir)
        .args(["info", "https://example.com/v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch video info. Check URL and connection."));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let workdir = TempDir::new().unwrap();
    std::fs::write(workdir.path().join("clipfetch.toml"), "gif_fps = \"fast\"\n").unwrap();
    clipfetch(&workdir)
        .args(["info", "https://example.com/v"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
