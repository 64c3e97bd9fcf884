//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::OutputFormat;
use crate::utils::time::ZERO_HMS;

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    OutputFormat::parse(value).map_err(|e| e.to_string())
}

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Video URL
    pub url: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Video URL
    pub url: String,

    /// Start time (HH:MM:SS)
    #[arg(short, long, default_value = ZERO_HMS)]
    pub start: String,

    /// End time (HH:MM:SS, default: end of the video)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Output format: video (mp4), audio (mp3) or gif
    #[arg(short, long, default_value = "video", value_parser = parse_format)]
    pub format: OutputFormat,

    /// Destination folder (default: output_dir from the configuration)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Print events as JSON lines instead of status text
    #[arg(long)]
    pub json_events: bool,
}
