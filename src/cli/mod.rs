//! CLI module for clipfetch
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// clipfetch
///
/// Download a web video and cut a clip out of it as MP4, MP3 or GIF.
#[derive(Parser, Debug)]
#[command(name = "clipfetch")]
#[command(about = "Download a web video and save a trimmed clip")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./clipfetch.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show title, duration and thumbnail of a video
    Info(args::InfoArgs),
    /// Download a video and save the selected range as a clip
    Clip(args::ClipArgs),
}
