//! clipfetch
//!
//! Downloads a web video with yt-dlp and trims a time range out of it with
//! ffmpeg, saving the result as MP4, MP3 or GIF.
//!
//! # Usage
//!
//! ```bash
//! clipfetch info "https://www.youtube.com/watch?v=..."
//! clipfetch clip "https://www.youtube.com/watch?v=..." --start 00:01:00 --end 00:01:30 --format gif --out ./clips
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use clipfetch::app::container::{AppContainer, DefaultAppContainer};
use clipfetch::cli::{commands, Cli, Commands};
use clipfetch::config_initialization::{initialize_configuration_hierarchy, ConfigOverrides};
use clipfetch::utils::logging::{LogFormat, LoggingConfig, LoggingSystem};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output_dir = match &cli.command {
        Commands::Clip(args) => args.out.clone(),
        Commands::Info(_) => None,
    };
    let overrides = ConfigOverrides {
        config_file: cli.config.clone(),
        log_level: cli.log_level.clone(),
        output_dir,
    };
    let config = initialize_configuration_hierarchy(&overrides)
        .context("Failed to load configuration")?;

    let logging = LoggingSystem::new(LoggingConfig {
        level: config.log_level.clone(),
        format: if cli.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        },
        ..LoggingConfig::default()
    });
    logging.initialize()?;
    logging.log_system_info();

    let container = DefaultAppContainer::new(&config);
    let pipeline = container.pipeline();

    match cli.command {
        Commands::Info(args) => {
            info!("Executing info command");
            commands::info(&pipeline, args).await?;
        }
        Commands::Clip(args) => {
            info!("Executing clip command");
            commands::clip(&pipeline, &config, args).await?;
        }
    }

    Ok(())
}
