// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::*;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "clipfetch.toml";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ffmpeg executable name or path
    pub ffmpeg_path: String,
    /// yt-dlp executable name or path
    pub ytdlp_path: String,
    /// Frame rate of GIF clips
    pub gif_fps: u32,
    /// Width in pixels of GIF clips
    pub gif_width: u32,
    /// Upper bound for the download stage, unbounded when absent
    pub download_timeout_secs: Option<u64>,
    /// Upper bound for the clip stage, unbounded when absent
    pub clip_timeout_secs: Option<u64>,
    /// Default destination folder for clips
    pub output_dir: Option<PathBuf>,
    /// Default log filter
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            gif_fps: 15,
            gif_width: 480,
            download_timeout_secs: None,
            clip_timeout_secs: None,
            output_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.ffmpeg_path.trim().is_empty() {
            return Err(DomainError::Config("ffmpeg_path cannot be empty".to_string()));
        }
        if self.ytdlp_path.trim().is_empty() {
            return Err(DomainError::Config("ytdlp_path cannot be empty".to_string()));
        }
        if self.gif_fps == 0 {
            return Err(DomainError::Config("gif_fps must be greater than 0".to_string()));
        }
        if self.gif_width == 0 {
            return Err(DomainError::Config("gif_width must be greater than 0".to_string()));
        }
        if self.download_timeout_secs == Some(0) || self.clip_timeout_secs == Some(0) {
            return Err(DomainError::Config(
                "timeouts must be greater than 0 seconds".to_string(),
            ));
        }
        Ok(())
    }

    pub fn download_timeout(&self) -> Option<Duration> {
        self.download_timeout_secs.map(Duration::from_secs)
    }

    pub fn clip_timeout(&self) -> Option<Duration> {
        self.clip_timeout_secs.map(Duration::from_secs)
    }
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration from a TOML document
    pub fn parse(content: &str) -> Result<AppConfig, DomainError> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load_config(file_path: &Path) -> Result<AppConfig, DomainError> {
        let content = std::fs::read_to_string(file_path).map_err(|e| {
            DomainError::Config(format!(
                "Failed to read config file {}: {}",
                file_path.display(),
                e
            ))
        })?;
        let config = Self::parse(&content)?;
        tracing::info!(path = %file_path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(config: &AppConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(config)
            .map_err(|e| DomainError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = TomlConfigAdapter::parse("gif_fps = 10\nclip_timeout_secs = 300\n").unwrap();
        assert_eq!(config.gif_fps, 10);
        assert_eq!(config.gif_width, 480);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.clip_timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.download_timeout(), None);
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        assert!(TomlConfigAdapter::parse("gif_width = 0").is_err());
        assert!(TomlConfigAdapter::parse("download_timeout_secs = 0").is_err());
        assert!(TomlConfigAdapter::parse("gif_fps = \"fast\"").is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let config = AppConfig {
            output_dir: Some(PathBuf::from("/srv/clips")),
            ..AppConfig::default()
        };
        std::fs::write(&path, TomlConfigAdapter::to_toml(&config).unwrap()).unwrap();

        assert_eq!(TomlConfigAdapter::load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TomlConfigAdapter::load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }
}
