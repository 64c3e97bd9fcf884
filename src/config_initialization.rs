//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::adapters::toml_config::{AppConfig, TomlConfigAdapter, DEFAULT_CONFIG_FILE};
use crate::domain::errors::DomainError;

/// Settings given on the command line, highest precedence
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub log_level: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// Resolve configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(overrides: &ConfigOverrides) -> Result<AppConfig, DomainError> {
    let mut config = load_config_file(overrides.config_file.as_deref())?;
    apply_environment(&mut config, |key| std::env::var(key).ok())?;
    apply_cli_overrides(&mut config, overrides);
    config.validate()?;
    Ok(config)
}

/// Load an explicit config file, or the default one when it exists
fn load_config_file(explicit: Option<&Path>) -> Result<AppConfig, DomainError> {
    if let Some(path) = explicit {
        return TomlConfigAdapter::load_config(path);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        return TomlConfigAdapter::load_config(default_path);
    }

    debug!("No configuration file found, using defaults");
    Ok(AppConfig::default())
}

/// Apply `CLIPFETCH_*` environment variables
pub fn apply_environment<F>(config: &mut AppConfig, lookup: F) -> Result<(), DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_overrides = 0;

    if let Some(value) = lookup("CLIPFETCH_FFMPEG") {
        config.ffmpeg_path = value;
        env_overrides += 1;
    }
    if let Some(value) = lookup("CLIPFETCH_YTDLP") {
        config.ytdlp_path = value;
        env_overrides += 1;
    }
    if let Some(value) = lookup("CLIPFETCH_LOG_LEVEL") {
        config.log_level = value;
        env_overrides += 1;
    }
    if let Some(value) = lookup("CLIPFETCH_OUTPUT_DIR") {
        config.output_dir = Some(PathBuf::from(value));
        env_overrides += 1;
    }
    if let Some(value) = lookup("CLIPFETCH_GIF_FPS") {
        config.gif_fps = parse_number("CLIPFETCH_GIF_FPS", &value)?;
        env_overrides += 1;
    }
    if let Some(value) = lookup("CLIPFETCH_GIF_WIDTH") {
        config.gif_width = parse_number("CLIPFETCH_GIF_WIDTH", &value)?;
        env_overrides += 1;
    }
    if let Some(value) = lookup("CLIPFETCH_DOWNLOAD_TIMEOUT") {
        config.download_timeout_secs = Some(parse_number("CLIPFETCH_DOWNLOAD_TIMEOUT", &value)?);
        env_overrides += 1;
    }
    if let Some(value) = lookup("CLIPFETCH_CLIP_TIMEOUT") {
        config.clip_timeout_secs = Some(parse_number("CLIPFETCH_CLIP_TIMEOUT", &value)?);
        env_overrides += 1;
    }

    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DomainError> {
    value
        .trim()
        .parse()
        .map_err(|_| DomainError::Config(format!("{} must be a number, got '{}'", key, value)))
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut AppConfig, overrides: &ConfigOverrides) {
    if let Some(level) = &overrides.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &overrides.output_dir {
        config.output_dir = Some(dir.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_overrides() {
        let vars = env(&[
            ("CLIPFETCH_FFMPEG", "/opt/ffmpeg/bin/ffmpeg"),
            ("CLIPFETCH_GIF_FPS", "12"),
            ("CLIPFETCH_CLIP_TIMEOUT", "90"),
        ]);
        let mut config = AppConfig::default();
        apply_environment(&mut config, |k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.gif_fps, 12);
        assert_eq!(config.clip_timeout_secs, Some(90));
        assert_eq!(config.ytdlp_path, "yt-dlp");
    }

    #[test]
    fn test_environment_rejects_bad_numbers() {
        let vars = env(&[("CLIPFETCH_GIF_WIDTH", "wide")]);
        let mut config = AppConfig::default();
        let err = apply_environment(&mut config, |k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = AppConfig {
            log_level: "warn".to_string(),
            ..AppConfig::default()
        };
        let overrides = ConfigOverrides {
            config_file: None,
            log_level: Some("debug".to_string()),
            output_dir: Some(PathBuf::from("/tmp/out")),
        };
        apply_cli_overrides(&mut config, &overrides);

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.output_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "gif_width = 320\n").unwrap();

        let config = load_config_file(Some(&path)).unwrap();
        assert_eq!(config.gif_width, 320);
    }
}
