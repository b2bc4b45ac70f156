//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use stencil::config::CompressionConfig;

use crate::error::CliError;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Settings read from `config.toml`.
///
/// ```toml
/// [compression]
/// min_benefit_ratio = 0.2
///
/// [compression.grid]
/// tolerance = 0.5
///
/// [output]
/// pretty = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub compression: CompressionConfig,
    pub output: OutputConfig,
}

/// How JSON files are written.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent written JSON instead of emitting the compact form.
    pub pretty: bool,
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (stencil/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path to config file
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - Config values are out of range
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, CliError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("stencil/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "stencil", "stencil") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
///
/// # Errors
///
/// Returns error if:
/// - File doesn't exist
/// - File cannot be read
/// - TOML parsing fails
/// - The compression settings are out of range
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, CliError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;

    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config
        .compression
        .validate()
        .map_err(|e| ConfigError::Validation(e.to_string()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use stencil::config::OverridePolicy;
    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let file = write_config(
            r#"
            [compression]
            override_policy = "all"

            [compression.grid]
            enabled = false

            [output]
            pretty = true
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.compression.override_policy(), OverridePolicy::All);
        assert!(!config.compression.grid().enabled());
        assert!(config.output.pretty);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = write_config("");

        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.compression.min_group_size(), 2);
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let result = load_config(Some("does/not/exist.toml"));

        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::MissingFile(_)))
        ));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let file = write_config("[compression\nmin_group_size = ");

        let result = load_config(Some(file.path()));

        assert!(matches!(result, Err(CliError::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let file = write_config("[compression]\nmin_benefit_ratio = 1.5\n");

        let result = load_config(Some(file.path()));

        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::Validation(_)))
        ));
    }
}
