//! # Game Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! [control]
//! camera_speed = 2.0
//!
//! [render]
//! frames_in_flight = 2
//! command_capacity = 4096
//! ```
//!
//! Every field has a default, so an empty file is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tandem_rendering::RenderConfig;
use tandem_shared::{DEFAULT_CAMERA_SPEED, MAX_COMMAND_CAPACITY, MAX_FRAMES_IN_FLIGHT};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "TANDEM_CONFIG_PATH";

/// Config file location when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "assets/config.toml";

/// Smallest accepted command queue capacity.
pub const MIN_COMMAND_CAPACITY: usize = 16;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`GameConfig`].
    #[error("parse error: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Input tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Camera speed in world units per second.
    pub camera_speed: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self { camera_speed: DEFAULT_CAMERA_SPEED }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// `[control]` section.
    pub control: ControlConfig,
    /// `[render]` section.
    pub render: RenderConfig,
}

impl GameConfig {
    /// Reads and validates the config at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Loads from [`resolve_path`](Self::resolve_path), falling back to
    /// defaults when no file exists there.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a file exists but is unreadable or invalid.
    pub fn load_or_default() -> ConfigResult<Self> {
        let path = Self::resolve_path();
        if path.exists() {
            Self::load(&path)
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Config file location: [`CONFIG_PATH_ENV`] if set, else
    /// [`DEFAULT_CONFIG_PATH`].
    #[must_use]
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> ConfigResult<()> {
        let speed = self.control.camera_speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "control.camera_speed must be a positive number, got {speed}"
            )));
        }
        let depth = self.render.frames_in_flight;
        if !(1..=MAX_FRAMES_IN_FLIGHT).contains(&depth) {
            return Err(ConfigError::Invalid(format!(
                "render.frames_in_flight must be between 1 and {MAX_FRAMES_IN_FLIGHT}, got {depth}"
            )));
        }
        let capacity = self.render.command_capacity;
        if !(MIN_COMMAND_CAPACITY..=MAX_COMMAND_CAPACITY).contains(&capacity) {
            return Err(ConfigError::Invalid(format!(
                "render.command_capacity must be between {MIN_COMMAND_CAPACITY} and {MAX_COMMAND_CAPACITY}, got {capacity}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = GameConfig::from_toml_str("").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.control.camera_speed, DEFAULT_CAMERA_SPEED);
    }

    #[test]
    fn test_partial_sections() {
        let config = GameConfig::from_toml_str("[control]\ncamera_speed = 5.5\n[render]\nframes_in_flight = 3\n").unwrap();
        assert_eq!(config.control.camera_speed, 5.5);
        assert_eq!(config.render.frames_in_flight, 3);
        assert_eq!(config.render.command_capacity, RenderConfig::default().command_capacity);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let zero_depth = GameConfig::from_toml_str("[render]\nframes_in_flight = 0\n");
        assert!(matches!(zero_depth, Err(ConfigError::Invalid(_))));

        let negative_speed = GameConfig::from_toml_str("[control]\ncamera_speed = -1.0\n");
        assert!(matches!(negative_speed, Err(ConfigError::Invalid(_))));

        let tiny_queue = GameConfig::from_toml_str("[render]\ncommand_capacity = 4\n");
        assert!(matches!(tiny_queue, Err(ConfigError::Invalid(_))));

        let huge_depth = GameConfig::from_toml_str("[render]\nframes_in_flight = 9223372036854775807\n");
        assert!(matches!(huge_depth, Err(ConfigError::Invalid(_))));

        let huge_queue = GameConfig::from_toml_str(&format!("[render]\ncommand_capacity = {}\n", MAX_COMMAND_CAPACITY + 1));
        assert!(matches!(huge_queue, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_limits_are_inclusive() {
        let toml = format!("[render]\nframes_in_flight = {MAX_FRAMES_IN_FLIGHT}\ncommand_capacity = {MAX_COMMAND_CAPACITY}\n");
        let config = GameConfig::from_toml_str(&toml).unwrap();
        assert_eq!(config.render.frames_in_flight, MAX_FRAMES_IN_FLIGHT);
        assert_eq!(config.render.command_capacity, MAX_COMMAND_CAPACITY);
    }

    #[test]
    fn test_malformed_toml() {
        let result = GameConfig::from_toml_str("[control\ncamera_speed = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = GameConfig::load("definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config.toml");
        let config = GameConfig::load(path).unwrap();
        assert_eq!(config, GameConfig::default());
    }
}
