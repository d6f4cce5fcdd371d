//! Core error types for mindful-core.
//!
//! Timer transitions never fail: invalid ones are rejected silently and
//! logged. Errors only arise at the edges, when loading configuration or
//! parsing user input.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mindful-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No usable audio output
    #[error("Audio output unavailable: {0}")]
    Audio(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Validation errors for user-supplied values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Duration is not one of the presets
    #[error("'{0}' is not a duration preset (try 30s, 1m, 2m, 5m, 10m, 15m, 20m, 30m, 45m, 60m)")]
    UnknownPreset(String),

    #[error("unknown sound '{0}' (expected none, rain, forest or binaural)")]
    UnknownSound(String),

    #[error("unknown setting '{0}' (expected sound, fade or chime_interval)")]
    UnknownSetting(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
