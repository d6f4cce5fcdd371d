mod config;

pub use config::{Config, DisplayConfig, SessionSection};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `$MINDFUL_HOME` when set, otherwise `~/.config/mindful-minutes/`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("MINDFUL_HOME") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("mindful-minutes"),
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
