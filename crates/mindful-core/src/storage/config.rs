//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default session length, ambient sound, fade and interval chime
//! - Console display options (terminal bell, live countdown)
//!
//! Configuration is stored at `~/.config/mindful-minutes/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{AmbientSound, DurationPreset, SessionConfig};

/// Defaults applied to every new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u32,
    #[serde(default)]
    pub sound: AmbientSound,
    #[serde(default = "default_true")]
    pub fade: bool,
    #[serde(default = "default_chime_interval_min")]
    pub chime_interval_min: u32,
}

/// Console rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Ring the terminal bell on chimes.
    #[serde(default = "default_true")]
    pub bell: bool,
    /// Redraw the countdown every second.
    #[serde(default = "default_true")]
    pub ticks: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/mindful-minutes/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_duration_secs() -> u32 {
    10 * 60
}
fn default_chime_interval_min() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            sound: AmbientSound::default(),
            fade: true,
            chime_interval_min: default_chime_interval_min(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bell: true,
            ticks: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("expected true or false, got '{value}'")))?,
                ),
                serde_json::Value::Number(_) => {
                    let n = value
                        .parse::<u64>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                    serde_json::Value::Number(n.into())
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value)?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown().into())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// validated, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults when the file is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation. The config is left unchanged in that case.
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.update(key, value)?;
        self.save()
    }

    pub fn validate(&self) -> Result<()> {
        if !DurationPreset::is_preset(self.session.duration_secs) {
            return Err(ConfigError::InvalidValue {
                key: "session.duration_secs".into(),
                message: format!("{} is not a duration preset", self.session.duration_secs),
            }
            .into());
        }
        Ok(())
    }

    /// Session settings derived from the `[session]` section.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            duration_secs: self.session.duration_secs,
            sound: self.session.sound,
            fade_enabled: self.session.fade,
            chime_interval_min: self.session.chime_interval_min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn default_matches_session_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.session_config(), SessionConfig::default());
        assert!(cfg.display.bell);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: Config = toml::from_str("[session]\nsound = \"forest\"\n").unwrap();
        assert_eq!(cfg.session.sound, AmbientSound::Forest);
        assert_eq!(cfg.session.duration_secs, 600);
        assert!(cfg.session.fade);
        assert!(cfg.display.ticks);
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("session.sound").as_deref(), Some("rain"));
        assert_eq!(cfg.get("session.duration_secs").as_deref(), Some("600"));
        assert_eq!(cfg.get("session.nope"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn update_parses_by_existing_type() {
        let mut cfg = Config::default();
        cfg.update("session.sound", "binaural").unwrap();
        cfg.update("session.fade", "false").unwrap();
        cfg.update("session.chime_interval_min", "15").unwrap();
        cfg.update("session.duration_secs", "1800").unwrap();

        assert_eq!(cfg.session.sound, AmbientSound::Binaural);
        assert!(!cfg.session.fade);
        assert_eq!(cfg.session.chime_interval_min, 15);
        assert_eq!(cfg.session.duration_secs, 1800);
    }

    #[test]
    fn update_rejects_bad_values_without_mutating() {
        let mut cfg = Config::default();
        let err = cfg.update("session.duration_secs", "601").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
        assert!(cfg.update("session.sound", "ocean").is_err());
        assert!(cfg.update("session.fade", "maybe").is_err());
        assert!(matches!(
            cfg.update("session.volume", "3").unwrap_err(),
            CoreError::Config(ConfigError::UnknownKey(_))
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_creates_defaults_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut edited = cfg.clone();
        edited.update("display.bell", "false").unwrap();
        edited.save_to(&path).unwrap();
        assert!(!Config::load_from(&path).unwrap().display.bell);
    }

    #[test]
    fn load_from_rejects_non_preset_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[session]\nduration_secs = 42\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
