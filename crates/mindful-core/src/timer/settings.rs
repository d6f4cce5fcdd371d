use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Background sound played while a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientSound {
    None,
    #[default]
    Rain,
    Forest,
    Binaural,
}

impl AmbientSound {
    pub const ALL: [AmbientSound; 4] = [
        AmbientSound::None,
        AmbientSound::Rain,
        AmbientSound::Forest,
        AmbientSound::Binaural,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AmbientSound::None => "none",
            AmbientSound::Rain => "rain",
            AmbientSound::Forest => "forest",
            AmbientSound::Binaural => "binaural",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AmbientSound::None => "Silent Meditation",
            AmbientSound::Rain => "Gentle Rain",
            AmbientSound::Forest => "Forest Ambience",
            AmbientSound::Binaural => "Binaural Beat (Focus)",
        }
    }
}

impl fmt::Display for AmbientSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AmbientSound {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|sound| sound.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownSound(wanted.to_string()))
    }
}

/// Everything that shapes a session. Owned by the timer engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub duration_secs: u32,
    pub sound: AmbientSound,
    pub fade_enabled: bool,
    /// Minutes between interval chimes. 0 disables them.
    pub chime_interval_min: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10 * 60,
            sound: AmbientSound::Rain,
            fade_enabled: true,
            chime_interval_min: 5,
        }
    }
}

impl SessionConfig {
    /// Chime period in seconds, `None` when interval chimes are off.
    pub fn chime_period_secs(&self) -> Option<u32> {
        match self.chime_interval_min {
            0 => None,
            min => Some(min.saturating_mul(60)),
        }
    }
}

/// A single settings edit coming from the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum SettingChange {
    Sound(AmbientSound),
    Fade(bool),
    ChimeInterval(u32),
}

impl SettingChange {
    /// Build a change from a `(key, value)` pair as sent by a settings form.
    pub fn parse(key: &str, value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        match key.trim() {
            "sound" => Ok(SettingChange::Sound(value.parse()?)),
            "fade" => parse_toggle(value)
                .map(SettingChange::Fade)
                .ok_or_else(|| ValidationError::InvalidValue {
                    field: "fade".into(),
                    message: format!("expected on/off, got '{value}'"),
                }),
            "chime_interval" | "chime" => value
                .trim_end_matches('m')
                .parse::<u32>()
                .map(SettingChange::ChimeInterval)
                .map_err(|_| ValidationError::InvalidValue {
                    field: "chime_interval".into(),
                    message: format!("expected minutes, got '{value}'"),
                }),
            other => Err(ValidationError::UnknownSetting(other.to_string())),
        }
    }

    pub fn apply(self, config: &mut SessionConfig) {
        match self {
            SettingChange::Sound(sound) => config.sound = sound,
            SettingChange::Fade(enabled) => config.fade_enabled = enabled,
            SettingChange::ChimeInterval(min) => config.chime_interval_min = min,
        }
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
