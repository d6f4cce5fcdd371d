use serde::Serialize;

use crate::error::ValidationError;

/// A selectable session length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationPreset {
    pub label: &'static str,
    pub secs: u32,
}

/// Session lengths offered by the duration selector, shortest first.
pub const DURATION_PRESETS: [DurationPreset; 10] = [
    DurationPreset { label: "30s", secs: 30 },
    DurationPreset { label: "1m", secs: 60 },
    DurationPreset { label: "2m", secs: 120 },
    DurationPreset { label: "5m", secs: 300 },
    DurationPreset { label: "10m", secs: 600 },
    DurationPreset { label: "15m", secs: 900 },
    DurationPreset { label: "20m", secs: 1200 },
    DurationPreset { label: "30m", secs: 1800 },
    DurationPreset { label: "45m", secs: 2700 },
    DurationPreset { label: "60m", secs: 3600 },
];

/// Interval chime choices in minutes. 0 turns the chime off.
pub const CHIME_INTERVAL_OPTIONS: [u32; 5] = [0, 1, 5, 10, 15];

impl DurationPreset {
    pub fn from_secs(secs: u32) -> Option<Self> {
        DURATION_PRESETS.iter().copied().find(|p| p.secs == secs)
    }

    pub fn is_preset(secs: u32) -> bool {
        Self::from_secs(secs).is_some()
    }

    /// Parse either a preset label (`"10m"`) or a plain number of seconds
    /// that matches a preset (`"600"`).
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Some(preset) = DURATION_PRESETS
            .iter()
            .copied()
            .find(|p| p.label.eq_ignore_ascii_case(trimmed))
        {
            return Ok(preset);
        }
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Self::from_secs)
            .ok_or_else(|| ValidationError::UnknownPreset(trimmed.to_string()))
    }
}

/// Format seconds as `MM:SS`. Minutes keep counting past 59.
pub fn format_clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
