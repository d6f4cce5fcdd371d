mod engine;
mod preset;
mod settings;

pub use engine::{TimerEngine, TimerState};
pub use preset::{format_clock, DurationPreset, CHIME_INTERVAL_OPTIONS, DURATION_PRESETS};
pub use settings::{AmbientSound, SessionConfig, SettingChange};
