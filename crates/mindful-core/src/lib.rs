//! # Mindful Minutes Core Library
//!
//! This library provides the core logic for the Mindful Minutes meditation
//! timer: a countdown with pause/resume, interval chimes, ambient background
//! sound and per-day session history. Front ends (the `mindful` console
//! binary, or any other UI) send intents and render the events that come
//! back.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine; the caller invokes
//!   `tick()` once per elapsed second while it runs
//! - **Audio Controller**: Maps the selected ambient sound and chimes onto
//!   an abstract [`SoundGraph`]
//! - **Session**: Wires engine, audio and history together and schedules
//!   the delayed follow-ups (auto-reset, fade-out stop) on a tokio task
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`AudioController`]: Ambient sound and chime control
//! - [`MeditationSession`] / [`run_session`]: Session controller and its async driver
//! - [`HistoryStore`]: Completed seconds per calendar day
//! - [`Config`]: Application configuration management

pub mod audio;
pub mod clock;
pub mod error;
pub mod events;
pub mod history;
pub mod session;
pub mod storage;
pub mod timer;

pub use audio::{AudioController, SoundGraph, VirtualGraph};
#[cfg(feature = "playback")]
pub use audio::RodioGraph;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use history::{DaySummary, HistoryStore, MonthSummary};
pub use session::{run_session, Intent, MeditationSession, Outcome};
pub use storage::{Config, DisplayConfig};
pub use timer::{
    format_clock, AmbientSound, DurationPreset, SessionConfig, SettingChange, TimerEngine,
    TimerState, CHIME_INTERVAL_OPTIONS, DURATION_PRESETS,
};
