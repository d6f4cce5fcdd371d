use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::history::{HistoryStore, MonthSummary};
use crate::timer::{AmbientSound, SessionConfig, SettingChange, TimerState};

/// Every state change in the system produces an Event.
/// The UI layer renders them; nothing else reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        remaining_secs: u32,
        duration_secs: u32,
        /// True when continuing a paused session.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    Tick {
        remaining_secs: u32,
        elapsed_secs: u32,
    },
    /// Interval chime while the session keeps running.
    Chime {
        elapsed_secs: u32,
        at: DateTime<Utc>,
    },
    TimerFinished {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    HistoryRecorded {
        date: NaiveDate,
        added_secs: u64,
        day_total_secs: u64,
    },
    /// The engine returned to Idle after a completed session.
    AutoReset {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    DurationChanged {
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    SettingChanged {
        change: SettingChange,
        at: DateTime<Utc>,
    },
    SoundSelected {
        sound: AmbientSound,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        is_running: bool,
        remaining_secs: u32,
        duration_secs: u32,
        progress_pct: f64,
        settings: SessionConfig,
        history: HistoryStore,
        at: DateTime<Utc>,
    },
    HistoryReport {
        month: MonthSummary,
        lifetime_secs: u64,
        at: DateTime<Utc>,
    },
}
