//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once
//! per elapsed second while the engine is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!           |
//!           v
//!       Completed -> (auto_reset) -> Idle
//! ```
//!
//! `reset()` returns to Idle from any state.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SessionConfig::default());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* Tick, Chime, TimerFinished */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::preset::DurationPreset;
use super::settings::{SessionConfig, SettingChange};
use crate::error::ValidationError;
use crate::events::Event;
use crate::history::HistoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Session ran to zero. Held until `auto_reset` or the next command.
    Completed,
}

/// Core timer engine.
///
/// Owns the session configuration and countdown. All mutation goes through
/// the command methods; each returns the event it produced, or `None` when
/// the command was rejected in the current state.
///
/// Deserialization checks the same invariants as [`TimerEngine::new`]: the
/// duration is a preset and `remaining_secs` never exceeds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "StoredEngine")]
pub struct TimerEngine {
    config: SessionConfig,
    state: TimerState,
    remaining_secs: u32,
    /// Bumped on every transition into Running. Deferred actions compare
    /// against it to detect that a new session started in the meantime.
    generation: u64,
}

impl TimerEngine {
    /// Create a new timer engine. Starts `Idle` with the full duration.
    ///
    /// A duration that is not a preset falls back to the default one.
    pub fn new(mut config: SessionConfig) -> Self {
        if !DurationPreset::is_preset(config.duration_secs) {
            tracing::warn!(
                duration_secs = config.duration_secs,
                "duration is not a preset, using default"
            );
            config.duration_secs = SessionConfig::default().duration_secs;
        }
        Self {
            remaining_secs: config.duration_secs,
            config,
            state: TimerState::Idle,
            generation: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_secs(&self) -> u32 {
        self.config.duration_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.config.duration_secs - self.remaining_secs
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 0.0 .. 100.0 progress through the current session.
    pub fn progress_pct(&self) -> f64 {
        let total = self.config.duration_secs;
        if total == 0 {
            return 0.0;
        }
        f64::from(self.elapsed_secs()) / f64::from(total) * 100.0
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let resumed = match self.state {
            TimerState::Running => return None,
            TimerState::Paused => true,
            TimerState::Idle => false,
            TimerState::Completed => {
                // Begin a fresh session; the pending auto-reset goes stale.
                self.remaining_secs = self.config.duration_secs;
                false
            }
        };
        self.state = TimerState::Running;
        self.generation += 1;
        Some(Event::TimerStarted {
            remaining_secs: self.remaining_secs,
            duration_secs: self.config.duration_secs,
            resumed,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.state = TimerState::Paused;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_secs = self.config.duration_secs;
        Some(Event::TimerReset {
            duration_secs: self.config.duration_secs,
            at: Utc::now(),
        })
    }

    /// Change the session length. Rejected while running or for values
    /// outside the preset list.
    pub fn set_duration(&mut self, secs: u32) -> Option<Event> {
        if self.is_running() {
            tracing::debug!(secs, "duration change rejected while running");
            return None;
        }
        if !DurationPreset::is_preset(secs) {
            tracing::debug!(secs, "duration change rejected: not a preset");
            return None;
        }
        self.config.duration_secs = secs;
        self.remaining_secs = secs;
        self.state = TimerState::Idle;
        Some(Event::DurationChanged {
            duration_secs: secs,
            at: Utc::now(),
        })
    }

    pub fn apply_setting(&mut self, change: SettingChange) -> Option<Event> {
        change.apply(&mut self.config);
        Some(Event::SettingChanged {
            change,
            at: Utc::now(),
        })
    }

    /// Call once per elapsed second. Returns the `Tick` event, followed by a
    /// `Chime` on interval boundaries or `TimerFinished` when the countdown
    /// reaches zero. Returns nothing unless running.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.state != TimerState::Running {
            return Vec::new();
        }

        // Elapsed time including this tick.
        let elapsed_secs = self.config.duration_secs - self.remaining_secs + 1;
        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        let mut events = vec![Event::Tick {
            remaining_secs: self.remaining_secs,
            elapsed_secs,
        }];

        // The finish chime covers the last boundary.
        if let Some(period) = self.config.chime_period_secs() {
            if elapsed_secs % period == 0 && self.remaining_secs > 0 {
                events.push(Event::Chime {
                    elapsed_secs,
                    at: Utc::now(),
                });
            }
        }

        if self.remaining_secs == 0 {
            self.state = TimerState::Completed;
            events.push(Event::TimerFinished {
                duration_secs: self.config.duration_secs,
                at: Utc::now(),
            });
        }
        events
    }

    /// Return to Idle after a completed session, unless something else
    /// already moved the engine on since `generation` was captured.
    pub fn auto_reset(&mut self, generation: u64) -> Option<Event> {
        if self.state != TimerState::Completed || self.generation != generation {
            tracing::debug!(
                generation,
                current = self.generation,
                state = ?self.state,
                "stale auto-reset skipped"
            );
            return None;
        }
        self.state = TimerState::Idle;
        self.remaining_secs = self.config.duration_secs;
        Some(Event::AutoReset {
            duration_secs: self.config.duration_secs,
            at: Utc::now(),
        })
    }

    /// Build a full state snapshot event for the UI layer.
    pub fn snapshot(&self, history: &HistoryStore) -> Event {
        Event::StateSnapshot {
            state: self.state,
            is_running: self.is_running(),
            remaining_secs: self.remaining_secs,
            duration_secs: self.config.duration_secs,
            progress_pct: self.progress_pct(),
            settings: self.config.clone(),
            history: history.clone(),
            at: Utc::now(),
        }
    }
}

#[derive(Deserialize)]
struct StoredEngine {
    config: SessionConfig,
    state: TimerState,
    remaining_secs: u32,
    generation: u64,
}

impl TryFrom<StoredEngine> for TimerEngine {
    type Error = ValidationError;

    fn try_from(stored: StoredEngine) -> Result<Self, Self::Error> {
        let duration_secs = stored.config.duration_secs;
        if !DurationPreset::is_preset(duration_secs) {
            return Err(ValidationError::UnknownPreset(duration_secs.to_string()));
        }
        if stored.remaining_secs > duration_secs {
            return Err(ValidationError::InvalidValue {
                field: "remaining_secs".into(),
                message: format!(
                    "{} exceeds the {duration_secs}s duration",
                    stored.remaining_secs
                ),
            });
        }
        Ok(Self {
            config: stored.config,
            state: stored.state,
            remaining_secs: stored.remaining_secs,
            generation: stored.generation,
        })
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::preset::DURATION_PRESETS;
    use proptest::prelude::*;

    fn engine(duration_secs: u32, chime_interval_min: u32) -> TimerEngine {
        TimerEngine::new(SessionConfig {
            duration_secs,
            chime_interval_min,
            ..SessionConfig::default()
        })
    }

    fn run_ticks(engine: &mut TimerEngine, n: u32) -> Vec<Event> {
        (0..n).flat_map(|_| engine.tick()).collect()
    }

    fn chimes(events: &[Event]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Chime { elapsed_secs, .. } => Some(*elapsed_secs),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(engine.start().is_some());
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.start().is_none(), "start while running is a no-op");

        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert!(engine.pause().is_none());

        match engine.start() {
            Some(Event::TimerStarted { resumed, .. }) => assert!(resumed),
            other => panic!("Expected TimerStarted, got {other:?}"),
        }
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn ticks_only_while_running() {
        let mut engine = engine(30, 0);
        assert!(engine.tick().is_empty());
        engine.start();
        engine.tick();
        engine.pause();
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_secs(), 29);
    }

    #[test]
    fn reset_from_paused_restores_duration() {
        let mut engine = engine(30, 0);
        engine.start();
        run_ticks(&mut engine, 10);
        engine.pause();
        assert_eq!(engine.remaining_secs(), 20);

        engine.reset();
        assert_eq!(engine.remaining_secs(), 30);
        assert!(!engine.is_running());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn finishes_once_and_auto_resets() {
        let mut engine = engine(30, 0);
        engine.start();
        let events = run_ticks(&mut engine, 30);

        let finished = events
            .iter()
            .filter(|e| matches!(e, Event::TimerFinished { .. }))
            .count();
        assert_eq!(finished, 1);
        assert_eq!(engine.state(), TimerState::Completed);
        assert!(engine.tick().is_empty());

        assert!(engine.auto_reset(engine.generation()).is_some());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 30);
    }

    #[test]
    fn interval_chime_skips_completion_tick() {
        let mut engine = engine(600, 5);
        engine.start();
        let events = run_ticks(&mut engine, 600);
        assert_eq!(chimes(&events), vec![300]);
    }

    #[test]
    fn interval_chime_lands_on_the_tick_leaving_half() {
        let mut engine = engine(600, 5);
        engine.start();
        run_ticks(&mut engine, 299);
        assert_eq!(engine.remaining_secs(), 301);

        let events = engine.tick();
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(chimes(&events), vec![300]);
    }

    #[test]
    fn one_minute_interval_chimes_every_minute() {
        let mut engine = engine(300, 1);
        engine.start();
        let events = run_ticks(&mut engine, 300);
        assert_eq!(chimes(&events), vec![60, 120, 180, 240]);
    }

    #[test]
    fn chime_counts_from_session_start_across_pause() {
        let mut engine = engine(120, 1);
        engine.start();
        run_ticks(&mut engine, 45);
        engine.pause();
        engine.start();
        let events = run_ticks(&mut engine, 15);
        assert_eq!(chimes(&events), vec![60]);
    }

    #[test]
    fn set_duration_rejected_while_running() {
        let mut engine = engine(30, 0);
        engine.start();
        assert!(engine.set_duration(60).is_none());
        assert_eq!(engine.duration_secs(), 30);
        assert!(engine.is_running());
    }

    #[test]
    fn set_duration_rejects_non_presets() {
        let mut engine = engine(30, 0);
        assert!(engine.set_duration(45).is_none());
        assert!(engine.set_duration(0).is_none());
        assert_eq!(engine.duration_secs(), 30);
    }

    #[test]
    fn set_duration_from_paused_discards_progress() {
        let mut engine = engine(30, 0);
        engine.start();
        run_ticks(&mut engine, 5);
        engine.pause();
        assert!(engine.set_duration(120).is_some());
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 120);
    }

    #[test]
    fn stale_auto_reset_is_skipped_after_restart() {
        let mut engine = engine(30, 0);
        engine.start();
        run_ticks(&mut engine, 30);
        let finished_generation = engine.generation();

        // Starting from Completed begins a fresh session.
        engine.start();
        assert_eq!(engine.remaining_secs(), 30);
        engine.tick();

        assert!(engine.auto_reset(finished_generation).is_none());
        assert!(engine.is_running());
        assert_eq!(engine.remaining_secs(), 29);
    }

    #[test]
    fn auto_reset_after_manual_reset_is_noop() {
        let mut engine = engine(30, 0);
        engine.start();
        run_ticks(&mut engine, 30);
        let generation = engine.generation();
        engine.reset();
        assert!(engine.auto_reset(generation).is_none());
        assert_eq!(engine.state(), TimerState::Idle);
    }

    #[test]
    fn non_preset_config_falls_back_to_default() {
        let engine = engine(7, 0);
        assert_eq!(engine.duration_secs(), 600);
    }

    #[test]
    fn progress_tracks_elapsed_time() {
        let mut engine = engine(60, 0);
        assert_eq!(engine.progress_pct(), 0.0);
        engine.start();
        run_ticks(&mut engine, 15);
        assert!((engine.progress_pct() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stored_engine_round_trips() {
        let mut engine = engine(60, 1);
        engine.start();
        run_ticks(&mut engine, 12);
        engine.pause();

        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), TimerState::Paused);
        assert_eq!(restored.remaining_secs(), 48);
        assert_eq!(restored.generation(), engine.generation());
    }

    #[test]
    fn stored_engine_with_remaining_past_duration_is_rejected() {
        let mut value = serde_json::to_value(engine(30, 0)).unwrap();
        value["state"] = "running".into();
        value["remaining_secs"] = 45.into();

        let err = serde_json::from_value::<TimerEngine>(value).unwrap_err();
        assert!(err.to_string().contains("remaining_secs"));
    }

    #[test]
    fn stored_engine_with_non_preset_duration_is_rejected() {
        let mut value = serde_json::to_value(engine(30, 0)).unwrap();
        value["config"]["duration_secs"] = 42.into();
        value["remaining_secs"] = 10.into();

        assert!(serde_json::from_value::<TimerEngine>(value).is_err());
    }

    proptest! {
        #[test]
        fn pause_then_start_resumes_from_paused_remaining(
            preset_idx in 0usize..DURATION_PRESETS.len(),
            fraction in 0.0f64..1.0,
        ) {
            let duration = DURATION_PRESETS[preset_idx].secs;
            let ticks = ((f64::from(duration) * fraction) as u32).min(duration - 1);
            let mut engine = engine(duration, 0);

            engine.start();
            run_ticks(&mut engine, ticks);
            engine.pause();
            let paused_at = engine.remaining_secs();
            engine.start();

            prop_assert_eq!(engine.remaining_secs(), paused_at);
            prop_assert_eq!(paused_at, duration - ticks);
        }
    }
}
