use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioController, SoundGraph};
use crate::clock::Clock;
use crate::events::Event;
use crate::history::HistoryStore;
use crate::timer::{AmbientSound, SessionConfig, SettingChange, TimerEngine};

/// Pause between a finished session and the automatic return to Idle.
pub const AUTO_RESET_DELAY: Duration = Duration::from_millis(1200);

/// Wait after a stop request before the generators are fully stopped.
/// Slightly longer than the fade so the curve can finish.
pub const SILENCE_DELAY: Duration = Duration::from_millis(2100);

/// A user intent sent by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", content = "value", rename_all = "snake_case")]
pub enum Intent {
    /// The start/pause button.
    Toggle,
    Start,
    Pause,
    Reset,
    SetDuration(u32),
    ChangeSetting(SettingChange),
    SelectSound(AmbientSound),
    Snapshot,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredAction {
    AutoReset,
    SilenceAmbient,
}

/// Work to run after `delay`, valid only while the engine generation still
/// equals `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub action: DeferredAction,
    pub delay: Duration,
    pub generation: u64,
}

/// What a command produced: events for the UI and work to schedule.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outcome {
    pub events: Vec<Event>,
    pub deferred: Vec<Deferred>,
}

impl Outcome {
    fn push(&mut self, event: Option<Event>) {
        self.events.extend(event);
    }

    fn defer(&mut self, action: DeferredAction, delay: Duration, generation: u64) {
        self.deferred.push(Deferred {
            action,
            delay,
            generation,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.deferred.is_empty()
    }
}

/// One meditation screen: timer, ambient audio and history wired together.
///
/// Every method is synchronous and returns an [`Outcome`]; scheduling the
/// one-second ticks and the deferred actions is the caller's job (see
/// [`run_session`](super::run_session)).
#[derive(Debug)]
pub struct MeditationSession<G: SoundGraph, C: Clock> {
    engine: TimerEngine,
    audio: AudioController<G>,
    history: HistoryStore,
    clock: C,
}

impl<G: SoundGraph, C: Clock> MeditationSession<G, C> {
    pub fn new(config: SessionConfig, graph: G, clock: C) -> Self {
        Self {
            engine: TimerEngine::new(config),
            audio: AudioController::new(graph),
            history: HistoryStore::new(),
            clock,
        }
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn audio(&self) -> &AudioController<G> {
        &self.audio
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn apply(&mut self, intent: Intent) -> Outcome {
        match intent {
            Intent::Toggle => self.toggle(),
            Intent::Start => self.start(),
            Intent::Pause => self.pause(),
            Intent::Reset => self.reset(),
            Intent::SetDuration(secs) => self.set_duration(secs),
            Intent::ChangeSetting(change) => self.change_setting(change),
            Intent::SelectSound(sound) => self.select_sound(sound),
            Intent::Snapshot => Outcome {
                events: vec![self.snapshot()],
                deferred: Vec::new(),
            },
            Intent::History => Outcome {
                events: vec![self.history_report()],
                deferred: Vec::new(),
            },
        }
    }

    pub fn toggle(&mut self) -> Outcome {
        if self.engine.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn start(&mut self) -> Outcome {
        let mut out = Outcome::default();
        // Starting is the user gesture that unlocks audio.
        self.audio.initialize();
        if let Some(event) = self.engine.start() {
            let config = self.engine.config();
            self.audio.play_ambient(config.sound, config.fade_enabled);
            out.push(Some(event));
        }
        out
    }

    pub fn pause(&mut self) -> Outcome {
        let mut out = Outcome::default();
        if let Some(event) = self.engine.pause() {
            out.push(Some(event));
            self.stop_ambient(&mut out);
        }
        out
    }

    pub fn reset(&mut self) -> Outcome {
        let mut out = Outcome::default();
        out.push(self.engine.reset());
        self.stop_ambient(&mut out);
        out
    }

    pub fn set_duration(&mut self, secs: u32) -> Outcome {
        let mut out = Outcome::default();
        out.push(self.engine.set_duration(secs));
        out
    }

    pub fn change_setting(&mut self, change: SettingChange) -> Outcome {
        let mut out = Outcome::default();
        out.push(self.engine.apply_setting(change));
        if matches!(change, SettingChange::Sound(_)) {
            self.replay_ambient();
        }
        out
    }

    /// Pick the ambient sound. Takes effect immediately when running.
    pub fn select_sound(&mut self, sound: AmbientSound) -> Outcome {
        self.engine.apply_setting(SettingChange::Sound(sound));
        self.replay_ambient();
        Outcome {
            events: vec![Event::SoundSelected {
                sound,
                at: Utc::now(),
            }],
            deferred: Vec::new(),
        }
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> Outcome {
        let mut out = Outcome::default();
        for event in self.engine.tick() {
            let finished = match &event {
                Event::Chime { .. } => {
                    self.audio.chime();
                    None
                }
                Event::TimerFinished { duration_secs, .. } => Some(u64::from(*duration_secs)),
                _ => None,
            };
            out.events.push(event);
            if let Some(added_secs) = finished {
                self.finish(added_secs, &mut out);
            }
        }
        out
    }

    /// Run a deferred action if it is still current.
    pub fn fire(&mut self, deferred: Deferred) -> Outcome {
        let mut out = Outcome::default();
        match deferred.action {
            DeferredAction::AutoReset => out.push(self.engine.auto_reset(deferred.generation)),
            DeferredAction::SilenceAmbient => {
                if self.engine.generation() == deferred.generation && !self.engine.is_running() {
                    self.audio.silence_generators();
                } else {
                    tracing::debug!(
                        generation = deferred.generation,
                        current = self.engine.generation(),
                        "session restarted, keeping ambient generators"
                    );
                }
            }
        }
        out
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot(&self.history)
    }

    /// Current month of history as shown in the calendar.
    pub fn history_report(&self) -> Event {
        Event::HistoryReport {
            month: self.history.month_containing(self.clock.today()),
            lifetime_secs: self.history.total_secs(),
            at: Utc::now(),
        }
    }

    fn finish(&mut self, added_secs: u64, out: &mut Outcome) {
        self.stop_ambient(out);
        self.audio.chime();

        let date = self.clock.today();
        let day_total_secs = self.history.record(date, added_secs);
        tracing::info!(%date, added_secs, day_total_secs, "session completed");
        out.events.push(Event::HistoryRecorded {
            date,
            added_secs,
            day_total_secs,
        });
        out.defer(
            DeferredAction::AutoReset,
            AUTO_RESET_DELAY,
            self.engine.generation(),
        );
    }

    fn stop_ambient(&mut self, out: &mut Outcome) {
        if self.audio.stop_ambient(self.engine.config().fade_enabled) {
            out.defer(
                DeferredAction::SilenceAmbient,
                SILENCE_DELAY,
                self.engine.generation(),
            );
        }
    }

    fn replay_ambient(&mut self) {
        if self.engine.is_running() {
            let config = self.engine.config();
            self.audio.play_ambient(config.sound, config.fade_enabled);
        }
    }
}
