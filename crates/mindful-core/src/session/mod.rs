mod controller;
mod runner;

pub use controller::{
    Deferred, DeferredAction, Intent, MeditationSession, Outcome, AUTO_RESET_DELAY,
    SILENCE_DELAY,
};
pub use runner::run_session;
