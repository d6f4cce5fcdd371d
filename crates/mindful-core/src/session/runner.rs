//! Async driver for a [`MeditationSession`].
//!
//! Owns the session on a single task. Three sources wake it up: intents
//! from the UI, the one-second tick interval (present only while the engine
//! runs) and deferred actions coming back from their sleep. Each wake-up is
//! handled to completion before the next one is polled, so ticks never
//! overlap with commands.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::controller::{Deferred, Intent, MeditationSession, Outcome};
use crate::audio::SoundGraph;
use crate::clock::Clock;
use crate::events::Event;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Drive `session` until the intent channel closes, then hand it back.
///
/// Events are forwarded to `events`; a closed event channel is not an
/// error, the session keeps running headless.
pub async fn run_session<G, C>(
    mut session: MeditationSession<G, C>,
    mut intents: mpsc::Receiver<Intent>,
    events: mpsc::UnboundedSender<Event>,
) -> MeditationSession<G, C>
where
    G: SoundGraph,
    C: Clock,
{
    let (wake_tx, mut wake_rx) = mpsc::unbounded_channel::<Deferred>();
    let mut ticker: Option<Interval> = None;

    loop {
        let outcome = tokio::select! {
            intent = intents.recv() => match intent {
                Some(intent) => {
                    tracing::debug!(?intent, "intent");
                    session.apply(intent)
                }
                None => break,
            },
            _ = next_tick(&mut ticker) => session.tick(),
            Some(deferred) = wake_rx.recv() => session.fire(deferred),
        };

        sync_ticker(&mut ticker, session.engine().is_running());
        dispatch(outcome, &wake_tx, &events);
    }

    tracing::debug!("intent channel closed, session runner stopping");
    session
}

/// Resolves on the next tick, or never when no ticker is armed.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Arm a fresh interval on entering Running, drop it on leaving.
fn sync_ticker(ticker: &mut Option<Interval>, running: bool) {
    match (running, ticker.is_some()) {
        (true, false) => {
            let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

fn dispatch(
    outcome: Outcome,
    wake_tx: &mpsc::UnboundedSender<Deferred>,
    events: &mpsc::UnboundedSender<Event>,
) {
    for deferred in outcome.deferred {
        let wake_tx = wake_tx.clone();
        tokio::spawn(async move {
            time::sleep(deferred.delay).await;
            // The runner may already be gone.
            let _ = wake_tx.send(deferred);
        });
    }
    for event in outcome.events {
        if events.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}
