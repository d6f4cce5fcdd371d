use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Gain that mutes a node entirely.
pub const SILENT_DB: f64 = f64::NEG_INFINITY;

/// Handle to a node created by a [`SoundGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Where a node's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sink {
    Node(NodeId),
    /// The speakers.
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    Pink,
    Brown,
}

/// Low-frequency-modulated filter sweeping upward from `base_frequency_hz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoFilterSpec {
    pub rate_hz: f64,
    pub base_frequency_hz: f64,
    pub octaves: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack_secs: f64,
    pub decay_secs: f64,
    pub release_secs: Option<f64>,
}

/// Tone synthesizers the core asks the graph to build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SynthSpec {
    /// Inharmonic percussive voice, used for the singing bowl.
    Metal {
        frequency_hz: f64,
        envelope: Envelope,
        harmonicity: f64,
        modulation_index: f64,
        resonance_hz: f64,
        octaves: f64,
    },
    /// Frequency-modulated voice, used for forest chirps.
    Fm {
        harmonicity: f64,
        modulation_index: f64,
        envelope: Envelope,
        modulation_envelope: Envelope,
    },
}

/// The capability surface the audio controller relies on.
///
/// Implementations wrap a real synthesis backend (`RodioGraph`, behind the
/// `playback` feature) or, like [`VirtualGraph`](super::VirtualGraph), only
/// model the graph. Gains are in
/// decibels; [`SILENT_DB`] mutes.
pub trait SoundGraph {
    fn create_noise(&mut self, color: NoiseColor) -> NodeId;

    fn create_filter(&mut self, spec: AutoFilterSpec) -> NodeId;

    fn create_synth(&mut self, spec: SynthSpec) -> NodeId;

    /// Sine oscillator. `pan` ranges from -1.0 (left) to 1.0 (right).
    fn create_oscillator(&mut self, frequency_hz: f64, pan: f64) -> NodeId;

    fn create_volume(&mut self, gain_db: f64) -> NodeId;

    fn connect(&mut self, source: NodeId, sink: Sink);

    fn set_volume(&mut self, node: NodeId, gain_db: f64);

    /// Move the gain to `gain_db` along a curve lasting `over`.
    fn ramp_volume(&mut self, node: NodeId, gain_db: f64, over: Duration);

    fn start(&mut self, node: NodeId);

    fn stop(&mut self, node: NodeId);

    /// Play a one-shot note on a synth node.
    fn trigger(&mut self, node: NodeId, pitch: &str, length: Duration);
}
