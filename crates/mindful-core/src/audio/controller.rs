use std::time::Duration;

use super::graph::{
    AutoFilterSpec, Envelope, NodeId, NoiseColor, Sink, SoundGraph, SynthSpec, SILENT_DB,
};
use crate::timer::AmbientSound;

/// Master gain while an ambient sound plays.
pub const AMBIENT_VOLUME_DB: f64 = -20.0;

/// Length of the fade-in and fade-out curves.
pub const FADE_DURATION: Duration = Duration::from_secs(2);

const CHIME_PITCH: &str = "C4";
/// A half note at 120 bpm.
const CHIME_LENGTH: Duration = Duration::from_secs(1);

/// Node handles of the pre-built ambient and chime voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voices {
    pub rain_noise: NodeId,
    pub rain_filter: NodeId,
    pub forest_noise: NodeId,
    pub forest_filter: NodeId,
    pub chirp: NodeId,
    pub binaural_left: NodeId,
    pub binaural_right: NodeId,
    pub bowl: NodeId,
    pub master: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AudioState {
    Uninitialized,
    Ready(Voices),
}

/// Reacts to session transitions by driving a [`SoundGraph`].
///
/// Nothing is built until [`initialize`](Self::initialize) runs, which
/// mirrors browsers refusing audio before a user gesture. Every operation
/// is a no-op before that and idempotent afterwards.
#[derive(Debug)]
pub struct AudioController<G: SoundGraph> {
    graph: G,
    state: AudioState,
}

impl<G: SoundGraph> AudioController<G> {
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            state: AudioState::Uninitialized,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, AudioState::Ready(_))
    }

    pub fn voices(&self) -> Option<&Voices> {
        match &self.state {
            AudioState::Ready(voices) => Some(voices),
            AudioState::Uninitialized => None,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Build the voice graph. Returns `true` only on the call that built it.
    pub fn initialize(&mut self) -> bool {
        if self.is_ready() {
            return false;
        }
        let voices = build_voices(&mut self.graph);
        self.state = AudioState::Ready(voices);
        tracing::debug!(target: "mindful::audio", "voice graph ready");
        true
    }

    /// Switch the audible ambient voice to `sound`, fading in when asked.
    pub fn play_ambient(&mut self, sound: AmbientSound, fade: bool) {
        let Some(v) = self.voices().copied() else {
            return;
        };
        self.mute_all(&v);

        match sound {
            AmbientSound::None => return,
            AmbientSound::Rain => self.graph.set_volume(v.rain_noise, 0.0),
            AmbientSound::Forest => self.graph.set_volume(v.forest_noise, 0.0),
            AmbientSound::Binaural => {
                self.graph.start(v.binaural_left);
                self.graph.start(v.binaural_right);
            }
        }

        if fade {
            self.graph
                .ramp_volume(v.master, AMBIENT_VOLUME_DB, FADE_DURATION);
        } else {
            self.graph.set_volume(v.master, AMBIENT_VOLUME_DB);
        }
    }

    /// Bring the master to silence. Returns `true` when the generators are
    /// still running and a later [`silence_generators`](Self::silence_generators)
    /// should follow once the fade has elapsed.
    pub fn stop_ambient(&mut self, fade: bool) -> bool {
        let Some(v) = self.voices().copied() else {
            return false;
        };
        if fade {
            self.graph.ramp_volume(v.master, SILENT_DB, FADE_DURATION);
        } else {
            self.graph.set_volume(v.master, SILENT_DB);
        }
        true
    }

    /// Fully stop the ambient generators.
    pub fn silence_generators(&mut self) {
        if let Some(v) = self.voices().copied() {
            self.mute_all(&v);
        }
    }

    /// Strike the singing bowl once.
    pub fn chime(&mut self) {
        if let Some(v) = self.voices().copied() {
            self.graph.trigger(v.bowl, CHIME_PITCH, CHIME_LENGTH);
        }
    }

    fn mute_all(&mut self, v: &Voices) {
        self.graph.set_volume(v.rain_noise, SILENT_DB);
        self.graph.set_volume(v.forest_noise, SILENT_DB);
        self.graph.stop(v.binaural_left);
        self.graph.stop(v.binaural_right);
    }
}

fn build_voices<G: SoundGraph>(graph: &mut G) -> Voices {
    let master = graph.create_volume(AMBIENT_VOLUME_DB);
    graph.connect(master, Sink::Destination);

    let rain_noise = graph.create_noise(NoiseColor::Pink);
    let rain_filter = graph.create_filter(AutoFilterSpec {
        rate_hz: 4.0,
        base_frequency_hz: 400.0,
        octaves: 2.0,
    });
    graph.connect(rain_noise, Sink::Node(rain_filter));
    graph.connect(rain_filter, Sink::Node(master));
    graph.start(rain_noise);
    graph.start(rain_filter);

    let forest_noise = graph.create_noise(NoiseColor::Brown);
    let forest_filter = graph.create_filter(AutoFilterSpec {
        rate_hz: 2.0,
        base_frequency_hz: 200.0,
        octaves: 1.0,
    });
    graph.connect(forest_noise, Sink::Node(forest_filter));
    graph.connect(forest_filter, Sink::Node(master));
    graph.start(forest_noise);
    graph.start(forest_filter);

    let chirp = graph.create_synth(SynthSpec::Fm {
        harmonicity: 1.0,
        modulation_index: 10.0,
        envelope: Envelope {
            attack_secs: 0.01,
            decay_secs: 0.1,
            release_secs: None,
        },
        modulation_envelope: Envelope {
            attack_secs: 0.01,
            decay_secs: 0.2,
            release_secs: None,
        },
    });
    graph.connect(chirp, Sink::Destination);

    let binaural_left = graph.create_oscillator(100.0, -1.0);
    let binaural_right = graph.create_oscillator(104.0, 1.0);
    graph.connect(binaural_left, Sink::Node(master));
    graph.connect(binaural_right, Sink::Node(master));

    // The bowl bypasses the master so chimes sound during silent sessions.
    let bowl = graph.create_synth(SynthSpec::Metal {
        frequency_hz: 200.0,
        envelope: Envelope {
            attack_secs: 0.001,
            decay_secs: 1.4,
            release_secs: Some(0.2),
        },
        harmonicity: 5.1,
        modulation_index: 32.0,
        resonance_hz: 4000.0,
        octaves: 1.5,
    });
    graph.connect(bowl, Sink::Destination);

    graph.set_volume(master, SILENT_DB);

    Voices {
        rain_noise,
        rain_filter,
        forest_noise,
        forest_filter,
        chirp,
        binaural_left,
        binaural_right,
        bowl,
        master,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::virtual_graph::{GraphOp, VirtualGraph};

    fn ready() -> AudioController<VirtualGraph> {
        let mut audio = AudioController::new(VirtualGraph::with_journal());
        assert!(audio.initialize());
        audio
    }

    fn gain(audio: &AudioController<VirtualGraph>, id: NodeId) -> f64 {
        audio.graph().node(id).unwrap().gain_db
    }

    fn started(audio: &AudioController<VirtualGraph>, id: NodeId) -> bool {
        audio.graph().node(id).unwrap().started
    }

    #[test]
    fn everything_is_noop_before_initialize() {
        let mut audio = AudioController::new(VirtualGraph::with_journal());
        audio.play_ambient(AmbientSound::Rain, true);
        assert!(!audio.stop_ambient(true));
        audio.chime();
        audio.silence_generators();
        assert_eq!(audio.graph().node_count(), 0);
        assert!(audio.graph().journal().is_empty());
    }

    #[test]
    fn initialize_is_idempotent_and_starts_muted() {
        let mut audio = ready();
        let nodes = audio.graph().node_count();
        assert!(!audio.initialize());
        assert_eq!(audio.graph().node_count(), nodes);

        let v = *audio.voices().unwrap();
        assert_eq!(gain(&audio, v.master), SILENT_DB);
        assert!(!started(&audio, v.binaural_left));
    }

    #[test]
    fn play_rain_with_fade_ramps_master() {
        let mut audio = ready();
        let v = *audio.voices().unwrap();
        audio.play_ambient(AmbientSound::Rain, true);

        assert_eq!(gain(&audio, v.rain_noise), 0.0);
        assert_eq!(gain(&audio, v.forest_noise), SILENT_DB);
        assert_eq!(gain(&audio, v.master), AMBIENT_VOLUME_DB);
        assert_eq!(
            audio.graph().journal().last(),
            Some(&GraphOp::RampVolume(v.master, AMBIENT_VOLUME_DB, FADE_DURATION))
        );
    }

    #[test]
    fn switching_to_binaural_mutes_noise() {
        let mut audio = ready();
        let v = *audio.voices().unwrap();
        audio.play_ambient(AmbientSound::Forest, false);
        audio.play_ambient(AmbientSound::Binaural, false);

        assert_eq!(gain(&audio, v.forest_noise), SILENT_DB);
        assert!(started(&audio, v.binaural_left));
        assert!(started(&audio, v.binaural_right));
        assert_eq!(
            audio.graph().journal().last(),
            Some(&GraphOp::SetVolume(v.master, AMBIENT_VOLUME_DB))
        );
    }

    #[test]
    fn silent_selection_leaves_master_alone() {
        let mut audio = ready();
        let v = *audio.voices().unwrap();
        audio.play_ambient(AmbientSound::Binaural, false);
        audio.stop_ambient(false);
        audio.play_ambient(AmbientSound::None, true);

        assert_eq!(gain(&audio, v.master), SILENT_DB);
        assert!(!started(&audio, v.binaural_left));
    }

    #[test]
    fn stop_then_silence() {
        let mut audio = ready();
        let v = *audio.voices().unwrap();
        audio.play_ambient(AmbientSound::Binaural, true);
        assert!(audio.stop_ambient(true));
        assert_eq!(gain(&audio, v.master), SILENT_DB);
        assert!(started(&audio, v.binaural_left), "generators run until silenced");

        audio.silence_generators();
        assert!(!started(&audio, v.binaural_left));
        assert!(!started(&audio, v.binaural_right));
    }

    #[test]
    fn chime_works_without_ambient() {
        let mut audio = ready();
        let v = *audio.voices().unwrap();
        audio.play_ambient(AmbientSound::None, false);
        audio.chime();
        audio.chime();
        assert_eq!(audio.graph().node(v.bowl).unwrap().triggers, 2);
        assert_eq!(
            audio.graph().node(v.bowl).unwrap().outputs,
            vec![Sink::Destination]
        );
    }
}
