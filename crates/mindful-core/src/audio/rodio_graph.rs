//! Sound graph that plays through the default output device with `rodio`.
//!
//! Generators (noise, oscillators) get their own [`rodio::Sink`] while
//! started; struck notes play as one-shot sources on the stream. Routing is
//! resolved when a generator starts: the voice captures the filters and
//! shared gains of every node between it and the destination, so later
//! volume changes and ramps on those nodes are heard live.

use std::time::Duration;

use rodio::{OutputStream, OutputStreamHandle, Source};

use super::dsp::{self, AutoFilter, GainParam, Generator, Noise, Note, Stage, Voice};
use super::graph::{AutoFilterSpec, NodeId, NoiseColor, Sink, SoundGraph, SynthSpec};
use super::virtual_graph::NodeKind;
use crate::error::{CoreError, Result};

/// Longest route followed before giving up on a cycle.
const MAX_ROUTE_LEN: usize = 16;

impl Source for Voice {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        dsp::CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        dsp::SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        self.duration()
    }
}

struct RodioNode {
    kind: NodeKind,
    gain: GainParam,
    outputs: Vec<Sink>,
    player: Option<rodio::Sink>,
}

pub struct RodioGraph {
    // Dropping the stream silences every sink.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    nodes: Vec<RodioNode>,
}

impl RodioGraph {
    /// Open the default output device.
    ///
    /// # Errors
    /// Returns [`CoreError::Audio`] when no device can be opened.
    pub fn open() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| CoreError::Audio(e.to_string()))?;
        tracing::debug!(target: "mindful::audio", "output stream opened");
        Ok(Self {
            _stream: stream,
            handle,
            nodes: Vec::new(),
        })
    }

    fn add(&mut self, kind: NodeKind, gain_db: f64) -> NodeId {
        let id = NodeId(self.nodes.len());
        tracing::debug!(target: "mindful::audio", ?id, ?kind, "create");
        self.nodes.push(RodioNode {
            kind,
            gain: GainParam::new(gain_db),
            outputs: Vec::new(),
            player: None,
        });
        id
    }

    fn node(&self, id: NodeId) -> Option<&RodioNode> {
        let node = self.nodes.get(id.0);
        if node.is_none() {
            tracing::warn!(target: "mindful::audio", ?id, "unknown node");
        }
        node
    }

    /// Stages from `source` (inclusive) to the destination, or `None` when
    /// the node never reaches the speakers.
    fn route(&self, source: NodeId) -> Option<Vec<Stage>> {
        let mut stages = Vec::new();
        let mut current = source;
        for _ in 0..MAX_ROUTE_LEN {
            let node = self.nodes.get(current.0)?;
            if let NodeKind::Filter(spec) = node.kind {
                stages.push(Stage::Filter(AutoFilter::new(spec)));
            }
            stages.push(Stage::Gain(node.gain.clone()));
            match node.outputs.first()? {
                Sink::Destination => return Some(stages),
                Sink::Node(next) => current = *next,
            }
        }
        tracing::warn!(target: "mindful::audio", ?source, "route too long, assuming a cycle");
        None
    }

    fn voice_for(&self, id: NodeId) -> Option<Voice> {
        let generator = match self.node(id)?.kind {
            NodeKind::Noise(color) => Generator::Noise(Noise::new(color, id.0 as u64 + 1)),
            NodeKind::Oscillator { frequency_hz, .. } => Generator::oscillator(frequency_hz),
            _ => return None,
        };
        let pan = match self.node(id)?.kind {
            NodeKind::Oscillator { pan, .. } => pan,
            _ => 0.0,
        };
        let Some(stages) = self.route(id) else {
            tracing::debug!(target: "mindful::audio", ?id, "not routed to the destination");
            return None;
        };
        Some(Voice::new(generator, stages, pan))
    }
}

impl SoundGraph for RodioGraph {
    fn create_noise(&mut self, color: NoiseColor) -> NodeId {
        self.add(NodeKind::Noise(color), 0.0)
    }

    fn create_filter(&mut self, spec: AutoFilterSpec) -> NodeId {
        self.add(NodeKind::Filter(spec), 0.0)
    }

    fn create_synth(&mut self, spec: SynthSpec) -> NodeId {
        self.add(NodeKind::Synth(spec), 0.0)
    }

    fn create_oscillator(&mut self, frequency_hz: f64, pan: f64) -> NodeId {
        self.add(
            NodeKind::Oscillator {
                frequency_hz,
                pan: pan.clamp(-1.0, 1.0),
            },
            0.0,
        )
    }

    fn create_volume(&mut self, gain_db: f64) -> NodeId {
        self.add(NodeKind::Volume, gain_db)
    }

    fn connect(&mut self, source: NodeId, sink: Sink) {
        if let Some(node) = self.nodes.get_mut(source.0) {
            if !node.outputs.contains(&sink) {
                node.outputs.push(sink);
            }
        }
    }

    fn set_volume(&mut self, node: NodeId, gain_db: f64) {
        if let Some(node) = self.node(node) {
            node.gain.set(gain_db);
        }
    }

    fn ramp_volume(&mut self, node: NodeId, gain_db: f64, over: Duration) {
        if let Some(node) = self.node(node) {
            node.gain.ramp_to(gain_db, over);
        }
    }

    fn start(&mut self, id: NodeId) {
        if self.node(id).map_or(true, |node| node.player.is_some()) {
            return;
        }
        let Some(voice) = self.voice_for(id) else {
            return;
        };
        match rodio::Sink::try_new(&self.handle) {
            Ok(player) => {
                player.append(voice);
                self.nodes[id.0].player = Some(player);
                tracing::debug!(target: "mindful::audio", ?id, "started");
            }
            Err(e) => tracing::warn!(target: "mindful::audio", ?id, error = %e, "start failed"),
        }
    }

    fn stop(&mut self, id: NodeId) {
        if let Some(player) = self.nodes.get_mut(id.0).and_then(|node| node.player.take()) {
            player.stop();
            tracing::debug!(target: "mindful::audio", ?id, "stopped");
        }
    }

    fn trigger(&mut self, id: NodeId, pitch: &str, length: Duration) {
        let Some(node) = self.node(id) else {
            return;
        };
        let NodeKind::Synth(spec) = node.kind else {
            tracing::warn!(target: "mindful::audio", ?id, "trigger on a non-synth node");
            return;
        };
        let Some(frequency_hz) = dsp::note_frequency(pitch) else {
            tracing::warn!(target: "mindful::audio", pitch, "unknown pitch");
            return;
        };
        let Some(stages) = self.route(id) else {
            return;
        };
        let voice = Voice::new(
            Generator::Note(Note::new(&spec, frequency_hz, length)),
            stages,
            0.0,
        );
        if let Err(e) = self.handle.play_raw(voice) {
            tracing::warn!(target: "mindful::audio", error = %e, "chime playback failed");
        }
    }
}
