//! In-memory sound graph.
//!
//! Keeps the node table a real backend would hold (kind, running flag,
//! gain, connections) without producing sound. Every operation is logged
//! under the `mindful::audio` target, and can optionally be journaled for
//! later inspection.

use std::time::Duration;

use super::graph::{AutoFilterSpec, NodeId, NoiseColor, Sink, SoundGraph, SynthSpec};

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Noise(NoiseColor),
    Filter(AutoFilterSpec),
    Synth(SynthSpec),
    Oscillator { frequency_hz: f64, pan: f64 },
    Volume,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualNode {
    pub kind: NodeKind,
    pub started: bool,
    pub gain_db: f64,
    pub outputs: Vec<Sink>,
    pub triggers: u32,
}

/// A recorded graph operation.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOp {
    Create(NodeId),
    Connect(NodeId, Sink),
    SetVolume(NodeId, f64),
    RampVolume(NodeId, f64, Duration),
    Start(NodeId),
    Stop(NodeId),
    Trigger(NodeId, String, Duration),
}

#[derive(Debug, Default)]
pub struct VirtualGraph {
    nodes: Vec<VirtualNode>,
    journal: Option<Vec<GraphOp>>,
}

impl VirtualGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph that also keeps every operation in order.
    pub fn with_journal() -> Self {
        Self {
            nodes: Vec::new(),
            journal: Some(Vec::new()),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&VirtualNode> {
        self.nodes.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn journal(&self) -> &[GraphOp] {
        self.journal.as_deref().unwrap_or(&[])
    }

    pub fn clear_journal(&mut self) {
        if let Some(journal) = self.journal.as_mut() {
            journal.clear();
        }
    }

    fn record(&mut self, op: GraphOp) {
        tracing::debug!(target: "mindful::audio", ?op, "graph op");
        if let Some(journal) = self.journal.as_mut() {
            journal.push(op);
        }
    }

    fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(VirtualNode {
            kind,
            started: false,
            gain_db: 0.0,
            outputs: Vec::new(),
            triggers: 0,
        });
        self.record(GraphOp::Create(id));
        id
    }

    fn with_node(&mut self, id: NodeId, f: impl FnOnce(&mut VirtualNode)) {
        match self.nodes.get_mut(id.0) {
            Some(node) => f(node),
            None => tracing::warn!(target: "mindful::audio", ?id, "unknown node"),
        }
    }
}

impl SoundGraph for VirtualGraph {
    fn create_noise(&mut self, color: NoiseColor) -> NodeId {
        self.add(NodeKind::Noise(color))
    }

    fn create_filter(&mut self, spec: AutoFilterSpec) -> NodeId {
        self.add(NodeKind::Filter(spec))
    }

    fn create_synth(&mut self, spec: SynthSpec) -> NodeId {
        self.add(NodeKind::Synth(spec))
    }

    fn create_oscillator(&mut self, frequency_hz: f64, pan: f64) -> NodeId {
        self.add(NodeKind::Oscillator {
            frequency_hz,
            pan: pan.clamp(-1.0, 1.0),
        })
    }

    fn create_volume(&mut self, gain_db: f64) -> NodeId {
        let id = self.add(NodeKind::Volume);
        self.with_node(id, |node| node.gain_db = gain_db);
        id
    }

    fn connect(&mut self, source: NodeId, sink: Sink) {
        self.with_node(source, |node| {
            if !node.outputs.contains(&sink) {
                node.outputs.push(sink);
            }
        });
        self.record(GraphOp::Connect(source, sink));
    }

    fn set_volume(&mut self, node: NodeId, gain_db: f64) {
        self.with_node(node, |n| n.gain_db = gain_db);
        self.record(GraphOp::SetVolume(node, gain_db));
    }

    fn ramp_volume(&mut self, node: NodeId, gain_db: f64, over: Duration) {
        // No clock here: the ramp lands on its target immediately.
        self.with_node(node, |n| n.gain_db = gain_db);
        self.record(GraphOp::RampVolume(node, gain_db, over));
    }

    fn start(&mut self, node: NodeId) {
        self.with_node(node, |n| n.started = true);
        self.record(GraphOp::Start(node));
    }

    fn stop(&mut self, node: NodeId) {
        self.with_node(node, |n| n.started = false);
        self.record(GraphOp::Stop(node));
    }

    fn trigger(&mut self, node: NodeId, pitch: &str, length: Duration) {
        self.with_node(node, |n| n.triggers += 1);
        self.record(GraphOp::Trigger(node, pitch.to_string(), length));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::graph::SILENT_DB;

    #[test]
    fn tracks_node_state() {
        let mut graph = VirtualGraph::new();
        let osc = graph.create_oscillator(100.0, -3.0);
        let vol = graph.create_volume(-20.0);
        graph.connect(osc, Sink::Node(vol));
        graph.connect(osc, Sink::Node(vol));
        graph.start(osc);
        graph.set_volume(vol, SILENT_DB);

        let node = graph.node(osc).unwrap();
        assert!(node.started);
        assert_eq!(node.outputs, vec![Sink::Node(vol)]);
        assert_eq!(
            node.kind,
            NodeKind::Oscillator {
                frequency_hz: 100.0,
                pan: -1.0
            }
        );
        assert_eq!(graph.node(vol).unwrap().gain_db, SILENT_DB);
        assert!(graph.journal().is_empty(), "journal is opt-in");
    }

    #[test]
    fn journal_keeps_operation_order() {
        let mut graph = VirtualGraph::with_journal();
        let noise = graph.create_noise(NoiseColor::Pink);
        graph.start(noise);
        graph.ramp_volume(noise, -20.0, Duration::from_secs(2));

        assert_eq!(
            graph.journal(),
            &[
                GraphOp::Create(noise),
                GraphOp::Start(noise),
                GraphOp::RampVolume(noise, -20.0, Duration::from_secs(2)),
            ]
        );
        graph.clear_journal();
        assert!(graph.journal().is_empty());
    }
}
