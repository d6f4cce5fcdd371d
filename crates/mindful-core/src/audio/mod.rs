mod controller;
pub mod dsp;
mod graph;
#[cfg(feature = "playback")]
mod rodio_graph;
mod virtual_graph;

pub use controller::{AudioController, Voices, AMBIENT_VOLUME_DB, FADE_DURATION};
pub use graph::{
    AutoFilterSpec, Envelope, NodeId, NoiseColor, Sink, SoundGraph, SynthSpec, SILENT_DB,
};
pub use virtual_graph::{GraphOp, NodeKind, VirtualGraph, VirtualNode};
#[cfg(feature = "playback")]
pub use rodio_graph::RodioGraph;
