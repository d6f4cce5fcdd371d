//! Sample generators behind the playback backend.
//!
//! Everything here is plain iteration over `f32` frames, so it can be
//! exercised without an output device. A [`Voice`] yields interleaved
//! stereo samples: a generator, then the filters and gains of every node
//! on its route to the speakers, then the pan.

use std::f32::consts::{FRAC_PI_4, TAU};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::graph::{AutoFilterSpec, Envelope, NoiseColor, SynthSpec};

pub const SAMPLE_RATE: u32 = 44_100;
pub const CHANNELS: u16 = 2;

/// Frames between re-reads of the shared gains.
const GAIN_BLOCK: usize = 256;

/// Release used when an envelope leaves it unspecified.
const DEFAULT_RELEASE_SECS: f64 = 1.0;

/// Linear amplitude for a gain in decibels. `-inf` maps to 0.
pub fn db_to_gain(db: f64) -> f32 {
    if db == f64::NEG_INFINITY {
        0.0
    } else {
        10f64.powf(db / 20.0) as f32
    }
}

/// Frequency of a scientific pitch name such as `"C4"` or `"F#3"`.
pub fn note_frequency(pitch: &str) -> Option<f64> {
    let mut chars = pitch.trim().chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let rest: String = chars.collect();
    let (shift, octave) = match rest.strip_prefix('#') {
        Some(octave) => (1, octave),
        None => match rest.strip_prefix('b') {
            Some(octave) => (-1, octave),
            None => (0, rest.as_str()),
        },
    };
    let octave: i32 = octave.parse().ok()?;
    let midi = (octave + 1) * 12 + base + shift;
    Some(440.0 * 2f64.powf(f64::from(midi - 69) / 12.0))
}

#[derive(Debug, Clone, Copy)]
struct Ramp {
    from: f32,
    to: f32,
    started: Instant,
    length: Duration,
}

impl Ramp {
    fn value_at(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started);
        if self.length.is_zero() || elapsed >= self.length {
            return self.to;
        }
        let t = elapsed.as_secs_f32() / self.length.as_secs_f32();
        self.from + (self.to - self.from) * t
    }
}

/// A node gain shared between the graph and the voices routed through it.
///
/// Ramps interpolate linear amplitude over wall-clock time, so a fade keeps
/// moving while the audio thread renders.
#[derive(Debug, Clone)]
pub struct GainParam(Arc<Mutex<Ramp>>);

impl GainParam {
    pub fn new(db: f64) -> Self {
        let gain = db_to_gain(db);
        Self(Arc::new(Mutex::new(Ramp {
            from: gain,
            to: gain,
            started: Instant::now(),
            length: Duration::ZERO,
        })))
    }

    pub fn set(&self, db: f64) {
        self.ramp_to(db, Duration::ZERO);
    }

    pub fn ramp_to(&self, db: f64, over: Duration) {
        let now = Instant::now();
        let mut ramp = self.0.lock();
        *ramp = Ramp {
            from: ramp.value_at(now),
            to: db_to_gain(db),
            started: now,
            length: over,
        };
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        self.0.lock().value_at(now)
    }

    pub fn value(&self) -> f32 {
        self.value_at(Instant::now())
    }
}

/// Pink (Kellet filter) or brown (leaky integrator) noise.
#[derive(Debug, Clone)]
pub struct Noise {
    color: NoiseColor,
    rng: Pcg32,
    state: [f32; 7],
}

impl Noise {
    pub fn new(color: NoiseColor, seed: u64) -> Self {
        Self {
            color,
            rng: Pcg32::seed_from_u64(seed),
            state: [0.0; 7],
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        let white: f32 = self.rng.gen_range(-1.0..1.0);
        let b = &mut self.state;
        match self.color {
            NoiseColor::Pink => {
                b[0] = 0.99886 * b[0] + white * 0.0555179;
                b[1] = 0.99332 * b[1] + white * 0.0750759;
                b[2] = 0.96900 * b[2] + white * 0.1538520;
                b[3] = 0.86650 * b[3] + white * 0.3104856;
                b[4] = 0.55000 * b[4] + white * 0.5329522;
                b[5] = -0.7616 * b[5] - white * 0.0168980;
                let pink = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
                b[6] = white * 0.115926;
                pink * 0.11
            }
            NoiseColor::Brown => {
                b[0] = (b[0] + 0.02 * white) / 1.02;
                b[0] * 3.5
            }
        }
    }
}

/// Low-pass whose cutoff sweeps `octaves` above its base with a sine LFO.
#[derive(Debug, Clone)]
pub struct AutoFilter {
    spec: AutoFilterSpec,
    lfo_phase: f32,
    last: f32,
}

impl AutoFilter {
    pub fn new(spec: AutoFilterSpec) -> Self {
        Self {
            spec,
            lfo_phase: 0.0,
            last: 0.0,
        }
    }

    pub fn cutoff_hz(&self) -> f32 {
        let sweep = 0.5 + 0.5 * self.lfo_phase.sin();
        self.spec.base_frequency_hz as f32 * 2f32.powf(self.spec.octaves as f32 * sweep)
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let alpha = 1.0 - (-TAU * self.cutoff_hz() / SAMPLE_RATE as f32).exp();
        self.last += alpha * (input - self.last);
        self.lfo_phase = (self.lfo_phase + TAU * self.spec.rate_hz as f32 / SAMPLE_RATE as f32) % TAU;
        self.last
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sine {
    frequency_hz: f32,
    phase: f32,
}

impl Sine {
    fn new(frequency_hz: f64) -> Self {
        Self {
            frequency_hz: frequency_hz as f32,
            phase: 0.0,
        }
    }

    fn next_sample(&mut self, phase_offset: f32) -> f32 {
        let out = (self.phase + phase_offset).sin();
        self.phase = (self.phase + TAU * self.frequency_hz / SAMPLE_RATE as f32) % TAU;
        out
    }
}

/// Attack, exponential decay to silence, then a linear release once the
/// gate closes. The level reaches about -43 dB at the end of the decay.
pub fn envelope_level(env: &Envelope, t: f64, gate: f64) -> f32 {
    let held = |t: f64| {
        if t < env.attack_secs {
            t / env.attack_secs
        } else {
            (-(t - env.attack_secs) * 5.0 / env.decay_secs.max(1e-3)).exp()
        }
    };
    if t < gate {
        return held(t) as f32;
    }
    let release = env.release_secs.unwrap_or(DEFAULT_RELEASE_SECS);
    let fall = 1.0 - (t - gate) / release.max(1e-3);
    (held(gate) * fall.max(0.0)) as f32
}

/// One struck note of a [`SynthSpec`], rendered as two-operator FM.
#[derive(Debug, Clone)]
pub struct Note {
    carrier: Sine,
    modulator: Sine,
    index: f32,
    envelope: Envelope,
    modulation_envelope: Envelope,
    gate_secs: f64,
    total_frames: u64,
    frame: u64,
}

impl Note {
    pub fn new(spec: &SynthSpec, frequency_hz: f64, length: Duration) -> Self {
        let (harmonicity, index, envelope, modulation_envelope) = match *spec {
            SynthSpec::Metal {
                envelope,
                harmonicity,
                modulation_index,
                ..
            } => (harmonicity, modulation_index, envelope, envelope),
            SynthSpec::Fm {
                harmonicity,
                modulation_index,
                envelope,
                modulation_envelope,
            } => (harmonicity, modulation_index, envelope, modulation_envelope),
        };
        let gate_secs = length.as_secs_f64();
        let total_secs = gate_secs + envelope.release_secs.unwrap_or(DEFAULT_RELEASE_SECS);
        Self {
            carrier: Sine::new(frequency_hz),
            modulator: Sine::new(frequency_hz * harmonicity),
            index: index as f32,
            envelope,
            modulation_envelope,
            gate_secs,
            total_frames: (total_secs * f64::from(SAMPLE_RATE)).round() as u64,
            frame: 0,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.total_frames * 1_000_000_000 / u64::from(SAMPLE_RATE))
    }

    pub fn next_sample(&mut self) -> Option<f32> {
        if self.frame >= self.total_frames {
            return None;
        }
        let t = self.frame as f64 / f64::from(SAMPLE_RATE);
        self.frame += 1;
        let depth = self.index * envelope_level(&self.modulation_envelope, t, self.gate_secs);
        let modulation = self.modulator.next_sample(0.0) * depth;
        let level = envelope_level(&self.envelope, t, self.gate_secs);
        Some(self.carrier.next_sample(modulation) * level * 0.5)
    }
}

#[derive(Debug, Clone)]
pub enum Generator {
    Noise(Noise),
    Oscillator(Sine),
    Note(Note),
}

impl Generator {
    pub fn oscillator(frequency_hz: f64) -> Self {
        Generator::Oscillator(Sine::new(frequency_hz))
    }

    fn next_sample(&mut self) -> Option<f32> {
        match self {
            Generator::Noise(noise) => Some(noise.next_sample()),
            Generator::Oscillator(sine) => Some(sine.next_sample(0.0)),
            Generator::Note(note) => note.next_sample(),
        }
    }
}

/// A node on the way from a generator to the speakers.
#[derive(Debug, Clone)]
pub enum Stage {
    Filter(AutoFilter),
    Gain(GainParam),
}

/// A playing generator with its resolved route and stereo position.
#[derive(Debug, Clone)]
pub struct Voice {
    generator: Generator,
    stages: Vec<Stage>,
    left: f32,
    right: f32,
    gain: f32,
    block_left: usize,
    pending_right: Option<f32>,
}

impl Voice {
    /// `pan` ranges from -1.0 (left) to 1.0 (right), equal-power.
    pub fn new(generator: Generator, stages: Vec<Stage>, pan: f64) -> Self {
        let angle = (pan.clamp(-1.0, 1.0) as f32 + 1.0) * FRAC_PI_4;
        Self {
            generator,
            stages,
            left: angle.cos(),
            right: angle.sin(),
            gain: 0.0,
            block_left: 0,
            pending_right: None,
        }
    }

    /// Playing time, `None` for generators that run until stopped.
    pub fn duration(&self) -> Option<Duration> {
        match &self.generator {
            Generator::Note(note) => Some(note.duration()),
            _ => None,
        }
    }

    fn route_gain(&self) -> f32 {
        let now = Instant::now();
        self.stages
            .iter()
            .map(|stage| match stage {
                Stage::Gain(param) => param.value_at(now),
                Stage::Filter(_) => 1.0,
            })
            .product()
    }

    fn next_frame(&mut self) -> Option<(f32, f32)> {
        if self.block_left == 0 {
            self.gain = self.route_gain();
            self.block_left = GAIN_BLOCK;
        }
        self.block_left -= 1;

        let mut sample = self.generator.next_sample()?;
        for stage in &mut self.stages {
            if let Stage::Filter(filter) = stage {
                sample = filter.process(sample);
            }
        }
        let sample = sample * self.gain;
        Some((sample * self.left, sample * self.right))
    }
}

impl Iterator for Voice {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if let Some(right) = self.pending_right.take() {
            return Some(right);
        }
        let (left, right) = self.next_frame()?;
        self.pending_right = Some(right);
        Some(left)
    }
}
