//! Organ voice - additive stack of octave-spaced sines.
//!
//! # How It Works
//!
//! 1. N sine partials, partial `i` at `fundamental × pbend × 2^-i`
//! 2. Partial `i` weighted by `amp × 2^-(i+1)`, so the stack never clips
//! 3. Sum multiplied by a gated ADSR (10ms attack, full sustain, 1s release)
//! 4. The envelope frees the synth when the release finishes
//! 5. Duplicated to two channels on the `out` bus
//!
//! Partials go *down* in octaves from the played note, which gives the
//! sound its soft, pipe-like body.

use crate::graph::{
    bus::Out,
    envelope::{Adsr, DoneAction, EnvGen},
    mix::mix,
    oscillator::SinOsc,
    SignalExt, SynthDef,
};
use crate::voices::param;

pub const VOICE_DEF: &str = "organ_voice";
pub const DEFAULT_PARTIALS: usize = 5;

/// Frequency and amplitude ratios of one partial, relative to the voice's
/// bent fundamental and amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    pub freq_ratio: f32,
    pub amp_ratio: f32,
}

/// The additive stack layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialStack {
    count: usize,
}

impl PartialStack {
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn partial(&self, i: usize) -> Partial {
        Partial {
            freq_ratio: 0.5f32.powi(i as i32),
            amp_ratio: 0.5f32.powi(i as i32 + 1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Partial> + '_ {
        (0..self.count).map(|i| self.partial(i))
    }
}

impl Default for PartialStack {
    fn default() -> Self {
        Self::new(DEFAULT_PARTIALS)
    }
}

/// Build the voice definition with `num_partials` sines.
pub fn organ_voice(num_partials: usize) -> SynthDef {
    SynthDef::new(VOICE_DEF, |params| {
        let out = params.add(param::OUT, 0.0);
        let amp = params.add(param::AMP, 0.9);
        let fundamental = params.add(param::FUNDAMENTAL, 440.0);
        let pbend = params.add(param::PBEND, 1.0);
        let gate = params.add(param::GATE, 1.0);

        let stack = PartialStack::new(num_partials);
        let partials = stack.iter().map(|p| {
            let freq = fundamental.clone() * p.freq_ratio * pbend.clone();
            SinOsc::ar(freq) * (amp.clone() * p.amp_ratio)
        });

        let env = EnvGen::new(Adsr::new(0.01, 1.0, 1.0, 1.0), gate)
            .with_done(DoneAction::FreeSelf)
            .kr();

        let sig = mix(partials).amplify(env);
        Out::ar(out, sig.dup(2))
    })
}
