use crate::graph::node::{max_rate, Rate, Signal, UgenNode};

/*
Sine Oscillator
===============

`SinOsc` is the building block of additive synthesis: a pure tone with no
harmonics of its own. Any timbre can be approximated by summing sines at
chosen frequencies and amplitudes; the organ voice does exactly that with
a short stack of octave-spaced partials.

Inputs on the engine side are (freq, phase). Phase is fixed at 0 here.
*/

pub struct SinOsc;

impl SinOsc {
    /// Audio-rate sine at `freq` Hz.
    pub fn ar(freq: impl Into<Signal>) -> Signal {
        Self::node(Rate::Audio, freq.into()).into_signal()
    }

    /// Control-rate sine, for slow modulation.
    pub fn kr(freq: impl Into<Signal>) -> Signal {
        let freq = freq.into();
        let rate = max_rate([&freq]).max(Rate::Control);
        Self::node(rate, freq).into_signal()
    }

    fn node(rate: Rate, freq: Signal) -> UgenNode {
        UgenNode::new("SinOsc", rate, vec![freq, Signal::Constant(0.0)])
    }
}
