use crate::graph::node::{Rate, Signal, UgenNode};

/// Look-ahead peak limiter.
///
/// Inputs are (in, level, dur): output never exceeds `level`, delayed by
/// `dur` seconds of look-ahead.
pub struct Limiter;

impl Limiter {
    pub const DEFAULT_LEVEL: f32 = 1.0;
    pub const DEFAULT_DUR: f32 = 0.01;

    pub fn ar(input: Signal) -> Signal {
        Self::ar_with(input, Self::DEFAULT_LEVEL, Self::DEFAULT_DUR)
    }

    pub fn ar_with(input: Signal, level: f32, dur: f32) -> Signal {
        UgenNode::new(
            "Limiter",
            Rate::Audio,
            vec![input, Signal::Constant(level), Signal::Constant(dur)],
        )
        .into_signal()
    }
}
