use std::ops::{Add, Mul};

use crate::graph::{
    amplify::{amplify, binary_op, BinaryOp},
    node::Signal,
};

/// Fluent combinators so patches read left to right.
pub trait SignalExt: Into<Signal> + Sized {
    fn amplify(self, modulator: impl Into<Signal>) -> Signal {
        amplify(self.into(), modulator.into())
    }

    fn mix_with(self, other: impl Into<Signal>) -> Signal {
        binary_op(BinaryOp::Add, self.into(), other.into())
    }

    /// Same signal on `n` channels.
    fn dup(self, n: usize) -> Vec<Signal> {
        vec![self.into(); n]
    }
}

impl SignalExt for Signal {}

impl<T: Into<Signal>> Mul<T> for Signal {
    type Output = Signal;

    fn mul(self, rhs: T) -> Signal {
        self.amplify(rhs)
    }
}

impl<T: Into<Signal>> Add<T> for Signal {
    type Output = Signal;

    fn add(self, rhs: T) -> Signal {
        self.mix_with(rhs)
    }
}
