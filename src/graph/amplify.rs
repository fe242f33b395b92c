use crate::graph::node::{max_rate, Signal, UgenNode};

/*
Binary operators
================

Arithmetic between signals is a `BinaryOpUGen`; the operator is selected by
the special index. The operator runs at the fastest rate of its inputs, so
an audio-rate sine times a control-rate amplitude is an audio-rate product.
*/

/// Operator selector for `BinaryOpUGen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add = 0,
    Sub = 1,
    Mul = 2,
}

pub fn binary_op(op: BinaryOp, a: Signal, b: Signal) -> Signal {
    let rate = max_rate([&a, &b]);
    UgenNode::new("BinaryOpUGen", rate, vec![a, b])
        .with_special_index(op as i16)
        .into_signal()
}

/// Multiply a signal by a modulator (gain, envelope, ring modulation).
pub fn amplify(signal: Signal, modulator: Signal) -> Signal {
    binary_op(BinaryOp::Mul, signal, modulator)
}
