use crate::graph::{
    amplify::{binary_op, BinaryOp},
    node::Signal,
};

/// Sum any number of signals into one.
///
/// Emitted as a left-leaning chain of `+` operators. An empty mix is silence.
pub fn mix(signals: impl IntoIterator<Item = Signal>) -> Signal {
    signals
        .into_iter()
        .reduce(|acc, s| binary_op(BinaryOp::Add, acc, s))
        .unwrap_or(Signal::Constant(0.0))
}
