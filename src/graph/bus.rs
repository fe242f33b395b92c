use crate::graph::node::{Rate, Signal, UgenNode};

/// Read channels from a bus.
pub struct In;

impl In {
    /// `channels` consecutive audio buses starting at `bus`, one signal each.
    pub fn ar(bus: impl Into<Signal>, channels: usize) -> Vec<Signal> {
        UgenNode::new("In", Rate::Audio, vec![bus.into()])
            .with_outputs(channels)
            .into_channels()
    }
}

/// Write channels to a bus. Has no outputs; it is always a graph root.
pub struct Out;

impl Out {
    pub fn ar(bus: impl Into<Signal>, channels: Vec<Signal>) -> UgenNode {
        let mut inputs = Vec::with_capacity(channels.len() + 1);
        inputs.push(bus.into());
        inputs.extend(channels);
        UgenNode::new("Out", Rate::Audio, inputs).with_outputs(0)
    }
}
