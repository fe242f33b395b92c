//! Command contract with the synthesis engine.
//!
//! The organ never renders audio itself. It registers definitions, arranges
//! groups, and creates and updates synth instances on a remote engine. That
//! conversation is captured by [`EngineClient`]; [`osc::ScClient`] speaks it
//! over OSC/UDP and [`recording::RecordingEngine`] keeps it in memory.

pub mod allocator;
#[cfg(test)]
pub(crate) mod fake;
pub mod osc;
pub mod recording;

use std::fmt;

use crate::{error::EngineError, graph::SynthDef};

pub use allocator::NodeIdAllocator;

/// Engine-side node identifier (synth or group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub i32);

impl NodeId {
    /// The engine's root group.
    pub const ROOT: NodeId = NodeId(0);
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a new node goes relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddAction {
    Head = 0,
    Tail = 1,
    Before = 2,
    After = 3,
    Replace = 4,
}

/// Weak reference to a live synth on the engine.
///
/// The engine owns the synth; it frees it when the voice envelope finishes.
/// Holding a handle keeps nothing alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SynthHandle {
    id: NodeId,
}

impl SynthHandle {
    pub fn new(id: NodeId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// Named parameter values, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Controls {
    pairs: Vec<(&'static str, f32)>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: f32) -> Self {
        self.set(name, value);
        self
    }

    /// Set a value, replacing an earlier one with the same name.
    pub fn set(&mut self, name: &'static str, value: f32) {
        match self.pairs.iter_mut().find(|(n, _)| *n == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.pairs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Commands the organ issues to the engine.
///
/// Every call reports failure; none is retried.
pub trait EngineClient {
    /// Register a definition under its name. Re-registering replaces it.
    fn register_def(&mut self, def: &SynthDef) -> Result<(), EngineError>;

    fn create_group(
        &mut self,
        id: NodeId,
        action: AddAction,
        target: NodeId,
    ) -> Result<(), EngineError>;

    /// Instantiate a registered definition.
    fn new_synth(
        &mut self,
        def: &str,
        id: NodeId,
        action: AddAction,
        target: NodeId,
        controls: &Controls,
    ) -> Result<SynthHandle, EngineError>;

    /// Update parameters on a live synth.
    fn set(&mut self, synth: SynthHandle, controls: &Controls) -> Result<(), EngineError>;

    /// Wait until every command sent so far has been processed.
    ///
    /// Surfaces failures of fire-and-forget commands sent before it.
    fn sync(&mut self) -> Result<(), EngineError>;
}

impl<E: EngineClient + ?Sized> EngineClient for &mut E {
    fn register_def(&mut self, def: &SynthDef) -> Result<(), EngineError> {
        (**self).register_def(def)
    }

    fn create_group(
        &mut self,
        id: NodeId,
        action: AddAction,
        target: NodeId,
    ) -> Result<(), EngineError> {
        (**self).create_group(id, action, target)
    }

    fn new_synth(
        &mut self,
        def: &str,
        id: NodeId,
        action: AddAction,
        target: NodeId,
        controls: &Controls,
    ) -> Result<SynthHandle, EngineError> {
        (**self).new_synth(def, id, action, target, controls)
    }

    fn set(&mut self, synth: SynthHandle, controls: &Controls) -> Result<(), EngineError> {
        (**self).set(synth, controls)
    }

    fn sync(&mut self) -> Result<(), EngineError> {
        (**self).sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_replace_by_name() {
        let mut controls = Controls::new().with("gate", 1.0).with("amp", 0.5);
        controls.set("gate", 0.0);
        assert_eq!(controls.len(), 2);
        assert_eq!(controls.get("gate"), Some(0.0));
        assert_eq!(controls.get("pbend"), None);
    }

    #[test]
    fn controls_keep_insertion_order() {
        let controls = Controls::new().with("b", 2.0).with("a", 1.0);
        let names: Vec<_> = controls.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
