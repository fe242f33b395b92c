use std::rc::Rc;

/// Calculation rate of a unit generator, as the engine encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rate {
    /// Computed once when the synth starts.
    Scalar = 0,
    /// Computed once per control block.
    Control = 1,
    /// Computed per sample.
    Audio = 2,
}

/// Reference to a named synth parameter.
///
/// Created by [`Params::add`](crate::graph::synthdef::Params::add); the index is
/// the parameter's slot in the definition's `Control` unit generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub(crate) index: usize,
}

impl Param {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One edge in a synth graph: a constant, a parameter, or an output of
/// another unit generator.
///
/// Signals are cheap to clone. Cloning a signal that points at a unit
/// generator shares the node, so the same sub-graph can feed several
/// consumers and is still emitted once.
#[derive(Debug, Clone)]
pub enum Signal {
    Constant(f32),
    Param(Param),
    Output { node: Rc<UgenNode>, index: usize },
}

impl Signal {
    pub fn rate(&self) -> Rate {
        match self {
            Signal::Constant(_) => Rate::Scalar,
            Signal::Param(_) => Rate::Control,
            Signal::Output { node, .. } => node.rate,
        }
    }

    /// Constant value, if this signal is one.
    pub fn as_constant(&self) -> Option<f32> {
        match self {
            Signal::Constant(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for Signal {
    fn from(value: f32) -> Self {
        Signal::Constant(value)
    }
}

impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        Signal::Constant(value as f32)
    }
}

impl From<Param> for Signal {
    fn from(param: Param) -> Self {
        Signal::Param(param)
    }
}

/// A unit generator instance in a graph description.
///
/// Nodes are immutable once built; the graph is a DAG of `Rc<UgenNode>`
/// shared through [`Signal::Output`].
#[derive(Debug)]
pub struct UgenNode {
    pub(crate) class: &'static str,
    pub(crate) rate: Rate,
    pub(crate) inputs: Vec<Signal>,
    pub(crate) num_outputs: usize,
    pub(crate) special_index: i16,
}

impl UgenNode {
    pub fn new(class: &'static str, rate: Rate, inputs: Vec<Signal>) -> Self {
        Self {
            class,
            rate,
            inputs,
            num_outputs: 1,
            special_index: 0,
        }
    }

    pub fn with_outputs(mut self, num_outputs: usize) -> Self {
        self.num_outputs = num_outputs;
        self
    }

    pub fn with_special_index(mut self, special_index: i16) -> Self {
        self.special_index = special_index;
        self
    }

    pub fn class(&self) -> &'static str {
        self.class
    }

    pub fn rate(&self) -> Rate {
        self.rate
    }

    pub fn inputs(&self) -> &[Signal] {
        &self.inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    /// First output as a signal.
    pub fn into_signal(self) -> Signal {
        Signal::Output {
            node: Rc::new(self),
            index: 0,
        }
    }

    /// Every output as its own signal (multi-channel generators like `In`).
    pub fn into_channels(self) -> Vec<Signal> {
        let outputs = self.num_outputs;
        let node = Rc::new(self);
        (0..outputs)
            .map(|index| Signal::Output {
                node: Rc::clone(&node),
                index,
            })
            .collect()
    }
}

/// Highest rate among a set of inputs; operators run at this rate.
pub(crate) fn max_rate<'a>(signals: impl IntoIterator<Item = &'a Signal>) -> Rate {
    signals
        .into_iter()
        .map(Signal::rate)
        .max()
        .unwrap_or(Rate::Scalar)
}
