use std::collections::HashMap;
use std::rc::Rc;

use crate::graph::node::{Param, Rate, Signal, UgenNode};

/*
Synth Definitions
=================

A synth definition is the template the engine instantiates for every
voice. It is declared once, registered once, and never changes; only the
parameters of its instances move at runtime.

We build it as a tree of `UgenNode`s and flatten it into the engine's
binary "SCgf" layout (version 2, big endian):

  file        "SCgf" | i32 version | i16 def count | def*
  def         pstring name
              i32 K | f32 constant[K]
              i32 P | f32 default[P]
              i32 N | (pstring name, i32 index)[N]
              i32 U | ugen[U]
              i16 variant count
  ugen        pstring class | i8 rate | i32 inputs | i32 outputs
              i16 special index
              (i32 ugen index, i32 output index)[inputs]
              i8 rate[outputs]

An input whose ugen index is -1 refers to the constant table instead.

Ordering rule: the engine evaluates unit generators in file order, so every
input must appear before its consumer. A depth-first post-order walk of the
tree gives exactly that. Shared nodes (one `Rc` feeding several inputs) are
remembered by pointer and emitted once.

Parameters live in a single `Control` unit generator placed at index 0,
with one output per parameter.
*/

const MAGIC: &[u8; 4] = b"SCgf";
const VERSION: i32 = 2;

/// Declared parameter: wire name and default value.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: f32,
}

/// Parameter collector handed to the graph-building closure.
#[derive(Debug, Default)]
pub struct Params {
    specs: Vec<ParamSpec>,
}

impl Params {
    /// Declare a parameter and get a signal for it.
    ///
    /// Declaring the same name twice returns the first declaration.
    pub fn add(&mut self, name: &'static str, default: f32) -> Signal {
        if let Some(index) = self.specs.iter().position(|p| p.name == name) {
            return Signal::Param(Param { index });
        }
        self.specs.push(ParamSpec { name, default });
        Signal::Param(Param {
            index: self.specs.len() - 1,
        })
    }
}

/// Flattened input of an encoded unit generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRef {
    Constant(usize),
    Ugen { index: usize, output: usize },
}

/// A unit generator after flattening, in engine order.
#[derive(Debug, Clone, PartialEq)]
pub struct UgenSpec {
    pub class: &'static str,
    pub rate: Rate,
    pub inputs: Vec<InputRef>,
    pub outputs: Vec<Rate>,
    pub special_index: i16,
}

/// A named, flattened synth graph ready to be sent to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthDef {
    name: String,
    params: Vec<ParamSpec>,
    constants: Vec<f32>,
    ugens: Vec<UgenSpec>,
}

impl SynthDef {
    /// Build a definition from a closure that declares parameters and
    /// returns the root (usually an `Out`) of the graph.
    pub fn new(name: impl Into<String>, build: impl FnOnce(&mut Params) -> UgenNode) -> Self {
        let mut params = Params::default();
        let root = Rc::new(build(&mut params));

        let mut flat = Flattener::default();
        if !params.specs.is_empty() {
            flat.ugens.push(UgenSpec {
                class: "Control",
                rate: Rate::Control,
                inputs: Vec::new(),
                outputs: vec![Rate::Control; params.specs.len()],
                special_index: 0,
            });
        }
        flat.visit(&root);

        Self {
            name: name.into(),
            params: params.specs,
            constants: flat.constants,
            ugens: flat.ugens,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn constants(&self) -> &[f32] {
        &self.constants
    }

    pub fn ugens(&self) -> &[UgenSpec] {
        &self.ugens
    }

    /// Unit generators of one class, in engine order.
    pub fn ugens_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a UgenSpec> + 'a {
        self.ugens.iter().filter(move |u| u.class == class)
    }

    /// Constant value behind an input, if it is one.
    pub fn constant(&self, input: InputRef) -> Option<f32> {
        match input {
            InputRef::Constant(i) => self.constants.get(i).copied(),
            InputRef::Ugen { .. } => None,
        }
    }

    /// Encode as a complete SCgf file holding this one definition.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&VERSION.to_be_bytes());
        buf.extend_from_slice(&1i16.to_be_bytes());
        self.write_def(&mut buf);
        buf
    }

    fn write_def(&self, buf: &mut Vec<u8>) {
        write_pstring(buf, &self.name);

        write_count(buf, self.constants.len());
        for c in &self.constants {
            buf.extend_from_slice(&c.to_be_bytes());
        }

        write_count(buf, self.params.len());
        for p in &self.params {
            buf.extend_from_slice(&p.default.to_be_bytes());
        }

        write_count(buf, self.params.len());
        for (index, p) in self.params.iter().enumerate() {
            write_pstring(buf, p.name);
            write_count(buf, index);
        }

        write_count(buf, self.ugens.len());
        for ugen in &self.ugens {
            write_pstring(buf, ugen.class);
            buf.push(ugen.rate as u8);
            write_count(buf, ugen.inputs.len());
            write_count(buf, ugen.outputs.len());
            buf.extend_from_slice(&ugen.special_index.to_be_bytes());
            for input in &ugen.inputs {
                let (a, b) = match *input {
                    InputRef::Constant(i) => (-1, i as i32),
                    InputRef::Ugen { index, output } => (index as i32, output as i32),
                };
                buf.extend_from_slice(&a.to_be_bytes());
                buf.extend_from_slice(&b.to_be_bytes());
            }
            for rate in &ugen.outputs {
                buf.push(*rate as u8);
            }
        }

        // no variants
        buf.extend_from_slice(&0i16.to_be_bytes());
    }
}

#[derive(Default)]
struct Flattener {
    ugens: Vec<UgenSpec>,
    constants: Vec<f32>,
    seen: HashMap<*const UgenNode, usize>,
}

impl Flattener {
    fn visit(&mut self, node: &Rc<UgenNode>) -> usize {
        let key = Rc::as_ptr(node);
        if let Some(&index) = self.seen.get(&key) {
            return index;
        }

        let inputs = node.inputs.iter().map(|s| self.input(s)).collect();
        let index = self.ugens.len();
        self.ugens.push(UgenSpec {
            class: node.class,
            rate: node.rate,
            inputs,
            outputs: vec![node.rate; node.num_outputs],
            special_index: node.special_index,
        });
        self.seen.insert(key, index);
        index
    }

    fn input(&mut self, signal: &Signal) -> InputRef {
        match signal {
            Signal::Constant(value) => InputRef::Constant(self.constant(*value)),
            // Control is always ugen 0 when any parameter exists
            Signal::Param(param) => InputRef::Ugen {
                index: 0,
                output: param.index,
            },
            Signal::Output { node, index } => InputRef::Ugen {
                index: self.visit(node),
                output: *index,
            },
        }
    }

    fn constant(&mut self, value: f32) -> usize {
        match self
            .constants
            .iter()
            .position(|c| c.to_bits() == value.to_bits())
        {
            Some(i) => i,
            None => {
                self.constants.push(value);
                self.constants.len() - 1
            }
        }
    }
}

fn write_pstring(buf: &mut Vec<u8>, s: &str) {
    let bytes = &s.as_bytes()[..s.len().min(u8::MAX as usize)];
    buf.push(bytes.len() as u8);
    buf.extend_from_slice(bytes);
}

fn write_count(buf: &mut Vec<u8>, n: usize) {
    buf.extend_from_slice(&(n as i32).to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{bus::Out, oscillator::SinOsc};

    fn sine_def() -> SynthDef {
        SynthDef::new("sine", |params| {
            let freq = params.add("freq", 440.0);
            let out = params.add("out", 0.0);
            let sig = SinOsc::ar(freq);
            Out::ar(out, vec![sig.clone(), sig])
        })
    }

    #[test]
    fn control_comes_first() {
        let def = sine_def();
        assert_eq!(def.ugens()[0].class, "Control");
        assert_eq!(def.ugens()[0].outputs.len(), 2);
    }

    #[test]
    fn shared_nodes_are_emitted_once() {
        let def = sine_def();
        let classes: Vec<_> = def.ugens().iter().map(|u| u.class).collect();
        assert_eq!(classes, vec!["Control", "SinOsc", "Out"]);

        let out = &def.ugens()[2];
        assert_eq!(out.inputs[1], InputRef::Ugen { index: 1, output: 0 });
        assert_eq!(out.inputs[2], InputRef::Ugen { index: 1, output: 0 });
    }

    #[test]
    fn inputs_precede_consumers() {
        let def = sine_def();
        for (i, ugen) in def.ugens().iter().enumerate() {
            for input in &ugen.inputs {
                if let InputRef::Ugen { index, .. } = input {
                    assert!(*index < i, "{} reads from later ugen {}", ugen.class, index);
                }
            }
        }
    }

    #[test]
    fn constants_are_deduplicated() {
        let def = SynthDef::new("consts", |_| {
            let a = SinOsc::ar(1.0);
            let b = SinOsc::ar(1.0);
            Out::ar(0.0, vec![a, b])
        });
        // bus 0.0 is seen first, then freq 1.0; both phases reuse 0.0
        assert_eq!(def.constants(), &[0.0, 1.0]);
    }

    #[test]
    fn repeated_param_name_reuses_slot() {
        let mut params = Params::default();
        let a = params.add("gate", 1.0);
        let b = params.add("gate", 0.0);
        assert!(matches!((a, b), (Signal::Param(x), Signal::Param(y)) if x == y));
        assert_eq!(params.specs.len(), 1);
    }

    #[test]
    fn header_layout() {
        let bytes = sine_def().to_bytes();
        assert_eq!(&bytes[0..4], b"SCgf");
        assert_eq!(&bytes[4..8], &2i32.to_be_bytes());
        assert_eq!(&bytes[8..10], &1i16.to_be_bytes());
        assert_eq!(bytes[10] as usize, "sine".len());
        assert_eq!(&bytes[11..15], b"sine");
        // constant count follows the name: only the 0.0 phase
        assert_eq!(&bytes[15..19], &1i32.to_be_bytes());
        // ends with zero variants
        assert_eq!(&bytes[bytes.len() - 2..], &0i16.to_be_bytes());
    }

    #[test]
    fn param_names_are_encoded_with_indices() {
        let bytes = sine_def().to_bytes();
        let needle = b"\x04freq\x00\x00\x00\x00\x03out\x00\x00\x00\x01";
        assert!(
            bytes.windows(needle.len()).any(|w| w == needle),
            "parameter name table missing"
        );
    }
}
