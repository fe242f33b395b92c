//! Declarative synth graphs for the remote engine.
//!
//! Graphs are built from unit-generator descriptions, never rendered
//! locally. A finished graph becomes a [`SynthDef`](synthdef::SynthDef),
//! flattened into the engine's binary definition format and registered once
//! before any voice is created.

/// Binary arithmetic between signals.
pub mod amplify;
/// Bus input and output.
pub mod bus;
/// Peak limiting for the master bus.
pub mod dynamics;
/// Envelope generator with a done action.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `*`, `+`, `.dup()`).
pub mod extensions;
/// Summing many signals into one.
pub mod mix;
/// Core graph types: signals, unit generators, rates.
pub mod node;
/// Audio oscillators.
pub mod oscillator;
/// Definition builder and binary encoder.
pub mod synthdef;

pub use extensions::SignalExt;
pub use node::{Rate, Signal, UgenNode};
pub use synthdef::{Params, SynthDef};
