//! The organ's synth definitions.
//!
//! Two templates are registered with the engine at startup:
//!
//! - [`organ_voice`]: one instance per sounding note, an additive stack of
//!   sine partials gated by an envelope that frees the synth on release.
//! - [`organ_master`]: a single instance reading the voice bus through a
//!   limiter to the hardware output.
//!
//! # Example
//!
//! ```ignore
//! use saavy_organ::voices;
//!
//! let master = voices::organ_master();
//! let voice = voices::organ_voice(voices::DEFAULT_PARTIALS);
//! engine.register_def(&master)?;
//! engine.register_def(&voice)?;
//! ```

mod master;
mod organ;

pub use master::{organ_master, MASTER_DEF};
pub use organ::{organ_voice, Partial, PartialStack, DEFAULT_PARTIALS, VOICE_DEF};

/// Parameter names shared by the definitions and the dispatcher.
pub mod param {
    pub const OUT: &str = "out";
    pub const IN: &str = "in";
    pub const AMP: &str = "amp";
    pub const FUNDAMENTAL: &str = "fundamental";
    pub const PBEND: &str = "pbend";
    pub const GATE: &str = "gate";
}
