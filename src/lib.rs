pub mod config;
pub mod engine; // Command contract with the synthesis server
pub mod error;
pub mod graph; // Declarative synth graphs and their binary encoding
pub mod io; // MIDI input and message conversion
pub mod runtime; // Startup sequence
pub mod synth; // Voice management and dispatch
pub mod voices; // The organ voice and master definitions

pub use config::OrganConfig;
pub use error::{Error, Result};
