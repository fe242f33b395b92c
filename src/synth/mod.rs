// Purpose: Voice management and MIDI dispatch
// This layer sits between the MIDI input and the engine client

pub mod message;
pub mod poly;
pub mod voice;

pub use message::SynthMessage;
pub use poly::{DispatchSettings, Dispatcher, RetriggerPolicy};
pub use voice::VoiceTable;
