//! Runtime configuration.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::synth::poly::RetriggerPolicy;
use crate::voices::DEFAULT_PARTIALS;

/// Everything the organ needs to know at startup.
///
/// Defaults reproduce the classic setup: a Keystation keyboard, an engine
/// on the local machine, five partials, voices on bus 2.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct OrganConfig {
    /// Case-insensitive substring of the MIDI input name.
    pub device: String,
    /// Bound on events buffered between the MIDI thread and the dispatcher.
    pub queue_depth: usize,
    pub server_addr: String,
    pub local_addr: String,
    /// How long to wait for the engine to acknowledge startup commands.
    pub reply_timeout: Duration,
    pub num_partials: usize,
    /// Bus the voices write to and the master reads from.
    pub voice_bus: i32,
    /// Hardware output bus of the master.
    pub master_out: i32,
    pub default_group: i32,
    pub voice_group: i32,
    /// Only react to this MIDI channel (0-based). `None` listens to all.
    pub channel: Option<u8>,
    pub retrigger: RetriggerPolicy,
}

impl Default for OrganConfig {
    fn default() -> Self {
        Self {
            device: "keystation".to_string(),
            queue_depth: 16,
            server_addr: "127.0.0.1:57120".to_string(),
            local_addr: "0.0.0.0:0".to_string(),
            reply_timeout: Duration::from_secs(5),
            num_partials: DEFAULT_PARTIALS,
            voice_bus: 2,
            master_out: 0,
            default_group: 1,
            voice_group: 2,
            channel: None,
            retrigger: RetriggerPolicy::default(),
        }
    }
}
