use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use saavy_organ::{synth::RetriggerPolicy, OrganConfig};

#[derive(Parser, Debug)]
#[command(name = "organ")]
#[command(about = "MIDI keyboard organ voiced on a SuperCollider server", long_about = None)]
pub struct Cli {
    /// Case-insensitive substring of the MIDI input to open
    #[arg(short, long, default_value = "keystation")]
    pub device: String,

    /// Events buffered between the MIDI thread and the dispatcher
    #[arg(long, default_value = "16")]
    pub queue_depth: usize,

    /// Synthesis server address
    #[arg(long = "server", default_value = "127.0.0.1:57120")]
    pub server: String,

    /// Local address to bind the OSC socket to
    #[arg(long, default_value = "0.0.0.0:0")]
    pub bind: String,

    /// Seconds to wait for the server to acknowledge startup commands
    #[arg(long, default_value = "5")]
    pub timeout: u64,

    /// Number of partials in each voice
    #[arg(short, long, default_value = "5")]
    pub partials: usize,

    /// Only listen to this MIDI channel (1-16); all channels when omitted
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub channel: Option<u8>,

    /// What to do with a note-on for a note that is already sounding.
    /// `release` (the default) closes the old voice first; `orphan` leaves
    /// it sounding until the engine frees it
    #[arg(long, value_enum, default_value_t = Retrigger::Release)]
    pub retrigger: Retrigger,

    /// Print the available MIDI inputs and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Log engine commands instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Retrigger {
    /// Close the old voice before starting the new one (default)
    Release,
    /// Overwrite the slot and leave the old voice sounding, never released
    Orphan,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn config(&self) -> OrganConfig {
        OrganConfig {
            device: self.device.clone(),
            queue_depth: self.queue_depth,
            server_addr: self.server.clone(),
            local_addr: self.bind.clone(),
            reply_timeout: Duration::from_secs(self.timeout),
            num_partials: self.partials,
            // MIDI channels are numbered from 1 on the command line
            channel: self.channel.map(|c| c - 1),
            retrigger: match self.retrigger {
                Retrigger::Release => RetriggerPolicy::ReleaseStale,
                Retrigger::Orphan => RetriggerPolicy::Orphan,
            },
            ..OrganConfig::default()
        }
    }
}
