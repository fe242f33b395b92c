//! organ - play a MIDI keyboard through a SuperCollider server
//!
//! Run with: cargo run --bin organ -- --device keystation

mod cli;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use saavy_organ::{
    engine::{osc::ScClient, recording::RecordingEngine, EngineClient},
    io::device::{list_devices, MidiStream},
    runtime, OrganConfig,
};

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.list_devices {
        let devices = list_devices().wrap_err("device discovery failed")?;
        if devices.is_empty() {
            println!("no MIDI inputs found");
        }
        for device in devices {
            println!("{:>3}  {}", device.index, device.name);
        }
        return Ok(());
    }

    let config = cli.config();
    if config.num_partials == 0 {
        return Err(eyre!("a voice needs at least one partial"));
    }

    if cli.dry_run {
        play(RecordingEngine::new().logging(), &config)
    } else {
        let engine = ScClient::connect(&config.local_addr, &config.server_addr, config.reply_timeout)
            .wrap_err_with(|| format!("failed to reach server at {}", config.server_addr))?;
        info!(server = %config.server_addr, "engine connected");
        play(engine, &config)
    }
}

fn play<E: EngineClient>(engine: E, config: &OrganConfig) -> Result<()> {
    let mut dispatcher = runtime::boot(engine, config).wrap_err("engine setup failed")?;

    let stream = MidiStream::open(&config.device, config.queue_depth)
        .wrap_err_with(|| format!("could not open MIDI input matching {:?}", config.device))?;
    info!(device = stream.name(), "listening");

    // The stream stays open for the life of the process, so this only
    // returns on a fatal error.
    dispatcher.run(&stream).wrap_err("organ stopped")?;
    Ok(())
}
