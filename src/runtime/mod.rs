//! Startup: bring the engine into the state the dispatcher expects.
//!
//! The engine ends up with this node tree:
//!
//! ```text
//! root (0)
//! └── default group (1)
//!     ├── voice group (2)      voices, added at its tail
//!     └── organ_master         reads the voice bus, limits, writes hardware out
//! ```
//!
//! Voices sit before the master in the same parent, so the engine runs
//! them first every block and the master always reads this block's mix.
//!
//! # Example
//!
//! ```ignore
//! use saavy_organ::{config::OrganConfig, engine::recording::RecordingEngine, runtime};
//!
//! let config = OrganConfig::default();
//! let mut dispatcher = runtime::boot(RecordingEngine::new(), &config)?;
//! dispatcher.run(events)?;
//! ```

use tracing::info;

use crate::{
    config::OrganConfig,
    engine::{AddAction, Controls, EngineClient, NodeId, NodeIdAllocator},
    error::Error,
    synth::{DispatchSettings, Dispatcher},
    voices::{organ_master, organ_voice, param, MASTER_DEF},
};

/// Register definitions, build the group tree, start the master, and hand
/// back a dispatcher bound to `engine`.
///
/// Stops at the first failing step; the error names the step.
pub fn boot<E: EngineClient>(mut engine: E, config: &OrganConfig) -> Result<Dispatcher<E>, Error> {
    let mut ids = NodeIdAllocator::new();
    let default_group = NodeId(config.default_group);
    let voice_group = NodeId(config.voice_group);

    let master = organ_master();
    engine
        .register_def(&master)
        .map_err(|source| Error::Registration {
            name: master.name().to_string(),
            source,
        })?;
    info!(def = master.name(), "definition registered");

    engine
        .create_group(default_group, AddAction::Head, NodeId::ROOT)
        .map_err(Error::Group)?;
    info!(group = %default_group, "default group created");

    let routing = Controls::new()
        .with(param::IN, config.voice_bus as f32)
        .with(param::OUT, config.master_out as f32);
    let master_id = ids.next_id();
    engine
        .new_synth(MASTER_DEF, master_id, AddAction::Tail, default_group, &routing)
        .map_err(Error::Master)?;
    // /s_new is not acknowledged; a rejection only shows up at the next sync
    engine.sync().map_err(Error::Master)?;
    info!(id = %master_id, bus = config.voice_bus, out = config.master_out, "master started");

    engine
        .create_group(voice_group, AddAction::Head, default_group)
        .map_err(Error::Group)?;
    info!(group = %voice_group, "voice group created");

    let voice = organ_voice(config.num_partials);
    engine
        .register_def(&voice)
        .map_err(|source| Error::Registration {
            name: voice.name().to_string(),
            source,
        })?;
    info!(def = voice.name(), partials = config.num_partials, "definition registered");

    Ok(Dispatcher::with_ids(
        engine,
        DispatchSettings::from(config),
        ids,
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rosc::OscType;

    use super::*;
    use crate::{
        engine::{
            fake::FakeEngine,
            osc::ScClient,
            recording::{Command, RecordingEngine},
        },
        error::EngineError,
    };

    fn client_for(engine: &FakeEngine) -> ScClient {
        ScClient::connect("127.0.0.1:0", &engine.addr(), Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn startup_commands_in_order() {
        let dispatcher = boot(RecordingEngine::new(), &OrganConfig::default()).unwrap();
        let commands = dispatcher.engine().commands();

        assert_eq!(commands.len(), 5);
        assert!(matches!(&commands[0], Command::RegisterDef { name, .. } if name == "organ_master"));
        assert_eq!(
            commands[1],
            Command::CreateGroup {
                id: NodeId(1),
                action: AddAction::Head,
                target: NodeId::ROOT,
            }
        );
        match &commands[2] {
            Command::NewSynth {
                def,
                action,
                target,
                controls,
                ..
            } => {
                assert_eq!(def, "organ_master");
                assert_eq!(*action, AddAction::Tail);
                assert_eq!(*target, NodeId(1));
                assert_eq!(controls.get("in"), Some(2.0));
                assert_eq!(controls.get("out"), Some(0.0));
            }
            other => panic!("expected master NewSynth, got {other:?}"),
        }
        assert_eq!(
            commands[3],
            Command::CreateGroup {
                id: NodeId(2),
                action: AddAction::Head,
                target: NodeId(1),
            }
        );
        assert!(matches!(&commands[4], Command::RegisterDef { name, .. } if name == "organ_voice"));
    }

    #[test]
    fn voices_continue_the_id_sequence() {
        let mut dispatcher = boot(RecordingEngine::new(), &OrganConfig::default()).unwrap();
        dispatcher
            .handle_message(crate::synth::SynthMessage::NoteOn {
                note: 60,
                velocity: 100,
            })
            .unwrap();

        let ids: Vec<_> = dispatcher.engine().new_synths().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![NodeId(1000), NodeId(1001)]);
    }

    #[test]
    fn boots_against_a_live_engine() {
        let engine = FakeEngine::bind();
        let client = client_for(&engine);

        let server = std::thread::spawn(move || {
            let master = engine.ack_d_recv();
            engine.expect("/g_new");
            engine.ack_sync();
            let (s_new, _) = engine.expect("/s_new");
            engine.ack_sync();
            engine.expect("/g_new");
            engine.ack_sync();
            let voice = engine.ack_d_recv();
            (master, s_new, voice)
        });

        boot(client, &OrganConfig::default()).unwrap();
        let (master, s_new, voice) = server.join().unwrap();
        assert_eq!(master, organ_master().to_bytes());
        assert_eq!(voice, organ_voice(5).to_bytes());
        assert_eq!(s_new.args[0], OscType::String("organ_master".into()));
    }

    #[test]
    fn rejected_master_is_reported_as_master() {
        let engine = FakeEngine::bind();
        let client = client_for(&engine);

        let server = std::thread::spawn(move || {
            engine.ack_d_recv();
            engine.expect("/g_new");
            engine.ack_sync();
            let (_, from) = engine.expect("/s_new");
            engine.reply(
                from,
                "/fail",
                vec![
                    OscType::String("/s_new".into()),
                    OscType::String("SynthDef not found".into()),
                ],
            );
            engine.expect("/sync");
        });

        let result = boot(client, &OrganConfig::default());
        server.join().unwrap();
        match result {
            Err(Error::Master(EngineError::Failed { command, reason })) => {
                assert_eq!(command, "/s_new");
                assert_eq!(reason, "SynthDef not found");
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("boot should fail"),
        }
    }

    #[test]
    fn registration_failure_names_the_definition() {
        let mut engine = RecordingEngine::new();
        engine.fail_next();
        match boot(engine, &OrganConfig::default()) {
            Err(Error::Registration { name, .. }) => assert_eq!(name, "organ_master"),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("boot should fail"),
        }
    }
}
