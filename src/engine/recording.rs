//! In-memory engine that records every command.
//!
//! Used by the test suite and by the binary's dry-run mode, where each
//! command is logged instead of sent.

use tracing::info;

use crate::{
    engine::{AddAction, Controls, EngineClient, NodeId, SynthHandle},
    error::EngineError,
    graph::SynthDef,
};

/// One command as the engine would have received it.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RegisterDef {
        name: String,
        size: usize,
    },
    CreateGroup {
        id: NodeId,
        action: AddAction,
        target: NodeId,
    },
    NewSynth {
        def: String,
        id: NodeId,
        action: AddAction,
        target: NodeId,
        controls: Controls,
    },
    Set {
        id: NodeId,
        controls: Controls,
    },
}

#[derive(Debug, Default)]
pub struct RecordingEngine {
    commands: Vec<Command>,
    fail_next: bool,
    log: bool,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every command at info level as it arrives.
    pub fn logging(mut self) -> Self {
        self.log = true;
        self
    }

    /// Make the next command fail instead of being recorded.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    /// `NewSynth` commands only.
    pub fn new_synths(&self) -> impl Iterator<Item = (NodeId, &Controls)> {
        self.commands.iter().filter_map(|c| match c {
            Command::NewSynth { id, controls, .. } => Some((*id, controls)),
            _ => None,
        })
    }

    /// `Set` commands only.
    pub fn sets(&self) -> impl Iterator<Item = (NodeId, &Controls)> {
        self.commands.iter().filter_map(|c| match c {
            Command::Set { id, controls } => Some((*id, controls)),
            _ => None,
        })
    }

    fn record(&mut self, name: &str, command: Command) -> Result<(), EngineError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(EngineError::Failed {
                command: name.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        if self.log {
            info!(?command, "engine command");
        }
        self.commands.push(command);
        Ok(())
    }
}

impl EngineClient for RecordingEngine {
    fn register_def(&mut self, def: &SynthDef) -> Result<(), EngineError> {
        let command = Command::RegisterDef {
            name: def.name().to_string(),
            size: def.to_bytes().len(),
        };
        self.record("/d_recv", command)
    }

    fn create_group(
        &mut self,
        id: NodeId,
        action: AddAction,
        target: NodeId,
    ) -> Result<(), EngineError> {
        self.record("/g_new", Command::CreateGroup { id, action, target })
    }

    fn new_synth(
        &mut self,
        def: &str,
        id: NodeId,
        action: AddAction,
        target: NodeId,
        controls: &Controls,
    ) -> Result<SynthHandle, EngineError> {
        let command = Command::NewSynth {
            def: def.to_string(),
            id,
            action,
            target,
            controls: controls.clone(),
        };
        self.record("/s_new", command)?;
        Ok(SynthHandle::new(id))
    }

    fn set(&mut self, synth: SynthHandle, controls: &Controls) -> Result<(), EngineError> {
        let command = Command::Set {
            id: synth.id(),
            controls: controls.clone(),
        };
        self.record("/n_set", command)
    }

    /// Nothing is queued in memory; only an injected failure is reported.
    fn sync(&mut self) -> Result<(), EngineError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(EngineError::Failed {
                command: "/sync".to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}
