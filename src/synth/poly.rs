#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    config::OrganConfig,
    engine::{AddAction, Controls, EngineClient, NodeId, NodeIdAllocator},
    error::{EngineError, Error, StreamError},
    io::{
        converter::{bend_multiplier, midi_note_to_freq, midi_to_synth, velocity_to_amp},
        midi::MidiEvent,
    },
    synth::{
        message::SynthMessage,
        voice::VoiceTable,
    },
    voices::{param, VOICE_DEF},
};

/// What to do with a note-on for a note that is already sounding.
///
/// Normally a keyboard sends a note-off in between; a double note-on is a
/// hardware or protocol glitch.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetriggerPolicy {
    /// Close the gate of the old voice, then start the new one.
    #[default]
    ReleaseStale,
    /// Overwrite the slot and leave the old voice sounding on the engine.
    Orphan,
}

/// Static voice placement and routing.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchSettings {
    pub def: String,
    pub group: NodeId,
    pub bus: f32,
    pub channel: Option<u8>,
    pub retrigger: RetriggerPolicy,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self::from(&OrganConfig::default())
    }
}

impl From<&OrganConfig> for DispatchSettings {
    fn from(config: &OrganConfig) -> Self {
        Self {
            def: VOICE_DEF.to_string(),
            group: NodeId(config.voice_group),
            bus: config.voice_bus as f32,
            channel: config.channel,
            retrigger: config.retrigger,
        }
    }
}

/// The event loop: turns note and bend events into engine commands.
///
/// Per note the state machine is
///
/// ```text
/// SILENT   --note-on (vel > 0)-->           SOUNDING
/// SOUNDING --note-off or note-on (vel 0)--> SILENT
/// SILENT   --note-off-->                    SILENT   (no-op)
/// ```
///
/// Pitch bend is global: it is pushed to every sounding voice and kept so
/// that voices started later begin at the current bend.
pub struct Dispatcher<E> {
    engine: E,
    voices: VoiceTable,
    ids: NodeIdAllocator,
    bend: f32,
    settings: DispatchSettings,
}

impl<E: EngineClient> Dispatcher<E> {
    pub fn new(engine: E, settings: DispatchSettings) -> Self {
        Self::with_ids(engine, settings, NodeIdAllocator::new())
    }

    /// Continue an id sequence already used during startup.
    pub fn with_ids(engine: E, settings: DispatchSettings, ids: NodeIdAllocator) -> Self {
        Self {
            engine,
            voices: VoiceTable::new(),
            ids,
            bend: 1.0,
            settings,
        }
    }

    /// Drain `events` in arrival order until they end or something fails.
    ///
    /// Blocks whenever the source blocks. Any stream or engine error ends
    /// the loop and is returned.
    pub fn run<I>(&mut self, events: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Result<MidiEvent, StreamError>>,
    {
        for event in events {
            let event = event?;
            self.handle_event(event).map_err(Error::Command)?;
        }
        debug!("input stream closed");
        Ok(())
    }

    pub fn handle_event(&mut self, event: MidiEvent) -> Result<(), EngineError> {
        match midi_to_synth(event, self.settings.channel) {
            Some(msg) => self.handle_message(msg),
            None => Ok(()),
        }
    }

    pub fn handle_message(&mut self, msg: SynthMessage) -> Result<(), EngineError> {
        match msg {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note } => self.note_off(note),
            SynthMessage::PitchBend { payload } => self.pitch_bend(payload),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    fn note_on(&mut self, note: u8, velocity: u8) -> Result<(), EngineError> {
        if !VoiceTable::in_range(note) {
            warn!(note, "note outside voice table, ignored");
            return Ok(());
        }

        if self.voices.is_sounding(note) && self.settings.retrigger == RetriggerPolicy::ReleaseStale
        {
            warn!(note, "note-on for a sounding note, releasing the old voice");
            self.voices.release(note, &mut self.engine)?;
        }

        let controls = Controls::new()
            .with(param::AMP, velocity_to_amp(velocity))
            .with(param::FUNDAMENTAL, midi_note_to_freq(note))
            .with(param::PBEND, self.bend)
            .with(param::GATE, 1.0)
            .with(param::OUT, self.settings.bus);

        let id = self.ids.next_id();
        let handle = self.engine.new_synth(
            &self.settings.def,
            id,
            AddAction::Tail,
            self.settings.group,
            &controls,
        )?;
        debug!(note, velocity, %id, "voice started");

        if let Some(orphan) = self.voices.allocate(note, handle) {
            warn!(note, orphan = %orphan.id(), "voice orphaned by retrigger");
        }
        Ok(())
    }

    fn note_off(&mut self, note: u8) -> Result<(), EngineError> {
        if self.voices.release(note, &mut self.engine)? {
            debug!(note, "voice released");
        }
        Ok(())
    }

    fn pitch_bend(&mut self, payload: u8) -> Result<(), EngineError> {
        self.bend = bend_multiplier(payload);
        let controls = Controls::new().with(param::PBEND, self.bend);

        let engine = &mut self.engine;
        self.voices
            .for_each_active(|_, handle| engine.set(handle, &controls))?;
        debug!(payload, bend = self.bend, voices = self.voices.active_count(), "bend");
        Ok(())
    }

    fn all_notes_off(&mut self) -> Result<(), EngineError> {
        let released = self.voices.release_all(&mut self.engine)?;
        debug!(released, "all notes off");
        Ok(())
    }

    /// Current bend multiplier applied to new and sounding voices.
    pub fn bend(&self) -> f32 {
        self.bend
    }

    pub fn voices(&self) -> &VoiceTable {
        &self.voices
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn into_engine(self) -> E {
        self.engine
    }
}
