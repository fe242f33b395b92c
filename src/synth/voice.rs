use crate::{
    engine::{Controls, EngineClient, SynthHandle},
    error::EngineError,
    voices::param,
};

/// Number of slots: one per playable note number, 0-126.
pub const TABLE_SIZE: usize = 127;

/// Which engine synth is sounding for which note.
///
/// A fixed array indexed by note number. A slot is either empty or holds
/// the handle of the one voice sounding that note, so a note can never
/// sound twice through the table.
#[derive(Debug, Clone)]
pub struct VoiceTable {
    slots: [Option<SynthHandle>; TABLE_SIZE],
}

impl VoiceTable {
    pub fn new() -> Self {
        Self {
            slots: [None; TABLE_SIZE],
        }
    }

    /// Whether `note` has a slot at all.
    pub fn in_range(note: u8) -> bool {
        (note as usize) < TABLE_SIZE
    }

    pub fn get(&self, note: u8) -> Option<SynthHandle> {
        self.slots.get(note as usize).copied().flatten()
    }

    pub fn is_sounding(&self, note: u8) -> bool {
        self.get(note).is_some()
    }

    /// Store `handle` for `note`, overwriting whatever was there.
    ///
    /// Returns the overwritten handle. The caller decides what to do with
    /// it; once dropped here nothing will ever close its gate. Notes
    /// outside the table are ignored.
    pub fn allocate(&mut self, note: u8, handle: SynthHandle) -> Option<SynthHandle> {
        let slot = self.slots.get_mut(note as usize)?;
        slot.replace(handle)
    }

    /// Close the gate of the voice sounding `note` and empty its slot.
    ///
    /// The slot is cleared before the command is sent: the engine frees the
    /// synth on its own once the envelope finishes, and there is no
    /// acknowledgement to wait for. Releasing a silent note is a no-op and
    /// returns `Ok(false)`.
    pub fn release<E: EngineClient>(
        &mut self,
        note: u8,
        engine: &mut E,
    ) -> Result<bool, EngineError> {
        let Some(handle) = self.slots.get_mut(note as usize).and_then(Option::take) else {
            return Ok(false);
        };
        engine.set(handle, &gate_off())?;
        Ok(true)
    }

    /// Release every sounding voice, lowest note first.
    pub fn release_all<E: EngineClient>(&mut self, engine: &mut E) -> Result<usize, EngineError> {
        let mut released = 0;
        for note in 0..TABLE_SIZE as u8 {
            if self.release(note, engine)? {
                released += 1;
            }
        }
        Ok(released)
    }

    /// Apply `f` to every sounding voice in note order, stopping at the
    /// first error.
    pub fn for_each_active<F, Err>(&self, mut f: F) -> Result<(), Err>
    where
        F: FnMut(u8, SynthHandle) -> Result<(), Err>,
    {
        for (note, handle) in self.active() {
            f(note, handle)?;
        }
        Ok(())
    }

    /// Sounding voices as `(note, handle)`, in note order.
    pub fn active(&self) -> impl Iterator<Item = (u8, SynthHandle)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(note, slot)| slot.map(|h| (note as u8, h)))
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for VoiceTable {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn gate_off() -> Controls {
    Controls::new().with(param::GATE, 0.0)
}
