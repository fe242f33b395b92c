/// What the dispatcher acts on, after MIDI has been decoded and filtered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: u8 },
    NoteOff { note: u8 },
    /// Coarse 7-bit bend position, 63 = centre.
    PitchBend { payload: u8 },
    AllNotesOff,
}
