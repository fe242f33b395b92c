use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// Coarse bend position treated as "no bend".
pub const BEND_CENTER: u8 = 63;

const ALL_SOUND_OFF: u8 = 120;
const ALL_NOTES_OFF: u8 = 123;

/// Translate a raw MIDI event into an organ message.
///
/// A note-on with velocity 0 is a note-off, exactly like an explicit
/// note-off. `channel_filter` of `None` accepts every channel.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: Option<u8>) -> Option<SynthMessage> {
    if let (Some(wanted), Some(channel)) = (channel_filter, midi.channel()) {
        if wanted != channel {
            return None;
        }
    }

    match midi {
        MidiEvent::NoteOn { key, velocity, .. } if velocity > 0 => Some(SynthMessage::NoteOn {
            note: key,
            velocity,
        }),
        MidiEvent::NoteOn { key, .. } | MidiEvent::NoteOff { key, .. } => {
            Some(SynthMessage::NoteOff { note: key })
        }
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::PitchBend {
            payload: (value >> 7) as u8,
        }),
        MidiEvent::ControlChange { controller, .. }
            if controller == ALL_NOTES_OFF || controller == ALL_SOUND_OFF =>
        {
            Some(SynthMessage::AllNotesOff)
        }
        _ => None,
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Velocity 1-127 to amplitude in (0, 1].
pub fn velocity_to_amp(velocity: u8) -> f32 {
    velocity as f32 / 127.0
}

/// Coarse bend position (0-127) to a frequency multiplier.
///
/// Spans one octave down to one octave up: `2^(2·payload/127 − 1)`.
/// The centre position is pinned to exactly 1.0 so an untouched wheel
/// never detunes.
pub fn bend_multiplier(payload: u8) -> f32 {
    if payload == BEND_CENTER {
        return 1.0;
    }
    let x = 2.0 * (payload as f64 / 127.0) - 1.0;
    2.0_f64.powf(x) as f32
}
