#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/*
MIDI 1.0 channel messages
=========================

  status   meaning            data bytes
  0x8n     note off           key, velocity
  0x9n     note on            key, velocity (velocity 0 = note off)
  0xAn     poly aftertouch    key, pressure
  0xBn     control change     controller, value
  0xCn     program change     program
  0xDn     channel pressure   pressure
  0xEn     pitch bend         lsb, msb (14-bit, 0x2000 = centre)
  0xF0+    system messages    varies

`n` is the channel, 0-15. Data bytes always have the top bit clear.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit bend position; `value >> 7` is the coarse 7-bit position.
    PitchBend { channel: u8, value: u16 },
    ProgramChange { channel: u8, program: u8 },
    /// Anything the organ does not act on (aftertouch, clock, sysex).
    Other { status: u8 },
}

impl MidiEvent {
    /// Parse one complete message as delivered by the MIDI backend.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StreamError> {
        let (&status, data) = bytes.split_first().ok_or(StreamError::Empty)?;
        if status < 0x80 {
            return Err(StreamError::MissingStatus(status));
        }

        let channel = status & 0x0F;
        let need = |expected: usize| {
            if data.len() < expected {
                Err(StreamError::Truncated {
                    status,
                    expected,
                    got: data.len(),
                })
            } else {
                Ok(())
            }
        };
        let d = |i: usize| data[i] & 0x7F;

        let event = match status & 0xF0 {
            0x80 => {
                need(2)?;
                MidiEvent::NoteOff {
                    channel,
                    key: d(0),
                    velocity: d(1),
                }
            }
            0x90 => {
                need(2)?;
                MidiEvent::NoteOn {
                    channel,
                    key: d(0),
                    velocity: d(1),
                }
            }
            0xB0 => {
                need(2)?;
                MidiEvent::ControlChange {
                    channel,
                    controller: d(0),
                    value: d(1),
                }
            }
            0xC0 => {
                need(1)?;
                MidiEvent::ProgramChange {
                    channel,
                    program: d(0),
                }
            }
            0xE0 => {
                need(2)?;
                MidiEvent::PitchBend {
                    channel,
                    value: (d(1) as u16) << 7 | d(0) as u16,
                }
            }
            _ => MidiEvent::Other { status },
        };
        Ok(event)
    }

    pub fn channel(&self) -> Option<u8> {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => Some(channel),
            MidiEvent::Other { .. } => None,
        }
    }
}
