//! Hardware MIDI input.
//!
//! Finds an input port by case-insensitive substring, connects to it, and
//! hands parsed events to the dispatcher through a bounded queue. The
//! backend callback runs on its own thread; when the queue is full it
//! blocks until the dispatcher catches up, so no event is dropped.
//!
//! The sending end of the queue lives inside the backend connection. While
//! the connection is open the event iterator blocks for more input and
//! never ends; [`MidiStream::close`] disconnects and ends it.

use crossbeam_channel::{bounded, Receiver};
use midir::{Ignore, MidiInput, MidiInputConnection};
use tracing::{debug, info};

use crate::{
    error::{DeviceError, StreamError},
    io::midi::MidiEvent,
};

const CLIENT_NAME: &str = "saavy-organ";

/// An available MIDI input port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiInputDevice {
    pub index: usize,
    pub name: String,
}

/// List every MIDI input port the backend can see.
pub fn list_devices() -> Result<Vec<MidiInputDevice>, DeviceError> {
    let input = MidiInput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
    Ok(port_names(&input)
        .into_iter()
        .enumerate()
        .map(|(index, name)| MidiInputDevice { index, name })
        .collect())
}

/// First device whose name contains `query`, ignoring case.
pub fn find_device<'a>(devices: &'a [MidiInputDevice], query: &str) -> Option<&'a MidiInputDevice> {
    let query = query.to_lowercase();
    devices
        .iter()
        .find(|d| d.name.to_lowercase().contains(&query))
}

fn port_names(input: &MidiInput) -> Vec<String> {
    input
        .ports()
        .iter()
        .enumerate()
        .map(|(i, port)| {
            input
                .port_name(port)
                .unwrap_or_else(|_| format!("Unknown Device {i}"))
        })
        .collect()
}

/// An open MIDI input delivering events in arrival order.
pub struct MidiStream {
    name: String,
    rx: Receiver<Result<MidiEvent, StreamError>>,
    connection: Option<MidiInputConnection<()>>,
}

impl MidiStream {
    /// Open the first input matching `query` with a queue of `queue_depth`
    /// events.
    pub fn open(query: &str, queue_depth: usize) -> Result<Self, DeviceError> {
        let mut input = MidiInput::new(CLIENT_NAME).map_err(|e| DeviceError::Init(e.to_string()))?;
        input.ignore(Ignore::None);

        let devices: Vec<_> = port_names(&input)
            .into_iter()
            .enumerate()
            .map(|(index, name)| MidiInputDevice { index, name })
            .collect();
        let device = find_device(&devices, query)
            .ok_or_else(|| DeviceError::NotFound(query.to_string()))?
            .clone();

        let ports = input.ports();
        let port = ports
            .get(device.index)
            .ok_or_else(|| DeviceError::NotFound(query.to_string()))?;

        let (tx, rx) = bounded(queue_depth.max(1));
        let connection = input
            .connect(
                port,
                "saavy-organ-in",
                move |_timestamp, message, _| {
                    let event = MidiEvent::from_bytes(message);
                    if tx.send(event).is_err() {
                        debug!("midi stream closed, dropping event");
                    }
                },
                (),
            )
            .map_err(|e| DeviceError::Connect {
                name: device.name.clone(),
                reason: e.to_string(),
            })?;

        info!(device = %device.name, queue_depth, "midi input open");
        Ok(Self {
            name: device.name,
            rx,
            connection: Some(connection),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blocking iterator over incoming events.
    ///
    /// Waits for input as long as the connection is open, so it only ends
    /// after [`close`](Self::close).
    pub fn events(&self) -> crossbeam_channel::Iter<'_, Result<MidiEvent, StreamError>> {
        self.rx.iter()
    }

    /// Disconnect from the device.
    ///
    /// Dropping the connection drops the queue's sender, so the returned
    /// iterator yields whatever was still queued and then ends.
    pub fn close(self) -> crossbeam_channel::IntoIter<Result<MidiEvent, StreamError>> {
        if let Some(connection) = self.connection {
            connection.close();
        }
        debug!(device = %self.name, "midi input closed");
        self.rx.into_iter()
    }
}

impl<'a> IntoIterator for &'a MidiStream {
    type Item = Result<MidiEvent, StreamError>;
    type IntoIter = crossbeam_channel::Iter<'a, Result<MidiEvent, StreamError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices() -> Vec<MidiInputDevice> {
        ["Midi Through Port-0", "Keystation 49 MK3", "nanoKONTROL2"]
            .into_iter()
            .enumerate()
            .map(|(index, name)| MidiInputDevice {
                index,
                name: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        let devices = devices();
        assert_eq!(find_device(&devices, "keystation").map(|d| d.index), Some(1));
        assert_eq!(find_device(&devices, "KONTROL").map(|d| d.index), Some(2));
    }

    #[test]
    fn first_match_wins() {
        let devices = devices();
        assert_eq!(find_device(&devices, "o").map(|d| d.index), Some(0));
    }

    #[test]
    fn no_match() {
        assert!(find_device(&devices(), "launchpad").is_none());
    }

    #[test]
    fn close_drains_queue_then_ends() {
        let (tx, rx) = bounded(4);
        let stream = MidiStream {
            name: "Keystation 49 MK3".to_string(),
            rx,
            connection: None,
        };
        tx.send(MidiEvent::from_bytes(&[0x90, 60, 100])).unwrap();
        tx.send(MidiEvent::from_bytes(&[0x80, 60, 0])).unwrap();
        // the backend callback owns the sender; closing the connection drops it
        drop(tx);

        let remaining: Vec<_> = stream.close().collect();
        assert_eq!(remaining.len(), 2);
        assert!(matches!(remaining[1], Ok(MidiEvent::NoteOff { key: 60, .. })));
    }
}
