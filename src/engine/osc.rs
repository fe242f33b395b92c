//! OSC/UDP client for a SuperCollider-compatible engine.
//!
//! | command          | message                                     | waits for          |
//! |------------------|---------------------------------------------|--------------------|
//! | register def     | `/d_recv blob`                              | `/done /d_recv`    |
//! | create group     | `/g_new id action target` then `/sync n`    | `/synced n`        |
//! | new synth        | `/s_new def id action target [name value]*` | nothing            |
//! | set parameters   | `/n_set id [name value]*`                   | nothing            |
//! | sync             | `/sync n`                                   | `/synced n`        |
//!
//! Startup commands wait for an acknowledgement so a missing or unhappy
//! engine fails fast. Per-note commands are fire-and-forget: a UDP send
//! error is the only failure they can report until the next sync, which
//! surfaces any `/fail` the engine sent for them.

use std::net::UdpSocket;
use std::time::{Duration, Instant};

use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};
use tracing::{debug, trace};

use crate::{
    engine::{AddAction, Controls, EngineClient, NodeId, SynthHandle},
    error::EngineError,
    graph::SynthDef,
};

const RECV_BUFFER: usize = 65_536;

pub struct ScClient {
    socket: UdpSocket,
    timeout: Duration,
    next_sync: i32,
    buf: Vec<u8>,
}

impl ScClient {
    /// Bind `local` and aim every packet at `server`.
    pub fn connect(local: &str, server: &str, timeout: Duration) -> Result<Self, EngineError> {
        let socket = UdpSocket::bind(local)?;
        socket.connect(server)?;
        debug!(%server, local = %socket.local_addr()?, "engine socket ready");

        Ok(Self {
            socket,
            timeout,
            next_sync: 1,
            buf: vec![0; RECV_BUFFER],
        })
    }

    fn send(&self, addr: &str, args: Vec<OscType>) -> Result<(), EngineError> {
        let packet = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        });
        let bytes = encoder::encode(&packet).map_err(|e| EngineError::Osc(format!("{e:?}")))?;
        trace!(addr, len = bytes.len(), "osc send");
        self.socket.send(&bytes)?;
        Ok(())
    }

    /// Read replies until `check` decides one of them, or the timeout runs out.
    fn await_reply(
        &mut self,
        command: &str,
        mut check: impl FnMut(&OscMessage) -> Option<Result<(), EngineError>>,
    ) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.timeout;
        let timed_out = || EngineError::Timeout {
            command: command.to_string(),
            timeout: self.timeout,
        };

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(timed_out());
            }
            self.socket.set_read_timeout(Some(remaining))?;

            let len = match self.socket.recv(&mut self.buf) {
                Ok(len) => len,
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(timed_out())
                }
                Err(e) => return Err(e.into()),
            };

            let (_, packet) = decoder::decode_udp(&self.buf[..len])
                .map_err(|e| EngineError::Osc(format!("{e:?}")))?;

            let mut messages = Vec::new();
            flatten(packet, &mut messages);
            for msg in &messages {
                trace!(addr = %msg.addr, "osc recv");
                if let Some(result) = check(msg) {
                    return result;
                }
            }
        }
    }

    /// `/sync` round trip: every command sent before it has been processed.
    ///
    /// A `/fail` arriving first belongs to an earlier command and is
    /// reported under that command's name.
    fn round_trip(&mut self, command: &str) -> Result<(), EngineError> {
        let id = self.next_sync;
        self.next_sync = self.next_sync.wrapping_add(1);
        self.send("/sync", vec![OscType::Int(id)])?;

        self.await_reply(command, move |msg| match msg.addr.as_str() {
            "/synced" if msg.args.first() == Some(&OscType::Int(id)) => Some(Ok(())),
            "/fail" => Some(Err(failure(command, msg))),
            _ => None,
        })
    }
}

impl EngineClient for ScClient {
    fn register_def(&mut self, def: &SynthDef) -> Result<(), EngineError> {
        self.send("/d_recv", vec![OscType::Blob(def.to_bytes())])?;
        self.await_reply("/d_recv", |msg| {
            let about_d_recv = matches!(msg.args.first(), Some(OscType::String(s)) if s == "/d_recv");
            match msg.addr.as_str() {
                "/done" if about_d_recv => Some(Ok(())),
                "/fail" if about_d_recv => Some(Err(failure("/d_recv", msg))),
                _ => None,
            }
        })
    }

    fn create_group(
        &mut self,
        id: NodeId,
        action: AddAction,
        target: NodeId,
    ) -> Result<(), EngineError> {
        self.send(
            "/g_new",
            vec![
                OscType::Int(id.0),
                OscType::Int(action as i32),
                OscType::Int(target.0),
            ],
        )?;
        self.round_trip("/g_new")
    }

    fn new_synth(
        &mut self,
        def: &str,
        id: NodeId,
        action: AddAction,
        target: NodeId,
        controls: &Controls,
    ) -> Result<SynthHandle, EngineError> {
        let mut args = vec![
            OscType::String(def.to_string()),
            OscType::Int(id.0),
            OscType::Int(action as i32),
            OscType::Int(target.0),
        ];
        push_controls(&mut args, controls);
        self.send("/s_new", args)?;
        Ok(SynthHandle::new(id))
    }

    fn set(&mut self, synth: SynthHandle, controls: &Controls) -> Result<(), EngineError> {
        let mut args = vec![OscType::Int(synth.id().0)];
        push_controls(&mut args, controls);
        self.send("/n_set", args)
    }

    fn sync(&mut self) -> Result<(), EngineError> {
        self.round_trip("/sync")
    }
}

fn push_controls(args: &mut Vec<OscType>, controls: &Controls) {
    for (name, value) in controls.iter() {
        args.push(OscType::String(name.to_string()));
        args.push(OscType::Float(value));
    }
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for p in bundle.content {
                flatten(p, out);
            }
        }
    }
}

/// `/fail command reason...` into an error, named after the command the
/// engine reports. `fallback` is used when the reply names none.
fn failure(fallback: &str, msg: &OscMessage) -> EngineError {
    let mut strings = msg.args.iter().filter_map(|a| match a {
        OscType::String(s) => Some(s.as_str()),
        _ => None,
    });
    let command = strings.next().unwrap_or(fallback).to_string();
    let reason = strings.collect::<Vec<_>>().join(" ");
    EngineError::Failed { command, reason }
}
