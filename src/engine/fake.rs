//! A scripted stand-in for the engine on a local UDP socket.

use std::net::{SocketAddr, UdpSocket};

use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};

/// `/d_recv` address and `,b` type tag, both padded to four bytes.
const D_RECV_HEADER: &[u8] = b"/d_recv\0,b\0\0";

pub(crate) struct FakeEngine {
    socket: UdpSocket,
}

impl FakeEngine {
    pub(crate) fn bind() -> Self {
        Self {
            socket: UdpSocket::bind("127.0.0.1:0").unwrap(),
        }
    }

    pub(crate) fn addr(&self) -> String {
        self.socket.local_addr().unwrap().to_string()
    }

    /// Next message from the client, with the address to answer.
    pub(crate) fn recv(&self) -> (OscMessage, SocketAddr) {
        let mut buf = vec![0; 65_536];
        let (len, from) = self.socket.recv_from(&mut buf).unwrap();
        (decode(&buf[..len]), from)
    }

    /// Receive one message and check its address.
    pub(crate) fn expect(&self, addr: &str) -> (OscMessage, SocketAddr) {
        let (msg, from) = self.recv();
        assert_eq!(msg.addr, addr, "unexpected command {msg:?}");
        (msg, from)
    }

    pub(crate) fn reply(&self, to: SocketAddr, addr: &str, args: Vec<OscType>) {
        let packet = OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        });
        self.socket
            .send_to(&encoder::encode(&packet).unwrap(), to)
            .unwrap();
    }

    /// Accept a `/d_recv` and acknowledge it.
    pub(crate) fn ack_d_recv(&self) -> Vec<u8> {
        let (msg, from) = self.expect("/d_recv");
        self.reply(from, "/done", vec![OscType::String("/d_recv".into())]);
        match msg.args.into_iter().next() {
            Some(OscType::Blob(bytes)) => bytes,
            other => panic!("expected blob, got {other:?}"),
        }
    }

    /// Accept a `/sync n` and answer `/synced n`.
    pub(crate) fn ack_sync(&self) {
        let (msg, from) = self.expect("/sync");
        self.reply(from, "/synced", msg.args);
    }
}

/// rosc refuses a trailing blob whose length is a multiple of four, so
/// `/d_recv` is unpacked by hand.
fn decode(packet: &[u8]) -> OscMessage {
    if let Some(rest) = packet.strip_prefix(D_RECV_HEADER) {
        let (len, blob) = rest.split_at(4);
        let len = i32::from_be_bytes([len[0], len[1], len[2], len[3]]) as usize;
        return OscMessage {
            addr: "/d_recv".to_string(),
            args: vec![OscType::Blob(blob[..len].to_vec())],
        };
    }

    match decoder::decode_udp(packet).unwrap().1 {
        OscPacket::Message(msg) => msg,
        other => panic!("expected message, got {other:?}"),
    }
}

mod tests {
    use super::*;

    #[test]
    fn d_recv_blob_of_aligned_length_is_unpacked() {
        let packet = OscPacket::Message(OscMessage {
            addr: "/d_recv".to_string(),
            args: vec![OscType::Blob(vec![1, 1, 1, 1, 2, 2, 2, 2])],
        });
        let msg = decode(&encoder::encode(&packet).unwrap());
        assert_eq!(msg.args, vec![OscType::Blob(vec![1, 1, 1, 1, 2, 2, 2, 2])]);
    }
}
