//! Wire encoding for the three peer-to-peer operations (§6).
//!
//! Each message is length-prefixed and type-tagged, then written with
//! [`byteorder`]'s `NetworkEndian` helpers, following the same framing the
//! teacher's DHT implementation uses for its own peer-to-peer messages. This
//! is a greenfield network, so the source's XML-RPC wire format is not
//! preserved; a length-framed binary encoding is explicitly acceptable for
//! that case.
//!
//! A `peer` on the wire is an `i64` identifier followed by a `u16` byte
//! count and that many UTF-8 bytes holding the socket address string. The
//! empty sentinel peer ([`PeerHandle::empty`]) round-trips like any other.
//!
//! [`PeerHandle::empty`]: ../peer/struct.PeerHandle.html

use crate::identifier::Id;
use crate::peer::PeerHandle;
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{self, Cursor, Read};

/// Messages exchanged between peers.
///
/// For each of the three remote operations in §4.5/§4.6 there is a request
/// variant and a reply variant.
#[derive(Debug)]
pub enum Message {
    /// Find the peer responsible for `id`.
    FindSuccessor(Id),
    /// Reply to `FindSuccessor` with the peer found.
    FindSuccessorReply(PeerHandle),
    /// Ask the receiver to report its current predecessor.
    GetPredecessor,
    /// Reply to `GetPredecessor` with the predecessor (possibly empty).
    PredecessorReply(PeerHandle),
    /// Tell the receiver "I believe I am your predecessor".
    Notify(PeerHandle),
    /// Acknowledge a `Notify`. The value carries no information; its mere
    /// presence indicates success, per §6.
    NotifyAck,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Message::FindSuccessor(id) => write!(f, "FindSuccessor({})", id),
            Message::FindSuccessorReply(peer) => write!(f, "FindSuccessorReply({})", peer),
            Message::GetPredecessor => write!(f, "GetPredecessor"),
            Message::PredecessorReply(peer) => write!(f, "PredecessorReply({})", peer),
            Message::Notify(peer) => write!(f, "Notify({})", peer),
            Message::NotifyAck => write!(f, "NotifyAck"),
        }
    }
}

impl Message {
    pub const MAX_LENGTH: usize = 64000;

    const FIND_SUCCESSOR: u16 = 1;
    const FIND_SUCCESSOR_REPLY: u16 = 2;
    const GET_PREDECESSOR: u16 = 3;
    const PREDECESSOR_REPLY: u16 = 4;
    const NOTIFY: u16 = 5;
    const NOTIFY_ACK: u16 = 6;

    /// Parses a full message (length prefix included) from `buffer`.
    pub fn parse(buffer: &[u8]) -> io::Result<Self> {
        let mut cursor = Cursor::new(buffer);
        let size = cursor.read_u16::<NetworkEndian>()? as usize;
        let msg_type = cursor.read_u16::<NetworkEndian>()?;

        if buffer.len() != size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "non-matching message size",
            ));
        }

        let msg = match msg_type {
            Self::FIND_SUCCESSOR => Message::FindSuccessor(cursor.read_i64::<NetworkEndian>()?),
            Self::FIND_SUCCESSOR_REPLY => {
                Message::FindSuccessorReply(read_peer(&mut cursor)?)
            }
            Self::GET_PREDECESSOR => Message::GetPredecessor,
            Self::PREDECESSOR_REPLY => Message::PredecessorReply(read_peer(&mut cursor)?),
            Self::NOTIFY => Message::Notify(read_peer(&mut cursor)?),
            Self::NOTIFY_ACK => Message::NotifyAck,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "unknown message type",
                ))
            }
        };

        Ok(msg)
    }

    /// Encodes this message, including its length prefix, into `buffer`.
    /// `buffer` is cleared first so it can be reused across calls.
    pub fn write_bytes(&self, buffer: &mut Vec<u8>) -> io::Result<()> {
        buffer.clear();
        buffer.write_u16::<NetworkEndian>(0)?;

        match self {
            Message::FindSuccessor(id) => {
                buffer.write_u16::<NetworkEndian>(Self::FIND_SUCCESSOR)?;
                buffer.write_i64::<NetworkEndian>(*id)?;
            }
            Message::FindSuccessorReply(peer) => {
                buffer.write_u16::<NetworkEndian>(Self::FIND_SUCCESSOR_REPLY)?;
                write_peer(buffer, peer)?;
            }
            Message::GetPredecessor => {
                buffer.write_u16::<NetworkEndian>(Self::GET_PREDECESSOR)?;
            }
            Message::PredecessorReply(peer) => {
                buffer.write_u16::<NetworkEndian>(Self::PREDECESSOR_REPLY)?;
                write_peer(buffer, peer)?;
            }
            Message::Notify(peer) => {
                buffer.write_u16::<NetworkEndian>(Self::NOTIFY)?;
                write_peer(buffer, peer)?;
            }
            Message::NotifyAck => {
                buffer.write_u16::<NetworkEndian>(Self::NOTIFY_ACK)?;
            }
        }

        let size = buffer.len();
        if size > Self::MAX_LENGTH {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "message exceeded maximum length",
            ));
        }

        buffer.as_mut_slice().write_u16::<NetworkEndian>(size as u16)?;

        Ok(())
    }
}

fn write_peer(buffer: &mut Vec<u8>, peer: &PeerHandle) -> io::Result<()> {
    buffer.write_i64::<NetworkEndian>(peer.id)?;
    let addr_bytes = peer.addr.as_bytes();
    buffer.write_u16::<NetworkEndian>(addr_bytes.len() as u16)?;
    buffer.extend_from_slice(addr_bytes);
    Ok(())
}

fn read_peer(cursor: &mut Cursor<&[u8]>) -> io::Result<PeerHandle> {
    let id = cursor.read_i64::<NetworkEndian>()?;
    let addr_len = cursor.read_u16::<NetworkEndian>()? as usize;

    let mut addr_bytes = vec![0u8; addr_len];
    cursor.read_exact(&mut addr_bytes)?;
    let addr = String::from_utf8(addr_bytes)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "non-utf8 address"))?;

    Ok(PeerHandle { id, addr })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(msg: Message) -> Message {
        let mut buffer = Vec::new();
        msg.write_bytes(&mut buffer).unwrap();
        Message::parse(&buffer).unwrap()
    }

    #[test]
    fn find_successor_roundtrips() {
        match roundtrip(Message::FindSuccessor(42)) {
            Message::FindSuccessor(id) => assert_eq!(id, 42),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn peer_payload_roundtrips_including_empty_sentinel() {
        let peer = PeerHandle::empty();
        match roundtrip(Message::PredecessorReply(peer.clone())) {
            Message::PredecessorReply(got) => assert_eq!(got, peer),
            other => panic!("unexpected {:?}", other),
        }

        let peer = PeerHandle {
            id: 7,
            addr: "192.168.1.7:9000".to_string(),
        };
        match roundtrip(Message::Notify(peer.clone())) {
            Message::Notify(got) => assert_eq!(got, peer),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_truncated_buffer() {
        let mut buffer = Vec::new();
        Message::GetPredecessor.write_bytes(&mut buffer).unwrap();
        buffer.truncate(buffer.len() - 1);
        assert!(Message::parse(&buffer).is_err());
    }

    #[test]
    fn rejects_unknown_message_type() {
        let mut buffer = Vec::new();
        buffer.write_u16::<NetworkEndian>(4).unwrap();
        buffer.write_u16::<NetworkEndian>(9999).unwrap();
        assert!(Message::parse(&buffer).is_err());
    }
}
