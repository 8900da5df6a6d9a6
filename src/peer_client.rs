//! The outbound peer-call abstraction (§4.5).
//!
//! The routing engine and maintenance loops only ever see this trait; they
//! never construct a [`crate::network::Connection`] directly. That keeps
//! transport specifics (framing, sockets, timeouts) out of the protocol
//! logic, and is what lets tests substitute [`InMemoryPeerClient`] and run
//! several [`crate::node::Node`]s in one process (§9 design notes).
//!
//! [`crate::network::Connection`]: ../network/struct.Connection.html
//! [`crate::node::Node`]: ../node/struct.Node.html

use crate::error::Error;
use crate::identifier::Id;
use crate::message::Message;
use crate::network::Connection;
use crate::peer::PeerHandle;

/// The three remote operations a node can invoke on a peer identified by
/// its socket address.
pub trait PeerClient: Send + Sync {
    fn find_successor(&self, addr: &str, id: Id) -> Result<PeerHandle, Error>;
    fn get_predecessor(&self, addr: &str) -> Result<PeerHandle, Error>;
    fn notify(&self, addr: &str, peer: PeerHandle) -> Result<(), Error>;
}

/// A [`PeerClient`] that talks to peers over TCP using the wire format in
/// [`crate::message`].
pub struct TcpPeerClient {
    timeout_ms: u64,
}

impl TcpPeerClient {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    fn open(&self, addr: &str) -> Result<Connection, Error> {
        Connection::open(addr, self.timeout_ms)
            .map_err(|cause| Error::PeerUnreachable(addr.to_string(), cause))
    }

    fn roundtrip(&self, addr: &str, request: Message) -> Result<Message, Error> {
        let mut con = self.open(addr)?;

        con.send(&request)
            .map_err(|cause| Error::PeerUnreachable(addr.to_string(), cause))?;

        con.receive()
            .map_err(|cause| Error::PeerUnreachable(addr.to_string(), cause))
    }
}

impl PeerClient for TcpPeerClient {
    fn find_successor(&self, addr: &str, id: Id) -> Result<PeerHandle, Error> {
        match self.roundtrip(addr, Message::FindSuccessor(id))? {
            Message::FindSuccessorReply(peer) => Ok(peer),
            _ => Err(Error::Malformed("expected FindSuccessorReply")),
        }
    }

    fn get_predecessor(&self, addr: &str) -> Result<PeerHandle, Error> {
        match self.roundtrip(addr, Message::GetPredecessor)? {
            Message::PredecessorReply(peer) => Ok(peer),
            _ => Err(Error::Malformed("expected PredecessorReply")),
        }
    }

    fn notify(&self, addr: &str, peer: PeerHandle) -> Result<(), Error> {
        match self.roundtrip(addr, Message::Notify(peer))? {
            Message::NotifyAck => Ok(()),
            _ => Err(Error::Malformed("expected NotifyAck")),
        }
    }
}

#[cfg(test)]
pub use in_memory::InMemoryPeerClient;

#[cfg(test)]
mod in_memory {
    use super::*;
    use crate::node::Node;
    use std::collections::HashMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// A [`PeerClient`] that dispatches directly to in-process [`Node`]s
    /// registered under their advertised address, skipping sockets
    /// entirely. This is what lets the multi-node scenarios in this crate's
    /// test suite exercise ring convergence deterministically.
    #[derive(Default)]
    pub struct InMemoryPeerClient {
        registry: Mutex<HashMap<String, Arc<Node>>>,
    }

    impl InMemoryPeerClient {
        pub fn new() -> Arc<Self> {
            Arc::new(Self {
                registry: Mutex::new(HashMap::new()),
            })
        }

        pub fn register(&self, node: Arc<Node>) {
            self.registry
                .lock()
                .unwrap()
                .insert(node.self_peer().addr.clone(), node);
        }

        /// Simulates a peer going permanently offline: subsequent calls to
        /// `addr` fail as `ConnectionRefused`, the same as a real dead peer.
        pub fn deregister(&self, addr: &str) {
            self.registry.lock().unwrap().remove(addr);
        }

        fn lookup(&self, addr: &str) -> Result<Arc<Node>, Error> {
            self.registry.lock().unwrap().get(addr).cloned().ok_or_else(|| {
                Error::PeerUnreachable(
                    addr.to_string(),
                    io::Error::new(io::ErrorKind::ConnectionRefused, "no such peer registered"),
                )
            })
        }
    }

    impl PeerClient for InMemoryPeerClient {
        fn find_successor(&self, addr: &str, id: Id) -> Result<PeerHandle, Error> {
            self.lookup(addr)?.find_successor(id)
        }

        fn get_predecessor(&self, addr: &str) -> Result<PeerHandle, Error> {
            Ok(self.lookup(addr)?.predecessor())
        }

        fn notify(&self, addr: &str, peer: PeerHandle) -> Result<(), Error> {
            self.lookup(addr)?.notify(peer);
            Ok(())
        }
    }
}
