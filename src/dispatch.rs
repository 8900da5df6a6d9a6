//! The inbound dispatcher (§4.6): a [`ServerHandler`] that decodes a
//! [`Message`] off an accepted [`Connection`], routes it to the matching
//! [`Node`] method, and writes back the reply.
//!
//! Mirrors the shape of the teacher's `P2PHandler`: one struct holding the
//! shared node handle, one method per inbound request type, logging instead
//! of propagating protocol-level failures back up — a peer that sends
//! garbage gets its connection dropped, never a panic.

use crate::identifier::Id;
use crate::message::Message;
use crate::network::{Connection, ServerHandler};
use crate::node::Node;
use crate::peer::PeerHandle;
use std::io;
use std::sync::Arc;

/// Dispatches inbound peer requests to a single [`Node`].
pub struct Dispatcher {
    node: Arc<Node>,
}

impl Dispatcher {
    pub fn new(node: Arc<Node>) -> Self {
        Self { node }
    }

    fn dispatch(&self, request: Message) -> Option<Message> {
        match request {
            Message::FindSuccessor(id) => self.handle_find_successor(id),
            Message::GetPredecessor => Some(Message::PredecessorReply(self.node.predecessor())),
            Message::Notify(peer) => Some(self.handle_notify(peer)),
            other => {
                log::warn!("dispatch: unexpected request {}", other);
                None
            }
        }
    }

    /// `None` drops the connection rather than answering, so a failed hop is
    /// observed by the caller as EOF → `PeerUnreachable`, not a fabricated
    /// successor (§4.2: every hop either answers or fails, never invents).
    fn handle_find_successor(&self, id: Id) -> Option<Message> {
        match self.node.find_successor(id) {
            Ok(peer) => Some(Message::FindSuccessorReply(peer)),
            Err(err) => {
                log::warn!("dispatch: find_successor({}) failed: {}", id, err);
                None
            }
        }
    }

    fn handle_notify(&self, peer: PeerHandle) -> Message {
        self.node.notify(peer);
        Message::NotifyAck
    }
}

impl ServerHandler for Dispatcher {
    fn handle_connection(&self, mut connection: Connection) {
        let request = match connection.receive() {
            Ok(msg) => msg,
            Err(err) => {
                log::warn!("dispatch: failed to read request: {}", err);
                return;
            }
        };

        log::debug!("dispatch: received {}", request);

        let reply = match self.dispatch(request) {
            Some(reply) => reply,
            None => return,
        };

        if let Err(err) = connection.send(&reply) {
            log::warn!("dispatch: failed to send reply: {}", err);
        }
    }

    fn handle_error(&self, error: io::Error) {
        log::warn!("dispatch: failed to accept connection: {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer_client::InMemoryPeerClient;

    fn peer_at(id: Id, name: &str) -> PeerHandle {
        PeerHandle {
            id,
            addr: name.to_string(),
        }
    }

    #[test]
    fn dispatch_find_successor_answers_from_the_node() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(7, "n7"), 6, 1, client.clone());
        client.register(node.clone());
        node.create_ring();

        let dispatcher = Dispatcher::new(node);

        match dispatcher.dispatch(Message::FindSuccessor(40)) {
            Some(Message::FindSuccessorReply(peer)) => assert_eq!(peer.id, 7),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dispatch_get_predecessor_reports_empty_sentinel() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(7, "n7"), 6, 1, client.clone());
        client.register(node.clone());
        node.create_ring();

        let dispatcher = Dispatcher::new(node);

        match dispatcher.dispatch(Message::GetPredecessor) {
            Some(Message::PredecessorReply(peer)) => assert!(peer.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn dispatch_notify_updates_predecessor_and_acks() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(30, "n30"), 6, 1, client.clone());
        client.register(node.clone());

        let dispatcher = Dispatcher::new(node.clone());

        match dispatcher.dispatch(Message::Notify(peer_at(20, "n20"))) {
            Some(Message::NotifyAck) => {}
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(node.predecessor().id, 20);
    }

    #[test]
    fn dispatch_drops_unexpected_reply_messages() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(7, "n7"), 6, 1, client);

        let dispatcher = Dispatcher::new(node);

        assert!(dispatcher
            .dispatch(Message::FindSuccessorReply(PeerHandle::empty()))
            .is_none());
    }

    // A forwarded find_successor that fails (e.g. the next hop is down)
    // must drop the connection, not answer with a fabricated peer — the
    // caller is meant to observe this as a failed call, not a fake success.
    #[test]
    fn dispatch_drops_the_connection_when_find_successor_fails() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(7, "n7"), 6, 1, client);

        // id 5 falls outside (7+1, 60], so find_successor consults the
        // finger table and forwards to "unreachable" — a peer that was
        // never registered with the client, so the hop fails.
        {
            let mut table = node.table.lock().unwrap();
            table.successor = peer_at(60, "succ");
            table.fingers[0] = peer_at(3, "unreachable");
        }

        let dispatcher = Dispatcher::new(node);

        assert!(dispatcher.dispatch(Message::FindSuccessor(5)).is_none());
    }
}
