//! The membership protocol (§4.3): `create_ring`, `join_ring`, and the
//! `notify`/`get_predecessor` remote handlers.

use crate::error::Error;
use crate::identifier::{belongs_to, modulo};
use crate::node::Node;
use crate::peer::PeerHandle;

impl Node {
    /// Forms a brand new, singleton ring: no predecessor, successor is
    /// `self`.
    pub fn create_ring(&self) {
        let mut table = self.table.lock().unwrap();
        table.predecessor = PeerHandle::empty();
        table.successor = self.self_peer().clone();
    }

    /// Joins an existing ring through `bootstrap_addr`. The bootstrap peer
    /// need not become this node's eventual successor; stabilize converges
    /// it. A failure here (bootstrap unreachable, malformed reply) is fatal
    /// and propagates to the caller, per §4.3/§7.
    pub fn join_ring(&self, bootstrap_addr: &str) -> Result<(), Error> {
        let successor = self.client.find_successor(bootstrap_addr, self.id())?;

        let mut table = self.table.lock().unwrap();
        table.predecessor = PeerHandle::empty();
        table.successor = successor;

        Ok(())
    }

    /// Remote handler: `peer` believes it might be this node's predecessor.
    /// Accepted only if there is no current predecessor, or `peer` is
    /// strictly closer than it — which makes concurrent calls from several
    /// claimants monotone and therefore safe without additional locking
    /// beyond the table mutex (§5).
    pub fn notify(&self, peer: PeerHandle) {
        let mut table = self.table.lock().unwrap();

        let accept = table.predecessor.is_empty() || {
            let lower = modulo(table.predecessor.id + 1, self.m());
            let upper = modulo(self.id() - 1, self.m());
            belongs_to(peer.id, lower, upper)
        };

        if accept {
            log::info!("accepting new predecessor {}", peer);
            table.predecessor = peer;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peer_client::InMemoryPeerClient;

    fn peer_at(id: i64, name: &str) -> PeerHandle {
        PeerHandle {
            id,
            addr: name.to_string(),
        }
    }

    #[test]
    fn create_ring_is_a_singleton() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(7, "n7"), 6, 1, client);

        node.create_ring();

        assert_eq!(node.successor(), *node.self_peer());
        assert!(node.predecessor().is_empty());
    }

    #[test]
    fn join_ring_adopts_bootstraps_find_successor_reply() {
        let client = InMemoryPeerClient::new();

        let bootstrap = Node::new(peer_at(10, "boot"), 6, 1, client.clone());
        client.register(bootstrap.clone());
        bootstrap.create_ring();

        let joining = Node::new(peer_at(20, "joiner"), 6, 1, client.clone());
        client.register(joining.clone());

        joining.join_ring("boot").unwrap();

        assert_eq!(joining.successor().id, 10);
        assert!(joining.predecessor().is_empty());
    }

    #[test]
    fn join_ring_fails_when_bootstrap_is_unreachable() {
        let client = InMemoryPeerClient::new();
        let joining = Node::new(peer_at(20, "joiner"), 6, 1, client);

        assert!(joining.join_ring("nobody-home").is_err());
    }

    // S5: notify on node 30 with peer {id: 20}. Empty or farther predecessor
    // (10) is replaced; a closer existing predecessor (25) is kept.
    #[test]
    fn scenario_s5_notify_accepts_only_a_strictly_closer_predecessor() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(30, "n30"), 6, 1, client);

        node.notify(peer_at(20, "n20"));
        assert_eq!(node.predecessor().id, 20);

        node.notify(peer_at(10, "n10"));
        assert_eq!(
            node.predecessor().id,
            20,
            "10 is farther from 30 than the current predecessor 20"
        );

        {
            let mut table = node.table.lock().unwrap();
            table.predecessor = peer_at(25, "n25");
        }

        node.notify(peer_at(20, "n20"));
        assert_eq!(node.predecessor().id, 25, "25 stays; 20 is farther than 25");
    }

    #[test]
    fn notify_is_idempotent() {
        let client = InMemoryPeerClient::new();
        let node = Node::new(peer_at(30, "n30"), 6, 1, client);

        node.notify(peer_at(20, "n20"));
        node.notify(peer_at(20, "n20"));

        assert_eq!(node.predecessor().id, 20);
    }
}
