//! Node state (§3) and the inspection surface (§6).
//!
//! [`Node`] is the aggregate every other module operates on: the routing
//! engine ([`crate::routing`]), the membership protocol
//! ([`crate::membership`]) and the maintenance loops
//! ([`crate::maintenance`]) are all written as inherent methods on `Node`,
//! kept in separate files by concern the way the teacher splits routing,
//! stabilization and procedures into their own modules.
//!
//! Per §9's design notes, `Node` is modelled as an owned aggregate behind a
//! shared handle (`Arc<Node>`), not as ambient process state, so a single
//! test process can instantiate as many as it likes.

use crate::identifier::Id;
use crate::peer::PeerHandle;
use crate::peer_client::PeerClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The mutable fields of §3's node state, guarded by a single mutex. The
/// whole-handle-at-once granularity required by §5 falls out naturally from
/// guarding all of them together: a reader can never observe half of a
/// predecessor swap.
pub(crate) struct NodeTable {
    pub predecessor: PeerHandle,
    pub successor: PeerHandle,
    pub fingers: Vec<PeerHandle>,
    pub next_finger: usize,
}

/// A single Chord node: its identity, its view of the ring, and the
/// machinery needed to keep that view correct.
pub struct Node {
    self_peer: PeerHandle,
    m: u32,
    /// Replication parameter. Accepted per the wire/config contract in §6
    /// but never read by the core — inventing replication semantics here
    /// would be scope creep this crate deliberately avoids (§9).
    #[allow(dead_code)]
    r: u32,
    pub(crate) table: Mutex<NodeTable>,
    shutdown: AtomicBool,
    pub(crate) client: Arc<dyn PeerClient>,
}

impl Node {
    pub fn new(self_peer: PeerHandle, m: u32, r: u32, client: Arc<dyn PeerClient>) -> Arc<Self> {
        let table = NodeTable {
            predecessor: PeerHandle::empty(),
            successor: PeerHandle::empty(),
            fingers: vec![PeerHandle::empty(); m as usize],
            next_finger: 0,
        };

        Arc::new(Node {
            self_peer,
            m,
            r,
            table: Mutex::new(table),
            shutdown: AtomicBool::new(false),
            client,
        })
    }

    pub fn m(&self) -> u32 {
        self.m
    }

    pub fn id(&self) -> Id {
        self.self_peer.id
    }

    // --- Inspection surface (§6): non-blocking snapshot reads. ---

    pub fn self_peer(&self) -> &PeerHandle {
        &self.self_peer
    }

    pub fn successor(&self) -> PeerHandle {
        self.table.lock().unwrap().successor.clone()
    }

    pub fn predecessor(&self) -> PeerHandle {
        self.table.lock().unwrap().predecessor.clone()
    }

    pub fn fingers(&self) -> Vec<PeerHandle> {
        self.table.lock().unwrap().fingers.clone()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Transitions the node to its terminal state. Maintenance loops observe
    /// this at least once per period and exit within one period (§5).
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}
