//! The routing engine (§4.2): `find_successor` and its helper
//! `closest_preceding_node`.
//!
//! Both are plain inherent methods on [`Node`] rather than their own struct,
//! since unlike the teacher's `Routing<T>` this crate keeps the finger table
//! on `Node` itself — there is no separate storage layer pulling `Node`
//! apart into smaller pieces here.

use crate::error::Error;
use crate::identifier::{belongs_to, modulo, Id};
use crate::node::Node;
use crate::peer::PeerHandle;

impl Node {
    /// Resolves the peer responsible for `id`.
    ///
    /// Delegates to the finger table's best guess and returns whatever that
    /// peer reports, recursing across the network rather than in-process —
    /// each hop makes exactly one outbound call. A failed outbound call
    /// propagates to the caller (§4.2's policy (b)); it does not retry a
    /// lower finger.
    pub fn find_successor(&self, id: Id) -> Result<PeerHandle, Error> {
        let (self_id, successor) = {
            let table = self.table.lock().unwrap();
            (self.id(), table.successor.clone())
        };

        let lower = modulo(self_id + 1, self.m());

        if belongs_to(id, lower, successor.id) {
            return Ok(successor);
        }

        let next = self.closest_preceding_node(id);

        if next == *self.self_peer() {
            // Degenerate/bootstrap case: nothing closer is known, so this
            // node is the best available answer. Prevents infinite
            // recursion when the finger table is still empty.
            return Ok(self.self_peer().clone());
        }

        log::debug!("forwarding find_successor({}) to {}", id, next);

        self.client.find_successor(&next.addr, id).map_err(|err| {
            log::warn!("find_successor({}) via {} failed: {}", id, next, err);
            err
        })
    }

    /// Scans the finger table from the largest jump down to the smallest,
    /// returning the first entry strictly between `self` and `id`. Falls
    /// back to `self` if none qualifies (including when every finger is
    /// still the empty sentinel).
    pub(crate) fn closest_preceding_node(&self, id: Id) -> PeerHandle {
        let table = self.table.lock().unwrap();
        let self_id = self.id();
        let lower = modulo(self_id + 1, self.m());
        let upper = modulo(id - 1, self.m());

        for finger in table.fingers.iter().rev() {
            if belongs_to(finger.id, lower, upper) {
                return finger.clone();
            }
        }

        self.self_peer().clone()
    }
}
