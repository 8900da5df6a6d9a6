//! The peer handle: the only way nodes refer to one another.
//!
//! A handle is a value, not a connection; caching one costs nothing and
//! copying one is cheap enough to do across a mutex boundary instead of
//! holding the lock for the duration of a remote call (§5).

use crate::identifier::{hash_id, Id};
use std::fmt;
use std::net::SocketAddr;

/// The identifier used by the sentinel "no peer" handle. Never a valid
/// member of any arc (see [`crate::identifier::belongs_to`]).
///
/// [`crate::identifier::belongs_to`]: ../identifier/fn.belongs_to.html
pub const EMPTY_ID: Id = -1;

/// A `(id, socket_address)` pair identifying a peer on the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerHandle {
    pub id: Id,
    pub addr: String,
}

impl PeerHandle {
    /// Builds a handle from an address string, deriving its identifier.
    pub fn new(addr: String, m: u32) -> Self {
        let id = hash_id(&addr, m);
        PeerHandle { id, addr }
    }

    /// Builds a handle from a socket address, deriving its identifier from
    /// its `"<ip>:<port>"` string form.
    pub fn from_socket_addr(addr: SocketAddr, m: u32) -> Self {
        Self::new(addr.to_string(), m)
    }

    /// The sentinel "unknown peer" handle: `id = -1`, empty address. Never
    /// satisfies a membership predicate.
    pub fn empty() -> Self {
        PeerHandle {
            id: EMPTY_ID,
            addr: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id < 0
    }
}

impl fmt::Display for PeerHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            write!(f, "<empty>")
        } else {
            write!(f, "{}@{}", self.id, self.addr)
        }
    }
}
