//! An implementation of the [Chord protocol][w:chord]: a peer-to-peer
//! overlay that maps identifiers to the ring node responsible for them.
//!
//! # Introduction
//!
//! Every node owns an identifier derived from its socket address and keeps
//! two pointers into the ring — a successor and a predecessor — plus a
//! finger table of shortcut pointers that turns lookups from a linear walk
//! into an O(log n) hop count. Three background loops keep those pointers
//! correct as nodes join, leave or fail: stabilize, fix-fingers and
//! check-predecessor.
//!
//! This crate implements the ring overlay only. It deliberately stops short
//! of a key-value storage layer, a client-facing API, and any bootstrap
//! discovery mechanism beyond "the operator supplies an address" — see
//! `DESIGN.md` for the full list of non-goals.
//!
//! # Architecture
//!
//! [`node::Node`] is the aggregate every other module operates on:
//! [`routing`] implements `find_successor`, [`membership`] implements
//! `create_ring`/`join_ring`/`notify`, and [`maintenance`] implements the
//! three background loops. All four talk to remote peers only through the
//! [`peer_client::PeerClient`] trait, never through a raw socket, which is
//! what lets this crate's test suite substitute an in-memory client and run
//! many nodes deterministically in one process.
//!
//! Inbound peer requests are served by [`network::Server`], a thread-pooled
//! TCP acceptor, dispatching each connection to [`dispatch::Dispatcher`].
//!
//! [w:chord]: https://en.wikipedia.org/wiki/Chord_(peer-to-peer)

pub mod config;
pub mod dispatch;
pub mod error;
pub mod identifier;
pub mod maintenance;
pub mod membership;
pub mod message;
pub mod network;
pub mod node;
pub mod peer;
pub mod peer_client;
pub mod routing;

pub use error::Error;

use config::Config;
use dispatch::Dispatcher;
use network::Server;
use node::Node;
use peer::PeerHandle;
use peer_client::{PeerClient, TcpPeerClient};
use std::sync::Arc;

/// Builds a node from `config`, joins or creates its ring, starts serving
/// peer requests, and runs the three maintenance loops. Blocks until the
/// listener thread exits, which under normal operation is "never" — this is
/// the body of the long-running daemon.
pub fn run(config: Config) -> Result<(), Error> {
    let self_peer = PeerHandle::from_socket_addr(config.listen_address, config.m);
    log::info!("starting node {} (m={}, r={})", self_peer, config.m, config.r);

    let client: Arc<dyn PeerClient> = Arc::new(TcpPeerClient::new(config.rpc_timeout_ms));
    let node = Node::new(self_peer, config.m, config.r, client);

    match config.bootstrap {
        Some(bootstrap) => {
            log::info!("joining ring through {}", bootstrap);
            node.join_ring(&bootstrap.to_string())?;
        }
        None => {
            log::info!("no bootstrap configured, starting a new ring");
            node.create_ring();
        }
    }

    let dispatcher = Arc::new(Dispatcher::new(node.clone()));
    let server = Server::new(dispatcher);
    let listener = server
        .listen(config.listen_address, config.worker_threads)
        .map_err(|cause| Error::PeerUnreachable(config.listen_address.to_string(), cause))?;

    // The three loops run for the lifetime of the process; this binary never
    // calls `Node::shutdown`, so their handles are left detached rather than
    // joined, which would block forever.
    for handle in maintenance::spawn_maintenance(node, &config) {
        drop(handle);
    }

    listener.join().expect("listener thread panicked");

    Ok(())
}
