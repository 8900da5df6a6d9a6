//! The three maintenance loops (§4.4): stabilize, fix-fingers and
//! check-predecessor. Each is exposed as a `*_once` method that performs a
//! single pass (what the tests drive directly) plus a `spawn_maintenance`
//! helper that runs all three as long-lived threads honouring `shutdown`.

use crate::config::Config;
use crate::identifier::{belongs_to, modulo};
use crate::node::Node;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

impl Node {
    /// Repairs successor/predecessor agreement. In a singleton ring,
    /// `successor == self`, so step 1 fetches this node's own predecessor
    /// and step 3 notifies itself — both well-defined (§4.4).
    pub fn stabilize_once(&self) {
        let successor = self.successor();

        let candidate = match self.client.get_predecessor(&successor.addr) {
            Ok(peer) => peer,
            Err(err) => {
                log::warn!("stabilize: get_predecessor({}) failed: {}", successor, err);
                return;
            }
        };

        if !candidate.is_empty() {
            let lower = modulo(self.id() + 1, self.m());
            let upper = modulo(successor.id - 1, self.m());

            if belongs_to(candidate.id, lower, upper) {
                log::info!("stabilize: adopting new successor {}", candidate);
                self.table.lock().unwrap().successor = candidate;
            }
        }

        // Notify the (possibly just-adopted) successor, per §9's note that
        // this is correct but subtle.
        let successor = self.successor();
        if let Err(err) = self.client.notify(&successor.addr, self.self_peer().clone()) {
            log::warn!("stabilize: notify({}) failed: {}", successor, err);
        }
    }

    /// Refreshes one finger table entry, round-robin. A lookup failure
    /// leaves that entry stale for this round but still advances the
    /// cursor, so one persistently bad finger cannot stall the others.
    pub fn fix_fingers_once(&self) {
        let index = {
            let mut table = self.table.lock().unwrap();
            if table.next_finger >= self.m() as usize {
                table.next_finger = 0;
            }
            let index = table.next_finger;
            table.next_finger += 1;
            index
        };

        let target = modulo(self.id() + (1i64 << index), self.m());

        match self.find_successor(target) {
            Ok(peer) => {
                self.table.lock().unwrap().fingers[index] = peer;
            }
            Err(err) => {
                log::warn!("fix_fingers: find_successor({}) failed: {}", target, err);
            }
        }
    }

    /// Probes the predecessor's liveness. Only a hard refusal clears it;
    /// transient failures are left for the next pass (§4.4 step 3, §7).
    pub fn check_predecessor_once(&self) {
        let predecessor = self.predecessor();
        if predecessor.is_empty() {
            return;
        }

        if let Err(err) = self.client.get_predecessor(&predecessor.addr) {
            if err.is_hard_refusal() {
                log::info!("check_predecessor: {} is gone, clearing", predecessor);
                self.table.lock().unwrap().predecessor = crate::peer::PeerHandle::empty();
            } else {
                log::warn!("check_predecessor: transient failure probing {}: {}", predecessor, err);
            }
        }
    }
}

/// Spawns the three maintenance loops as long-lived threads, each on the
/// interval configured in `config`. Every loop checks `shutdown` before each
/// pass, so clean shutdown causes it to exit within one period (§5).
pub fn spawn_maintenance(node: Arc<Node>, config: &Config) -> Vec<JoinHandle<()>> {
    let stabilize_interval = Duration::from_millis(config.stabilize_interval_ms);
    let fix_fingers_interval = Duration::from_millis(config.fix_fingers_interval_ms);
    let check_predecessor_interval = Duration::from_millis(config.check_predecessor_interval_ms);

    vec![
        spawn_loop(node.clone(), stabilize_interval, Node::stabilize_once),
        spawn_loop(node.clone(), fix_fingers_interval, Node::fix_fingers_once),
        spawn_loop(node, check_predecessor_interval, Node::check_predecessor_once),
    ]
}

fn spawn_loop(node: Arc<Node>, interval: Duration, pass: fn(&Node)) -> JoinHandle<()> {
    thread::spawn(move || loop {
        if node.is_shutdown() {
            break;
        }
        pass(&node);
        thread::sleep(interval);
    })
}
