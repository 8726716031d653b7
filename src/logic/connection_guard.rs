//! Connection Guard
//!
//! Lower-frequency side scan: for every process whose name carries the
//! protected marker, walk its ESTABLISHED TCP connections, resolve the local
//! process on the other end of each, and terminate it if it is an
//! interpreter. Fires on the interpreter name alone, no keyword check.
//!
//! Only loopback peers can resolve; off-host endpoints have no local owner.
//! Best-effort: every failure is absorbed here.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::logic::error::GuardianError;
use crate::logic::process_intel::{ConnectionTable, ProcessSnapshot, ProcessSource};
use crate::logic::response::Terminator;
use crate::logic::threat::{Matcher, ProtectedProcessEntry, ThreatVerdict};

pub struct ConnectionGuard {
    marker: Matcher,
    interpreter: Matcher,
    protected: Vec<ProtectedProcessEntry>,
    table: Box<dyn ConnectionTable>,
    unsupported_logged: AtomicBool,
    self_pid: u32,
}

impl ConnectionGuard {
    pub fn new(
        marker: Matcher,
        interpreter: Matcher,
        protected: Vec<ProtectedProcessEntry>,
        table: Box<dyn ConnectionTable>,
    ) -> Self {
        Self {
            marker,
            interpreter,
            protected,
            table,
            unsupported_logged: AtomicBool::new(false),
            self_pid: std::process::id(),
        }
    }

    /// One guard pass. Returns the number of interpreters terminated.
    pub fn guard(&self, source: &mut dyn ProcessSource, terminator: &Terminator) -> usize {
        let snapshots = match source.snapshots() {
            Ok(s) => s,
            Err(e) => {
                log::debug!("Connection guard skipped, enumeration failed: {}", e);
                return 0;
            }
        };

        let by_pid: HashMap<u32, &ProcessSnapshot> = snapshots.iter().map(|s| (s.pid, s)).collect();
        let mut terminated: HashSet<u32> = HashSet::new();

        for guarded in snapshots.iter().filter(|s| self.marker.matches(&s.name)) {
            let connections = match self.table.established(guarded.pid) {
                Ok(c) => c,
                Err(GuardianError::Unsupported(what)) => {
                    if !self.unsupported_logged.swap(true, Ordering::Relaxed) {
                        log::debug!("Connection guard disabled: {} unavailable", what);
                    }
                    return terminated.len();
                }
                Err(e) => {
                    log::debug!("Connections of {} unreadable: {}", guarded.pid, e);
                    continue;
                }
            };

            for conn in connections.iter().filter(|c| c.is_established()) {
                let owner = match self.table.owner_of(conn.remote) {
                    Ok(Some(pid)) if pid != guarded.pid && pid != self.self_pid => pid,
                    Ok(_) => continue,
                    Err(e) => {
                        log::debug!("Peer of {} unresolved: {}", conn.remote, e);
                        continue;
                    }
                };

                let Some(peer) = by_pid.get(&owner) else { continue };
                if !self.interpreter.matches(&peer.name) || !terminated.insert(owner) {
                    continue;
                }

                let verdict = ThreatVerdict::ConnectedInterpreter {
                    protected: self.label_for(guarded),
                };
                terminator.terminate(owner, &peer.name, &verdict);
            }
        }

        terminated.len()
    }

    fn label_for(&self, snapshot: &ProcessSnapshot) -> String {
        let name = snapshot.name.to_lowercase();
        self.protected
            .iter()
            .find(|p| name.contains(&p.name.to_lowercase()))
            .map(|p| p.label.clone())
            .unwrap_or_else(|| snapshot.name.clone())
    }
}

// ============================================================================
// TESTS
// ============================================================================
