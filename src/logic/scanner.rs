//! Scanner - one full pass over the process table
//!
//! Enumerate → classify → terminate matches. Returns how many threats the
//! cycle found. Kill counters and the threat log belong to the Terminator.

use std::collections::HashSet;

use crate::logic::error::GuardianResult;
use crate::logic::process_intel::ProcessSource;
use crate::logic::response::Terminator;
use crate::logic::threat::Classifier;

pub struct Scanner {
    classifier: Classifier,
    self_pid: u32,
}

impl Scanner {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            self_pid: std::process::id(),
        }
    }

    /// Run one cycle. Fails only if the process table cannot be enumerated.
    pub fn scan(&self, source: &mut dyn ProcessSource, terminator: &Terminator) -> GuardianResult<usize> {
        let snapshots = source.snapshots()?;
        let mut handled: HashSet<u32> = HashSet::with_capacity(snapshots.len());
        let mut threats = 0;

        for snapshot in &snapshots {
            // never ourselves, at most once per pid per cycle
            if snapshot.pid == self.self_pid || !handled.insert(snapshot.pid) {
                continue;
            }

            if let Some(verdict) = self.classifier.classify(snapshot) {
                terminator.terminate(snapshot.pid, &snapshot.name, &verdict);
                threats += 1;
            }
        }

        log::debug!("Scanned {} processes, {} threats", snapshots.len(), threats);
        Ok(threats)
    }
}

// ============================================================================
// TESTS
// ============================================================================
