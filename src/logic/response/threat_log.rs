//! Threat Log
//!
//! Append-only record of every Terminator invocation, shared behind a
//! mutex so one writer appends and any holder of a handle can read.
//!
//! Retention is bounded by `RetentionPolicy`; `total_recorded()` counts
//! every append regardless of what was evicted or archived.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::Mutex;

use crate::constants::get_data_dir;
use super::types::{RetentionPolicy, ThreatRecord};

struct LogState {
    records: VecDeque<ThreatRecord>,
    total: u64,
    archived: u64,
}

/// Cloneable handle to the threat history
#[derive(Clone)]
pub struct ThreatLog {
    state: Arc<Mutex<LogState>>,
    policy: RetentionPolicy,
}

impl ThreatLog {
    pub fn new(policy: RetentionPolicy) -> Self {
        let policy = match policy {
            RetentionPolicy::Archive { path, threshold } => RetentionPolicy::Archive {
                path: resolve_archive_path(path),
                threshold: threshold.max(1),
            },
            RetentionPolicy::Ring { capacity } => RetentionPolicy::Ring { capacity: capacity.max(1) },
            other => other,
        };

        Self {
            state: Arc::new(Mutex::new(LogState {
                records: VecDeque::new(),
                total: 0,
                archived: 0,
            })),
            policy,
        }
    }

    /// Append one record, then apply the retention policy
    pub fn append(&self, record: ThreatRecord) {
        let mut state = self.state.lock();
        state.records.push_back(record);
        state.total += 1;

        match &self.policy {
            RetentionPolicy::Unbounded => {}
            RetentionPolicy::Ring { capacity } => {
                while state.records.len() > *capacity {
                    state.records.pop_front();
                }
            }
            RetentionPolicy::Archive { path, threshold } => {
                if state.records.len() >= *threshold {
                    match archive(path, &state.records) {
                        Ok(()) => {
                            state.archived += state.records.len() as u64;
                            state.records.clear();
                        }
                        Err(e) => {
                            // keep memory bounded even when the disk is not writable
                            log::error!("Threat archive {:?} failed: {}", path, e);
                            while state.records.len() > *threshold {
                                state.records.pop_front();
                            }
                        }
                    }
                }
            }
        }
    }

    /// Records still held in memory, oldest first
    #[cfg(test)]
    pub fn records(&self) -> Vec<ThreatRecord> {
        self.state.lock().records.iter().cloned().collect()
    }

    /// Newest `limit` records
    pub fn recent(&self, limit: usize) -> Vec<ThreatRecord> {
        let state = self.state.lock();
        let start = state.records.len().saturating_sub(limit);
        state.records.iter().skip(start).cloned().collect()
    }

    /// Every record ever appended
    pub fn total_recorded(&self) -> u64 {
        self.state.lock().total
    }

    /// Records flushed to the archive file
    pub fn archived(&self) -> u64 {
        self.state.lock().archived
    }
}

impl Default for ThreatLog {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}

fn resolve_archive_path(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        get_data_dir().join(path)
    }
}

fn archive(path: &Path, records: &VecDeque<ThreatRecord>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writer.write_all(record.to_jsonl().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    log::info!("Archived {} threat records to {:?}", records.len(), path);
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
