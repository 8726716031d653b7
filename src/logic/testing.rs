//! In-memory fakes for the OS seams (tests only)

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;

use crate::logic::error::{GuardianError, GuardianResult};
use crate::logic::process_intel::types::Connection;
use crate::logic::process_intel::{ConnectionTable, ProcessSnapshot, ProcessSource};
use crate::logic::response::{
    ActionError, AlertPolicy, ProcessControl, RetentionPolicy, TerminationPolicy, Terminator, ThreatLog,
};

// ============================================================================
// SOURCE
// ============================================================================

pub struct FakeSource {
    snapshots: Vec<ProcessSnapshot>,
    fail: bool,
    pub calls: usize,
}

impl FakeSource {
    pub fn new(snapshots: Vec<ProcessSnapshot>) -> Self {
        Self { snapshots, fail: false, calls: 0 }
    }

    pub fn failing() -> Self {
        Self { snapshots: Vec::new(), fail: true, calls: 0 }
    }
}

impl ProcessSource for FakeSource {
    fn snapshots(&mut self) -> GuardianResult<Vec<ProcessSnapshot>> {
        self.calls += 1;
        if self.fail {
            return Err(GuardianError::Enumeration("process table busy".into()));
        }
        Ok(self.snapshots.clone())
    }
}

// ============================================================================
// CONTROL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Terminate(u32),
    ForceKill(u32),
    RemoveChildren(u32),
    RemoveProcess(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Graceful,
    Forced,
    Nuclear,
}

/// Records calls; fails the configured tiers; kills on any success
#[derive(Clone, Default)]
pub struct FakeControl {
    failing: HashSet<Tier>,
    survives: bool,
    calls: Arc<Mutex<Vec<Call>>>,
    dead: Arc<Mutex<HashSet<u32>>>,
}

impl FakeControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, tier: Tier) -> Self {
        self.failing.insert(tier);
        self
    }

    /// Every call "succeeds" but the process never dies
    pub fn surviving(mut self) -> Self {
        self.survives = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn attempt(&self, call: Call, tier: Tier, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        self.calls.lock().push(call);
        if self.failing.contains(&tier) {
            return Err(ActionError::TimedOut { what: format!("{:?}", call), after: timeout });
        }
        if !self.survives {
            self.dead.lock().insert(pid);
        }
        Ok(())
    }
}

impl ProcessControl for FakeControl {
    fn request_terminate(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        self.attempt(Call::Terminate(pid), Tier::Graceful, pid, timeout)
    }

    fn force_kill_tree(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        self.attempt(Call::ForceKill(pid), Tier::Forced, pid, timeout)
    }

    fn remove_children(&self, pid: u32, _timeout: Duration) -> Result<(), ActionError> {
        self.calls.lock().push(Call::RemoveChildren(pid));
        if self.failing.contains(&Tier::Nuclear) {
            return Err(ActionError::Other { message: "no such parent".into() });
        }
        Ok(())
    }

    fn remove_process(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        self.attempt(Call::RemoveProcess(pid), Tier::Nuclear, pid, timeout)
    }

    fn is_alive(&self, pid: u32) -> bool {
        !self.dead.lock().contains(&pid)
    }
}

pub fn fake_terminator(control: &FakeControl) -> Terminator {
    Terminator::new(
        Box::new(control.clone()),
        TerminationPolicy::default(),
        AlertPolicy::default(),
        ThreatLog::new(RetentionPolicy::Unbounded),
    )
}

// ============================================================================
// CONNECTION TABLE
// ============================================================================

#[derive(Default)]
pub struct FakeTable {
    connections: HashMap<u32, Vec<Connection>>,
    owners: HashMap<SocketAddr, u32>,
}

impl FakeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connections(mut self, pid: u32, conns: Vec<Connection>) -> Self {
        self.connections.insert(pid, conns);
        self
    }

    pub fn with_owner(mut self, endpoint: &str, pid: u32) -> Self {
        if let Ok(addr) = endpoint.parse() {
            self.owners.insert(addr, pid);
        }
        self
    }
}

impl ConnectionTable for FakeTable {
    fn established(&self, pid: u32) -> GuardianResult<Vec<Connection>> {
        Ok(self.connections.get(&pid).cloned().unwrap_or_default())
    }

    fn owner_of(&self, endpoint: SocketAddr) -> GuardianResult<Option<u32>> {
        Ok(self.owners.get(&endpoint).copied())
    }
}
