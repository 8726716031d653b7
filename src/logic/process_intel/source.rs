//! Process Source
//!
//! Enumerates live processes as immutable snapshots, once per call.
//! `SysinfoSource` is the production implementation.

use sysinfo::{ProcessRefreshKind, ProcessStatus, System, UpdateKind};

use crate::logic::error::GuardianResult;
use super::types::ProcessSnapshot;

/// Read-only view of the process table
pub trait ProcessSource {
    /// Fresh snapshot of every running process. Processes that vanish or
    /// cannot be read are simply absent from the result.
    fn snapshots(&mut self) -> GuardianResult<Vec<ProcessSnapshot>>;
}

/// sysinfo-backed process table
pub struct SysinfoSource {
    system: System,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self { system: System::new() }
    }

    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::new()
            .with_cmd(UpdateKind::OnlyIfNotSet)
            .with_exe(UpdateKind::OnlyIfNotSet)
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSource for SysinfoSource {
    fn snapshots(&mut self) -> GuardianResult<Vec<ProcessSnapshot>> {
        self.system.refresh_processes_specifics(Self::refresh_kind());

        let snapshots = self
            .system
            .processes()
            .iter()
            .filter(|(_, proc)| proc.status() != ProcessStatus::Zombie)
            .map(|(pid, proc)| ProcessSnapshot {
                pid: pid.as_u32(),
                name: proc.name().to_string(),
                cmdline: proc.cmd().to_vec(),
                exe: proc.exe().map(|p| p.to_path_buf()),
            })
            .collect();

        Ok(snapshots)
    }
}
