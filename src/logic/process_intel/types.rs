//! Process Intel Types
//!
//! Snapshots of running processes and the TCP connections they hold.

use std::net::SocketAddr;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

// ============================================================================
// PROCESS SNAPSHOT
// ============================================================================

/// Immutable view of one process at scan time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    pub cmdline: Vec<String>,
    pub exe: Option<PathBuf>,
}

impl ProcessSnapshot {
    #[cfg(test)]
    pub fn new(pid: u32, name: &str, cmdline: &[&str]) -> Self {
        Self {
            pid,
            name: name.to_string(),
            cmdline: cmdline.iter().map(|s| s.to_string()).collect(),
            exe: None,
        }
    }

    /// Arguments joined by single spaces
    pub fn joined_cmdline(&self) -> String {
        self.cmdline.join(" ")
    }
}

// ============================================================================
// CONNECTIONS
// ============================================================================

/// TCP states as numbered in the kernel socket tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TcpState {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    Unknown,
}

impl TcpState {
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => TcpState::Established,
            0x02 => TcpState::SynSent,
            0x03 => TcpState::SynRecv,
            0x04 => TcpState::FinWait1,
            0x05 => TcpState::FinWait2,
            0x06 => TcpState::TimeWait,
            0x07 => TcpState::Close,
            0x08 => TcpState::CloseWait,
            0x09 => TcpState::LastAck,
            0x0A => TcpState::Listen,
            0x0B => TcpState::Closing,
            _ => TcpState::Unknown,
        }
    }
}

/// One socket of one process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub state: TcpState,
}

impl Connection {
    pub fn is_established(&self) -> bool {
        self.state == TcpState::Established
    }
}
