//! Response Types
//!
//! Termination ladder, alerting and retention policies, and the threat
//! records the Terminator leaves behind.

use std::path::PathBuf;
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ALERT_EVERY, DEFAULT_FORCED_TIMEOUT_MS, DEFAULT_GRACEFUL_TIMEOUT_MS,
    DEFAULT_NUCLEAR_TIMEOUT_MS, DEFAULT_RING_CAPACITY,
};

// ============================================================================
// ESCALATION LADDER
// ============================================================================

/// Escalation tier that ended the termination ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationTier {
    /// Cooperative termination request
    Graceful,
    /// Forced kill of the process and its child tree
    Forced,
    /// Direct removal of children, then the target
    Nuclear,
}

impl TerminationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationTier::Graceful => "graceful",
            TerminationTier::Forced => "forced",
            TerminationTier::Nuclear => "nuclear",
        }
    }
}

impl std::fmt::Display for TerminationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-tier time bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationPolicy {
    pub graceful_timeout_ms: u64,
    pub forced_timeout_ms: u64,
    pub nuclear_timeout_ms: u64,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            graceful_timeout_ms: DEFAULT_GRACEFUL_TIMEOUT_MS,
            forced_timeout_ms: DEFAULT_FORCED_TIMEOUT_MS,
            nuclear_timeout_ms: DEFAULT_NUCLEAR_TIMEOUT_MS,
        }
    }
}

impl TerminationPolicy {
    pub fn graceful_timeout(&self) -> Duration {
        Duration::from_millis(self.graceful_timeout_ms)
    }

    pub fn forced_timeout(&self) -> Duration {
        Duration::from_millis(self.forced_timeout_ms)
    }

    pub fn nuclear_timeout(&self) -> Duration {
        Duration::from_millis(self.nuclear_timeout_ms)
    }
}

/// Result of one Terminator invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationOutcome {
    pub pid: u32,
    pub tier: TerminationTier,
    /// Process was gone once the ladder finished
    pub confirmed: bool,
    /// This invocation crossed an alert threshold
    pub alert_raised: bool,
}

// ============================================================================
// ALERTING
// ============================================================================

/// Which kill counter drives the elevated alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertBasis {
    /// Every termination attempt counts
    Attempted,
    /// Only terminations whose target was confirmed gone
    Confirmed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPolicy {
    /// Alert when the chosen counter is a multiple of this (0 disables)
    pub every: u64,
    pub basis: AlertBasis,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            every: DEFAULT_ALERT_EVERY,
            basis: AlertBasis::Attempted,
        }
    }
}

impl AlertPolicy {
    pub fn is_due(&self, count: u64) -> bool {
        self.every > 0 && count > 0 && count % self.every == 0
    }
}

// ============================================================================
// THREAT RECORDS
// ============================================================================

/// One terminated (or attempted) threat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatRecord {
    pub timestamp: DateTime<Utc>,
    pub pid: u32,
    pub name: String,
    pub reason: String,
    pub kill_method: String,
    pub tier: TerminationTier,
    pub confirmed: bool,
}

impl ThreatRecord {
    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// How much threat history stays in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep everything (grows for the lifetime of the guardian)
    Unbounded,
    /// Keep the newest `capacity` records
    Ring { capacity: usize },
    /// Append to a JSONL file and clear memory once `threshold` records pile up
    Archive { path: PathBuf, threshold: usize },
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::Ring { capacity: DEFAULT_RING_CAPACITY }
    }
}

// ============================================================================
// ACTION ERRORS
// ============================================================================

/// Failure of a single process-control call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Process not found (already exited)
    ProcessNotFound { pid: u32 },
    /// Access denied
    AccessDenied { pid: u32, reason: String },
    /// Bounded wait expired
    TimedOut { what: String, after: Duration },
    /// Command failed to run
    CommandFailed { command: String, exit_code: i32, stderr: String },
    /// Facility missing on this platform
    Unsupported { operation: &'static str },
    /// Other error
    Other { message: String },
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::ProcessNotFound { pid } => write!(f, "Process {} not found", pid),
            ActionError::AccessDenied { pid, reason } => {
                write!(f, "Access denied to {}: {}", pid, reason)
            }
            ActionError::TimedOut { what, after } => write!(f, "{} timed out after {:?}", what, after),
            ActionError::CommandFailed { command, exit_code, stderr } => {
                write!(f, "Command '{}' failed ({}): {}", command, exit_code, stderr)
            }
            ActionError::Unsupported { operation } => write!(f, "Unsupported: {}", operation),
            ActionError::Other { message } => write!(f, "Error: {}", message),
        }
    }
}

impl std::error::Error for ActionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_policy_due() {
        let policy = AlertPolicy::default();
        assert!(!policy.is_due(0));
        assert!(!policy.is_due(4));
        assert!(policy.is_due(5));
        assert!(!policy.is_due(6));
        assert!(policy.is_due(10));

        let disabled = AlertPolicy { every: 0, basis: AlertBasis::Attempted };
        assert!(!disabled.is_due(5));
    }

    #[test]
    fn test_retention_policy_json() {
        let json = r#"{"mode":"archive","path":"threats.jsonl","threshold":100}"#;
        let policy: RetentionPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(
            policy,
            RetentionPolicy::Archive { path: PathBuf::from("threats.jsonl"), threshold: 100 }
        );
    }
}
