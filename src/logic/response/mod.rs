//! Response Module - Threat Termination
//!
//! # Components
//! - `actions.rs`: Process-control facility (signals, kill tools)
//! - `terminator.rs`: Three-tier escalation ladder + kill counters
//! - `threat_log.rs`: Bounded threat history
//! - `types.rs`: Policies, outcomes, records, errors

pub mod actions;
pub mod terminator;
pub mod threat_log;
pub mod types;

pub use types::{ActionError, AlertPolicy, RetentionPolicy, TerminationPolicy};
pub use actions::{ProcessControl, SystemControl};
pub use terminator::{KillStats, Terminator};
pub use threat_log::ThreatLog;
