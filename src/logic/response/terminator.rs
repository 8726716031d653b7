//! Terminator - escalating process termination
//!
//! Ladder (each tier runs only if the previous one failed):
//! 1. Graceful: cooperative terminate + bounded wait
//! 2. Forced: OS kill of the process and its child tree
//! 3. Nuclear: remove children, then the target; errors ignored
//!
//! Every invocation appends exactly one `ThreatRecord` and bumps the
//! attempted counter by one, whatever the OS said. Whether the process is
//! really gone is tracked separately as "confirmed".

use std::sync::atomic::{AtomicU64, Ordering};
use chrono::Utc;
use serde::Serialize;

use crate::constants::KILL_METHOD_TAG;
use crate::logic::threat::ThreatVerdict;
use super::actions::ProcessControl;
use super::threat_log::ThreatLog;
use super::types::{
    AlertBasis, AlertPolicy, TerminationOutcome, TerminationPolicy, TerminationTier, ThreatRecord,
};

// ============================================================================
// COUNTERS
// ============================================================================

/// Process-wide kill counters (monotonic)
#[derive(Debug, Default)]
pub struct KillCounters {
    attempted: AtomicU64,
    confirmed: AtomicU64,
    alerts: AtomicU64,
}

impl KillCounters {
    pub fn attempted(&self) -> u64 {
        self.attempted.load(Ordering::SeqCst)
    }

    pub fn confirmed(&self) -> u64 {
        self.confirmed.load(Ordering::SeqCst)
    }

    pub fn alerts(&self) -> u64 {
        self.alerts.load(Ordering::SeqCst)
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KillStats {
    pub attempted: u64,
    pub confirmed: u64,
    pub alerts: u64,
    pub recorded: u64,
}

// ============================================================================
// TERMINATOR
// ============================================================================

pub struct Terminator {
    control: Box<dyn ProcessControl>,
    policy: TerminationPolicy,
    alerting: AlertPolicy,
    counters: KillCounters,
    log: ThreatLog,
}

impl Terminator {
    pub fn new(
        control: Box<dyn ProcessControl>,
        policy: TerminationPolicy,
        alerting: AlertPolicy,
        log: ThreatLog,
    ) -> Self {
        Self {
            control,
            policy,
            alerting,
            counters: KillCounters::default(),
            log,
        }
    }

    /// Terminate `pid`. Never fails from the caller's point of view.
    pub fn terminate(&self, pid: u32, name: &str, verdict: &ThreatVerdict) -> TerminationOutcome {
        let tier = self.escalate(pid);
        let confirmed = !self.control.is_alive(pid);
        let reason = verdict.reason();

        self.log.append(ThreatRecord {
            timestamp: Utc::now(),
            pid,
            name: name.to_string(),
            reason: reason.clone(),
            kill_method: KILL_METHOD_TAG.to_string(),
            tier,
            confirmed,
        });

        let attempted = self.counters.attempted.fetch_add(1, Ordering::SeqCst) + 1;
        let confirmed_total = if confirmed {
            self.counters.confirmed.fetch_add(1, Ordering::SeqCst) + 1
        } else {
            self.counters.confirmed()
        };

        if confirmed {
            log::warn!("🚨 THREAT ELIMINATED: PID {} - {} - {} ({})", pid, name, reason, tier);
        } else {
            log::warn!("🚨 THREAT HIT (unconfirmed): PID {} - {} - {} ({})", pid, name, reason, tier);
        }

        let alert_count = match self.alerting.basis {
            AlertBasis::Attempted => Some(attempted),
            AlertBasis::Confirmed => confirmed.then_some(confirmed_total),
        };

        let alert_raised = match alert_count {
            Some(count) if self.alerting.is_due(count) => {
                self.counters.alerts.fetch_add(1, Ordering::SeqCst);
                log::error!("⚠️ WARNING: {} AUTOMATION THREATS KILLED!", count);
                true
            }
            _ => false,
        };

        TerminationOutcome { pid, tier, confirmed, alert_raised }
    }

    fn escalate(&self, pid: u32) -> TerminationTier {
        match self.control.request_terminate(pid, self.policy.graceful_timeout()) {
            Ok(()) => return TerminationTier::Graceful,
            Err(e) => log::debug!("Graceful terminate of {} failed: {}", pid, e),
        }

        match self.control.force_kill_tree(pid, self.policy.forced_timeout()) {
            Ok(()) => return TerminationTier::Forced,
            Err(e) => log::debug!("Forced kill of {} failed: {}", pid, e),
        }

        let timeout = self.policy.nuclear_timeout();
        if let Err(e) = self.control.remove_children(pid, timeout) {
            log::debug!("Child removal for {} failed: {}", pid, e);
        }
        if let Err(e) = self.control.remove_process(pid, timeout) {
            log::debug!("Process removal of {} failed: {}", pid, e);
        }
        TerminationTier::Nuclear
    }

    pub fn stats(&self) -> KillStats {
        KillStats {
            attempted: self.counters.attempted(),
            confirmed: self.counters.confirmed(),
            alerts: self.counters.alerts(),
            recorded: self.log.total_recorded(),
        }
    }

    pub fn threat_log(&self) -> &ThreatLog {
        &self.log
    }
}

// ============================================================================
// TESTS
// ============================================================================
