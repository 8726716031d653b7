//! Supervisor Loop
//!
//! Drives the Guardian until cancelled:
//! scan every cycle, Connection Guard on iterations 0, N, 2N, ..., then
//! sleep. A failed iteration is logged and followed by a longer cool-down;
//! it never stops the loop. Cancellation is observed only while sleeping,
//! so a started scan always runs to completion. The shutdown future is
//! polled once before the first scan so a signal listener behind it is
//! installed from the start.

use std::future::Future;
use std::time::Duration;
use serde::Serialize;

use super::config::GuardianConfig;
use super::error::GuardianResult;
use super::guardian::Guardian;
use super::response::KillStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SupervisorState {
    Running,
    Stopped,
}

/// What one iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IterationReport {
    pub iteration: u64,
    pub threats: usize,
    pub guarded: bool,
    pub guard_kills: usize,
}

pub struct Supervisor {
    guardian: Guardian,
    scan_interval: Duration,
    cooldown: Duration,
    guard_every: u64,
    iteration: u64,
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(guardian: Guardian, config: &GuardianConfig) -> Self {
        Self {
            guardian,
            scan_interval: config.scan_interval(),
            cooldown: config.cooldown(),
            guard_every: config.guard_every,
            iteration: 0,
            state: SupervisorState::Stopped,
        }
    }

    /// Run one iteration synchronously. The counter only advances on success.
    pub fn run_iteration(&mut self) -> GuardianResult<IterationReport> {
        let threats = self.guardian.scan()?;

        let guarded = self.guard_every > 0 && self.iteration % self.guard_every == 0;
        let guard_kills = if guarded {
            self.guardian.guard_protected_connections()
        } else {
            0
        };

        if threats > 0 {
            log::warn!("🔥 {} AUTOMATION THREATS ELIMINATED", threats);
        }

        let report = IterationReport {
            iteration: self.iteration,
            threats,
            guarded,
            guard_kills,
        };
        self.iteration += 1;
        Ok(report)
    }

    /// Loop until `shutdown` resolves; returns the final kill stats
    pub async fn run<F>(&mut self, shutdown: F) -> KillStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        self.state = SupervisorState::Running;

        log::warn!("🏰 FORTRESS MODE ACTIVATED - ULTRA-AGGRESSIVE PROTECTION");
        log::warn!("⚔️ Zero tolerance for automation interpreters");

        let mut cancelled = tokio::select! {
            biased;
            _ = &mut shutdown => true,
            _ = std::future::ready(()) => false,
        };

        while !cancelled {
            let pause = match self.run_iteration() {
                Ok(report) => {
                    log::debug!(
                        "Iteration {} done: {} threats, guard {} ({} kills)",
                        report.iteration,
                        report.threats,
                        report.guarded,
                        report.guard_kills
                    );
                    self.scan_interval
                }
                Err(e) if e.is_transient() => {
                    log::warn!("Fortress iteration {} skipped: {}", self.iteration, e);
                    self.cooldown
                }
                Err(e) => {
                    log::error!("Fortress error at iteration {}: {}", self.iteration, e);
                    self.cooldown
                }
            };

            cancelled = tokio::select! {
                biased;
                _ = &mut shutdown => true,
                _ = tokio::time::sleep(pause) => false,
            };
        }

        self.state = SupervisorState::Stopped;
        let stats = self.guardian.stats();
        log::warn!("🛑 FORTRESS MODE DEACTIVATED");
        log::warn!(
            "📊 TOTAL THREATS KILLED: {} ({} confirmed, {} alerts)",
            stats.attempted,
            stats.confirmed,
            stats.alerts
        );
        stats
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn guardian(&self) -> &Guardian {
        &self.guardian
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use parking_lot::Mutex;
    use crate::logic::process_intel::{ProcessSnapshot, ProcessSource};
    use crate::logic::testing::{FakeControl, FakeSource, FakeTable};

    fn fast_config() -> GuardianConfig {
        GuardianConfig {
            scan_interval_ms: 1,
            cooldown_ms: 1,
            ..Default::default()
        }
    }

    fn supervisor(source: FakeSource) -> Supervisor {
        let config = fast_config();
        let guardian = Guardian::new(
            &config,
            Box::new(source),
            Box::new(FakeControl::new()),
            Box::new(FakeTable::new()),
        )
        .unwrap();
        Supervisor::new(guardian, &config)
    }

    #[test]
    fn test_guard_runs_every_fifth_iteration() {
        let mut sup = supervisor(FakeSource::new(vec![]));

        let guarded: Vec<u64> = (0..16)
            .map(|_| sup.run_iteration().unwrap())
            .filter(|r| r.guarded)
            .map(|r| r.iteration)
            .collect();

        assert_eq!(guarded, vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_failed_iteration_does_not_advance() {
        let mut sup = supervisor(FakeSource::failing());

        assert!(sup.run_iteration().is_err());
        assert!(sup.run_iteration().is_err());
        assert_eq!(sup.iteration(), 0);
    }

    #[test]
    fn test_iteration_reports_threats() {
        let mut sup = supervisor(FakeSource::new(vec![
            ProcessSnapshot::new(7, "python", &["python", "typewrite.py"]),
        ]));

        let report = sup.run_iteration().unwrap();
        assert_eq!(report.threats, 1);
        assert_eq!(sup.guardian().stats().attempted, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let mut sup = supervisor(FakeSource::new(vec![]));

        // already-resolved shutdown: stop before scanning
        let stats = sup.run(async {}).await;

        assert_eq!(sup.iteration(), 0);
        assert_eq!(sup.state(), SupervisorState::Stopped);
        assert_eq!(stats.attempted, 0);
    }

    /// Records whether the shutdown future was already polled at scan time
    struct WatchedSource {
        listening: Arc<AtomicBool>,
        seen_at_first_scan: Arc<Mutex<Option<bool>>>,
    }

    impl ProcessSource for WatchedSource {
        fn snapshots(&mut self) -> GuardianResult<Vec<ProcessSnapshot>> {
            let mut seen = self.seen_at_first_scan.lock();
            if seen.is_none() {
                *seen = Some(self.listening.load(Ordering::SeqCst));
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_shutdown_listener_installed_before_first_scan() {
        let listening = Arc::new(AtomicBool::new(false));
        let seen = Arc::new(Mutex::new(None));
        let config = fast_config();
        let guardian = Guardian::new(
            &config,
            Box::new(WatchedSource {
                listening: Arc::clone(&listening),
                seen_at_first_scan: Arc::clone(&seen),
            }),
            Box::new(FakeControl::new()),
            Box::new(FakeTable::new()),
        )
        .unwrap();
        let mut sup = Supervisor::new(guardian, &config);

        let flag = Arc::clone(&listening);
        sup.run(async move {
            // stands in for ctrl_c(), which registers on first poll
            flag.store(true, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
        })
        .await;

        assert_eq!(*seen.lock(), Some(true));
        assert!(sup.iteration() >= 1);
    }

    #[tokio::test]
    async fn test_run_survives_failing_iterations() {
        let mut sup = supervisor(FakeSource::failing());

        sup.run(tokio::time::sleep(Duration::from_millis(30))).await;

        assert_eq!(sup.iteration(), 0);
        assert_eq!(sup.state(), SupervisorState::Stopped);
    }

    #[tokio::test]
    async fn test_run_loops_until_shutdown() {
        let mut sup = supervisor(FakeSource::new(vec![]));

        sup.run(tokio::time::sleep(Duration::from_millis(50))).await;

        assert!(sup.iteration() >= 2);
    }
}
