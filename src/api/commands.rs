//! Guardian Commands
//!
//! The two modes of the command-line surface. Neither reports internal
//! errors to the caller: failures go to the log, and the process exits 0.

use std::io::Write;

use crate::logic::config::GuardianConfig;
use crate::logic::guardian::Guardian;
use crate::logic::supervisor::Supervisor;

// ============================================================================
// MODE SELECTION
// ============================================================================

pub const SCAN_FLAG: &str = "--scan";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One scan, print found/clear, exit
    SingleScan,
    /// Continuous protection until interrupted
    Fortress,
}

impl Mode {
    /// First argument selects the mode; anything else means Fortress
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        match args.into_iter().next() {
            Some(arg) if arg == SCAN_FLAG => Mode::SingleScan,
            _ => Mode::Fortress,
        }
    }
}

// ============================================================================
// SINGLE SCAN
// ============================================================================

pub fn scan_summary(threats: usize) -> String {
    if threats > 0 {
        format!("🚨 {} AUTOMATION THREATS ELIMINATED", threats)
    } else {
        "🏰 FORTRESS SECURE - NO THREATS DETECTED".to_string()
    }
}

/// Run one cycle on `guardian` and write the summary line to `out`
pub fn scan_once<W: Write>(guardian: &mut Guardian, out: &mut W) -> usize {
    let threats = match guardian.scan() {
        Ok(n) => n,
        Err(e) => {
            log::error!("Single scan failed: {}", e);
            0
        }
    };

    if let Err(e) = writeln!(out, "{}", scan_summary(threats)) {
        log::error!("Cannot print scan summary: {}", e);
    }
    threats
}

pub fn run_single_scan(config: &GuardianConfig) -> usize {
    let mut guardian = match Guardian::with_system(config) {
        Ok(g) => g,
        Err(e) => {
            log::error!("Guardian setup failed: {}", e);
            println!("{}", scan_summary(0));
            return 0;
        }
    };

    scan_once(&mut guardian, &mut std::io::stdout())
}

// ============================================================================
// FORTRESS MODE
// ============================================================================

pub fn run_fortress_mode(config: &GuardianConfig) {
    let guardian = match Guardian::with_system(config) {
        Ok(g) => g,
        Err(e) => {
            log::error!("Guardian setup failed: {}", e);
            return;
        }
    };

    let protected: Vec<&str> = config.protected.iter().map(|p| p.label.as_str()).collect();
    log::warn!("🛡️ Protecting: {} from ALL automation", protected.join(", "));

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create tokio runtime: {}", e);
            return;
        }
    };

    let mut supervisor = Supervisor::new(guardian, config);
    runtime.block_on(supervisor.run(shutdown_signal()));
    log_shutdown_summary(&supervisor);
}

/// Last threats handled before shutdown
const RECENT_ON_EXIT: usize = 5;

fn log_shutdown_summary(supervisor: &Supervisor) {
    let threats = supervisor.guardian().threat_log();

    for record in threats.recent(RECENT_ON_EXIT) {
        log::warn!(
            "   {} PID {} {} - {} ({})",
            record.timestamp.format("%H:%M:%S"),
            record.pid,
            record.name,
            record.reason,
            record.tier
        );
    }
    log::info!(
        "Supervisor {:?} after {} iterations, {} records archived",
        supervisor.state(),
        supervisor.iteration(),
        threats.archived()
    );
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// TESTS
// ============================================================================
