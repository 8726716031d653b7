//! Guardian - owns the scan/guard/terminate pipeline
//!
//! Wires one process source, the Scanner, the Connection Guard and a single
//! Terminator together so every path shares the same counters and log.

use super::config::GuardianConfig;
use super::connection_guard::ConnectionGuard;
use super::error::GuardianResult;
use super::process_intel::{platform_table, ConnectionTable, ProcessSource, SysinfoSource};
use super::response::{KillStats, ProcessControl, SystemControl, Terminator, ThreatLog};
use super::scanner::Scanner;

pub struct Guardian {
    source: Box<dyn ProcessSource>,
    scanner: Scanner,
    guard: ConnectionGuard,
    terminator: Terminator,
}

impl Guardian {
    pub fn new(
        config: &GuardianConfig,
        source: Box<dyn ProcessSource>,
        control: Box<dyn ProcessControl>,
        table: Box<dyn ConnectionTable>,
    ) -> GuardianResult<Self> {
        config.validate()?;

        let scanner = Scanner::new(config.classifier()?);
        let guard = ConnectionGuard::new(
            config.connection_marker.compile()?,
            config.interpreter.compile()?,
            config.protected.clone(),
            table,
        );
        let terminator = Terminator::new(
            control,
            config.termination.clone(),
            config.alerting.clone(),
            ThreatLog::new(config.retention.clone()),
        );

        Ok(Self { source, scanner, guard, terminator })
    }

    /// Guardian backed by the real process table
    pub fn with_system(config: &GuardianConfig) -> GuardianResult<Self> {
        Self::new(
            config,
            Box::new(SysinfoSource::new()),
            Box::new(SystemControl::new()),
            platform_table(),
        )
    }

    /// One Scanner cycle
    pub fn scan(&mut self) -> GuardianResult<usize> {
        self.scanner.scan(self.source.as_mut(), &self.terminator)
    }

    /// One Connection Guard pass; never fails
    pub fn guard_protected_connections(&mut self) -> usize {
        self.guard.guard(self.source.as_mut(), &self.terminator)
    }

    pub fn stats(&self) -> KillStats {
        self.terminator.stats()
    }

    pub fn threat_log(&self) -> &ThreatLog {
        self.terminator.threat_log()
    }
}
