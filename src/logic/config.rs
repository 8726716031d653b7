//! Guardian Configuration
//!
//! One explicit config value handed to every component at construction.
//! Loaded from the JSON file named by `FORTRESS_CONFIG`; any field left out
//! falls back to its default.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::constants::{
    get_config_path, DEFAULT_COOLDOWN_SECS, DEFAULT_GUARD_EVERY, DEFAULT_LOG_FILE,
    DEFAULT_SCAN_INTERVAL_SECS,
};
use super::error::{GuardianError, GuardianResult};
use super::response::{AlertPolicy, RetentionPolicy, TerminationPolicy};
use super::threat::rules::{DEFAULT_CONNECTION_MARKER, DEFAULT_INTERPRETER_PATTERN};
use super::threat::{Classifier, MatcherSpec, ProtectedProcessEntry, ThreatSignature};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Applications shielded from automation, in match order
    pub protected: Vec<ProtectedProcessEntry>,
    /// Banned keywords and modules
    pub signature: ThreatSignature,
    /// Which process names count as an automation interpreter
    pub interpreter: MatcherSpec,
    /// Which process names the Connection Guard watches
    pub connection_marker: MatcherSpec,
    /// Pause between cycles (ms)
    pub scan_interval_ms: u64,
    /// Pause after a failed cycle (ms)
    pub cooldown_ms: u64,
    /// Connection Guard cadence in iterations (0 disables)
    pub guard_every: u64,
    pub termination: TerminationPolicy,
    pub alerting: AlertPolicy,
    pub retention: RetentionPolicy,
    /// Log file; `None` logs to the console only
    pub log_file: Option<PathBuf>,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            protected: ProtectedProcessEntry::defaults(),
            signature: ThreatSignature::default(),
            interpreter: MatcherSpec::substring(DEFAULT_INTERPRETER_PATTERN),
            connection_marker: MatcherSpec::substring(DEFAULT_CONNECTION_MARKER),
            scan_interval_ms: DEFAULT_SCAN_INTERVAL_SECS * 1000,
            cooldown_ms: DEFAULT_COOLDOWN_SECS * 1000,
            guard_every: DEFAULT_GUARD_EVERY,
            termination: TerminationPolicy::default(),
            alerting: AlertPolicy::default(),
            retention: RetentionPolicy::default(),
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

impl GuardianConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> GuardianResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// `FORTRESS_CONFIG` if set, defaults otherwise
    pub fn from_env() -> GuardianResult<Self> {
        match get_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Reject settings that would match everything or cannot compile
    pub fn validate(&self) -> GuardianResult<()> {
        if let Some(entry) = self.protected.iter().find(|p| p.name.trim().is_empty()) {
            return Err(GuardianError::Config(format!(
                "protected entry '{}' has an empty name",
                entry.label
            )));
        }
        if self.signature.keywords.iter().any(|k| k.is_empty()) {
            return Err(GuardianError::Config("empty banned keyword".into()));
        }
        if self.signature.modules.iter().any(|m| m.is_empty()) {
            return Err(GuardianError::Config("empty banned module".into()));
        }
        if self.interpreter.pattern.is_empty() || self.connection_marker.pattern.is_empty() {
            return Err(GuardianError::Config("empty matcher pattern".into()));
        }
        self.interpreter.compile()?;
        self.connection_marker.compile()?;
        Ok(())
    }

    pub fn classifier(&self) -> GuardianResult<Classifier> {
        Classifier::new(&self.interpreter, &self.protected, &self.signature)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

// ============================================================================
// TESTS
// ============================================================================
