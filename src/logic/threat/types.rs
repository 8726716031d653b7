//! Threat Types
//!
//! Core types for threat classification.
//! No logic here - only data structures.

use serde::{Deserialize, Serialize};

use super::rules::{DEFAULT_BANNED_KEYWORDS, DEFAULT_BANNED_MODULES, DEFAULT_PROTECTED};

// ============================================================================
// CONFIGURATION TYPES
// ============================================================================

/// An application shielded from automation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedProcessEntry {
    /// Executable name, matched case-insensitively as a name substring
    pub name: String,
    /// Human-readable label used in verdicts
    pub label: String,
}

impl ProtectedProcessEntry {
    pub fn new(name: &str, label: &str) -> Self {
        Self { name: name.to_string(), label: label.to_string() }
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_PROTECTED
            .iter()
            .map(|(name, label)| Self::new(name, label))
            .collect()
    }
}

/// Banned keywords and interpreter modules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatSignature {
    pub keywords: Vec<String>,
    pub modules: Vec<String>,
}

impl Default for ThreatSignature {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_BANNED_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            modules: DEFAULT_BANNED_MODULES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

// ============================================================================
// VERDICT
// ============================================================================

/// Why a process was judged an automation threat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ThreatVerdict {
    /// Interpreter with a banned keyword on its command line
    Keyword { keyword: String },
    /// Interpreter importing a banned module
    Module { module: String },
    /// Protected application launched with automation keywords
    ProtectedTarget { label: String },
    /// Interpreter holding a connection to a protected application
    ConnectedInterpreter { protected: String },
}

impl ThreatVerdict {
    pub fn reason(&self) -> String {
        match self {
            ThreatVerdict::Keyword { keyword } => format!("Python automation detected: {}", keyword),
            ThreatVerdict::Module { module } => format!("Banned automation module: {}", module),
            ThreatVerdict::ProtectedTarget { label } => format!("Automation targeting {}", label),
            ThreatVerdict::ConnectedInterpreter { protected } => {
                format!("Python process connected to {}", protected)
            }
        }
    }
}

impl std::fmt::Display for ThreatVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        let v = ThreatVerdict::ProtectedTarget { label: "Steam Client".into() };
        assert_eq!(v.reason(), "Automation targeting Steam Client");
        assert_eq!(
            serde_json::to_string(&v).unwrap(),
            r#"{"rule":"protected_target","label":"Steam Client"}"#
        );

        let v = ThreatVerdict::Module { module: "pynput".into() };
        assert_eq!(v.to_string(), "Banned automation module: pynput");
    }

    #[test]
    fn test_default_protected_order() {
        let entries = ProtectedProcessEntry::defaults();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].label, "Visual Studio Code");
        assert_eq!(entries[1].name, "steam.exe");
    }
}
