//! Threat Matching Rules
//!
//! Default signature lists and the matcher capability set.
//! No classification logic here - only constants and matchers.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::logic::error::GuardianResult;

// ============================================================================
// DEFAULT SIGNATURES
// ============================================================================

/// Applications shielded from automation: (executable name, label)
pub const DEFAULT_PROTECTED: &[(&str, &str)] = &[
    ("Code.exe", "Visual Studio Code"),
    ("steam.exe", "Steam Client"),
    ("steamwebhelper.exe", "Steam Web Helper"),
    ("Discord.exe", "Discord Chat"),
];

/// Banned command-line keywords, checked in this order
pub const DEFAULT_BANNED_KEYWORDS: &[&str] = &[
    "pyautogui", "automation", "bot", "isle", "slay", "rcon",
    "ashveil_bot", "CookieMonster", "remote.SSH", "steam_auth",
    "click()", "typewrite", "screenshot", "locateOnScreen",
];

/// Banned interpreter modules (matched as `import x` / `from x`)
pub const DEFAULT_BANNED_MODULES: &[&str] = &[
    "pyautogui", "pynput", "keyboard", "mouse", "pygetwindow",
    "selenium", "playwright", "requests_html",
];

/// Interpreter detection on the process name
pub const DEFAULT_INTERPRETER_PATTERN: &str = "python";

/// Process-name marker of the editor watched by the Connection Guard
pub const DEFAULT_CONNECTION_MARKER: &str = "code";

// ============================================================================
// MATCHERS
// ============================================================================

/// How a pattern is applied to a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Substring,
    Prefix,
    Regex,
}

/// Serializable matcher definition (config side)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherSpec {
    pub kind: MatchKind,
    pub pattern: String,
}

impl MatcherSpec {
    pub fn substring(pattern: &str) -> Self {
        Self { kind: MatchKind::Substring, pattern: pattern.to_string() }
    }

    #[cfg(test)]
    pub fn prefix(pattern: &str) -> Self {
        Self { kind: MatchKind::Prefix, pattern: pattern.to_string() }
    }

    #[cfg(test)]
    pub fn regex(pattern: &str) -> Self {
        Self { kind: MatchKind::Regex, pattern: pattern.to_string() }
    }

    /// Compile into a ready matcher. Fails only on an invalid regex.
    pub fn compile(&self) -> GuardianResult<Matcher> {
        let matcher = match self.kind {
            MatchKind::Substring => Matcher::Substring(self.pattern.to_lowercase()),
            MatchKind::Prefix => Matcher::Prefix(self.pattern.to_lowercase()),
            MatchKind::Regex => Matcher::Regex(
                RegexBuilder::new(&self.pattern)
                    .case_insensitive(true)
                    .build()?,
            ),
        };
        Ok(matcher)
    }
}

/// Compiled, case-insensitive matcher
#[derive(Debug, Clone)]
pub enum Matcher {
    Substring(String),
    Prefix(String),
    Regex(Regex),
}

impl Matcher {
    pub fn matches(&self, haystack: &str) -> bool {
        match self {
            Matcher::Substring(needle) => haystack.to_lowercase().contains(needle.as_str()),
            Matcher::Prefix(needle) => haystack.to_lowercase().starts_with(needle.as_str()),
            Matcher::Regex(re) => re.is_match(haystack),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
