//! Threat Classifier
//!
//! ONLY the classify logic - no types, no policy.
//! Input: ProcessSnapshot
//! Output: Option<ThreatVerdict>
//!
//! Rules, in order:
//! 1. Interpreter processes (name matches the interpreter matcher) are checked
//!    for banned keywords, then for `import <module>` / `from <module>`.
//! 2. Protected applications launched with any banned keyword are flagged.
//!
//! First match in configured order wins. No scoring.

use crate::logic::error::GuardianResult;
use crate::logic::process_intel::ProcessSnapshot;

use super::rules::{Matcher, MatcherSpec};
use super::types::{ProtectedProcessEntry, ThreatSignature, ThreatVerdict};

/// Protected entry with its name pre-lowered
#[derive(Debug, Clone)]
struct ProtectedRule {
    name: String,
    label: String,
}

/// Stateless classifier built from configuration
#[derive(Debug, Clone)]
pub struct Classifier {
    interpreter: Matcher,
    protected: Vec<ProtectedRule>,
    keywords: Vec<(String, String)>,
    modules: Vec<String>,
}

impl Classifier {
    pub fn new(
        interpreter: &MatcherSpec,
        protected: &[ProtectedProcessEntry],
        signature: &ThreatSignature,
    ) -> GuardianResult<Self> {
        Ok(Self {
            interpreter: interpreter.compile()?,
            protected: protected
                .iter()
                .map(|p| ProtectedRule { name: p.name.to_lowercase(), label: p.label.clone() })
                .collect(),
            // (original spelling for the verdict, lowered for matching)
            keywords: signature
                .keywords
                .iter()
                .map(|k| (k.clone(), k.to_lowercase()))
                .collect(),
            modules: signature.modules.iter().map(|m| m.to_lowercase()).collect(),
        })
    }

    /// Classify one snapshot. Never fails: anything odd is "no verdict".
    pub fn classify(&self, snapshot: &ProcessSnapshot) -> Option<ThreatVerdict> {
        let name = snapshot.name.to_lowercase();
        let cmdline = snapshot.joined_cmdline().to_lowercase();

        if self.interpreter.matches(&name) {
            if let Some(keyword) = self.first_keyword(&cmdline) {
                return Some(ThreatVerdict::Keyword { keyword: keyword.to_string() });
            }

            if let Some(module) = self.modules.iter().find(|m| {
                cmdline.contains(&format!("import {}", m)) || cmdline.contains(&format!("from {}", m))
            }) {
                return Some(ThreatVerdict::Module { module: module.clone() });
            }
        }

        for rule in &self.protected {
            if name.contains(&rule.name) && self.first_keyword(&cmdline).is_some() {
                return Some(ThreatVerdict::ProtectedTarget { label: rule.label.clone() });
            }
        }

        None
    }

    fn first_keyword(&self, cmdline: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|(_, lowered)| cmdline.contains(lowered.as_str()))
            .map(|(original, _)| original.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::threat::rules::DEFAULT_INTERPRETER_PATTERN;

    fn default_classifier() -> Classifier {
        Classifier::new(
            &MatcherSpec::substring(DEFAULT_INTERPRETER_PATTERN),
            &ProtectedProcessEntry::defaults(),
            &ThreatSignature::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_python_with_pyautogui_flag() {
        let c = default_classifier();
        let snap = ProcessSnapshot::new(10, "python.exe", &["python", "bot_click.py", "--pyautogui"]);

        // pyautogui is listed before bot, so it wins
        assert_eq!(
            c.classify(&snap),
            Some(ThreatVerdict::Keyword { keyword: "pyautogui".into() })
        );
    }

    #[test]
    fn test_every_keyword_is_caught_for_python() {
        let c = default_classifier();
        for keyword in &ThreatSignature::default().keywords {
            let arg = format!("--{}", keyword.to_uppercase());
            let snap = ProcessSnapshot::new(11, "python3", &["python3", "run.py", &arg]);
            let verdict = c.classify(&snap).expect("keyword should be caught");
            // an earlier keyword may win (ashveil_bot also contains bot)
            assert!(matches!(verdict, ThreatVerdict::Keyword { .. }), "{:?} for {}", verdict, keyword);
        }
    }

    #[test]
    fn test_banned_module_import() {
        let c = default_classifier();
        let snap = ProcessSnapshot::new(12, "python", &["python", "-c", "import pynput; print(1)"]);
        assert_eq!(c.classify(&snap), Some(ThreatVerdict::Module { module: "pynput".into() }));

        let snap = ProcessSnapshot::new(13, "python", &["python", "-c", "from selenium import webdriver"]);
        assert_eq!(c.classify(&snap), Some(ThreatVerdict::Module { module: "selenium".into() }));
    }

    #[test]
    fn test_non_interpreter_unprotected_is_ignored() {
        let c = default_classifier();
        let snap = ProcessSnapshot::new(14, "bash", &["bash", "-c", "pyautogui bot automation rcon"]);
        assert_eq!(c.classify(&snap), None);
    }

    #[test]
    fn test_editor_without_keywords_is_clean() {
        let c = default_classifier();
        let snap = ProcessSnapshot::new(15, "Code.exe", &["Code.exe", "--folder", "C:\\proj"]);
        assert_eq!(c.classify(&snap), None);
    }

    #[test]
    fn test_protected_target_with_keywords() {
        let c = default_classifier();
        let snap = ProcessSnapshot::new(16, "steam.exe", &["steam.exe", "-bot", "-automation"]);
        let verdict = c.classify(&snap).unwrap();

        assert_eq!(verdict, ThreatVerdict::ProtectedTarget { label: "Steam Client".into() });
        assert!(verdict.reason().to_lowercase().contains("automation targeting steam client"));
    }

    #[test]
    fn test_mixed_case_keywords_match_lowered_cmdline() {
        let c = default_classifier();

        // configured as remote.SSH; the command line is compared lower-cased
        let snap = ProcessSnapshot::new(18, "Discord.exe", &["Discord.exe", "--remote.ssh"]);
        assert_eq!(
            c.classify(&snap),
            Some(ThreatVerdict::ProtectedTarget { label: "Discord Chat".into() })
        );

        let snap = ProcessSnapshot::new(19, "python", &["python", "cookiemonster.py"]);
        assert_eq!(
            c.classify(&snap),
            Some(ThreatVerdict::Keyword { keyword: "CookieMonster".into() })
        );
    }

    #[test]
    fn test_python_clean_script_is_ignored() {
        let c = default_classifier();
        let snap = ProcessSnapshot::new(17, "python3", &["python3", "-m", "http.server"]);
        assert_eq!(c.classify(&snap), None);
    }

    #[test]
    fn test_custom_config_swaps_rules() {
        let c = Classifier::new(
            &MatcherSpec::prefix("node"),
            &[ProtectedProcessEntry::new("game.bin", "Game")],
            &ThreatSignature { keywords: vec!["macro".into()], modules: vec![] },
        )
        .unwrap();

        let node = ProcessSnapshot::new(20, "node", &["node", "macro.js"]);
        assert_eq!(c.classify(&node), Some(ThreatVerdict::Keyword { keyword: "macro".into() }));

        // python is no longer an interpreter under this config
        let py = ProcessSnapshot::new(21, "python", &["python", "macro.py"]);
        assert_eq!(c.classify(&py), None);

        let game = ProcessSnapshot::new(22, "game.bin", &["game.bin", "--macro"]);
        assert_eq!(c.classify(&game), Some(ThreatVerdict::ProtectedTarget { label: "Game".into() }));
    }

    #[test]
    fn test_empty_cmdline_is_safe() {
        let c = default_classifier();
        let snap = ProcessSnapshot::new(23, "python", &[]);
        assert_eq!(c.classify(&snap), None);
    }
}
