//! Guardian Errors
//!
//! One error type for everything that can reach the Supervisor Loop.
//! `is_transient()` separates expected OS churn (a process exited, access
//! was denied) from failures that point at a real problem and deserve a
//! full error line.

use std::time::Duration;
use thiserror::Error;

use super::response::ActionError;

pub type GuardianResult<T> = Result<T, GuardianError>;

#[derive(Debug, Error)]
pub enum GuardianError {
    #[error("process {pid} exited during inspection")]
    ProcessGone { pid: u32 },

    #[error("access denied to process {pid}: {reason}")]
    AccessDenied { pid: u32, reason: String },

    #[error("process enumeration failed: {0}")]
    Enumeration(String),

    #[error("{what} timed out after {after:?}")]
    TimedOut { what: String, after: Duration },

    #[error("command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid matcher pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuardianError {
    /// Expected churn of a live process table; retrying later is the fix.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GuardianError::ProcessGone { .. }
                | GuardianError::AccessDenied { .. }
                | GuardianError::Enumeration(_)
                | GuardianError::TimedOut { .. }
        )
    }
}

impl From<ActionError> for GuardianError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::ProcessNotFound { pid } => GuardianError::ProcessGone { pid },
            ActionError::AccessDenied { pid, reason } => GuardianError::AccessDenied { pid, reason },
            ActionError::TimedOut { what, after } => GuardianError::TimedOut { what, after },
            ActionError::CommandFailed { command, exit_code, stderr } => GuardianError::CommandFailed {
                command,
                message: format!("exit {}: {}", exit_code, stderr),
            },
            ActionError::Unsupported { operation } => GuardianError::Unsupported(operation),
            ActionError::Other { message } => GuardianError::Enumeration(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GuardianError::ProcessGone { pid: 1 }.is_transient());
        assert!(GuardianError::Enumeration("busy".into()).is_transient());
        assert!(!GuardianError::Config("bad".into()).is_transient());
        assert!(!GuardianError::Unsupported("socket table").is_transient());
    }

    #[test]
    fn test_action_error_conversion_keeps_pid() {
        let err: GuardianError = ActionError::ProcessNotFound { pid: 42 }.into();
        assert!(matches!(err, GuardianError::ProcessGone { pid: 42 }));
        assert!(err.to_string().contains("42"));
    }
}
