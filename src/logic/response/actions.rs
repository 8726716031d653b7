//! Process Actions Module
//!
//! The process-control facility behind the termination ladder:
//! cooperative terminate, forced tree kill, and direct process-table removal.
//!
//! Signals go through sysinfo; the forced tier shells out to the OS kill
//! tools (`taskkill` / `pkill` + `kill`) with a bounded wait.

use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use parking_lot::Mutex;
use sysinfo::{Pid, ProcessStatus, Signal, System};

use super::types::ActionError;

// ============================================================================
// CONSTANTS
// ============================================================================

const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// TRAIT
// ============================================================================

/// OS process-control facility. Every call is bounded by its timeout.
pub trait ProcessControl {
    /// Ask the process to exit and wait for it. A missing process is `Ok`.
    fn request_terminate(&self, pid: u32, timeout: Duration) -> Result<(), ActionError>;

    /// Forced kill of the process and its child tree.
    fn force_kill_tree(&self, pid: u32, timeout: Duration) -> Result<(), ActionError>;

    /// Remove every process whose parent is `pid`.
    fn remove_children(&self, pid: u32, timeout: Duration) -> Result<(), ActionError>;

    /// Remove `pid` itself from the process table.
    fn remove_process(&self, pid: u32, timeout: Duration) -> Result<(), ActionError>;

    /// Process still exists (zombies count as gone)
    fn is_alive(&self, pid: u32) -> bool;
}

// ============================================================================
// SYSTEM IMPLEMENTATION
// ============================================================================

pub struct SystemControl {
    system: Mutex<System>,
}

impl SystemControl {
    pub fn new() -> Self {
        Self { system: Mutex::new(System::new()) }
    }

    fn signal(&self, pid: u32, signal: Signal) -> Result<(), ActionError> {
        let mut sys = self.system.lock();
        let sys_pid = Pid::from_u32(pid);

        if !sys.refresh_process(sys_pid) {
            return Err(ActionError::ProcessNotFound { pid });
        }
        let process = sys.process(sys_pid).ok_or(ActionError::ProcessNotFound { pid })?;

        match process.kill_with(signal) {
            Some(true) => Ok(()),
            Some(false) => Err(ActionError::AccessDenied {
                pid,
                reason: format!("{:?} rejected", signal),
            }),
            None => Err(ActionError::Unsupported { operation: "signal" }),
        }
    }

    fn wait_for_exit(&self, pids: &[u32], timeout: Duration, what: &str) -> Result<(), ActionError> {
        let deadline = Instant::now() + timeout;
        loop {
            if pids.iter().all(|&pid| !self.is_alive(pid)) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ActionError::TimedOut { what: what.to_string(), after: timeout });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    #[cfg(not(windows))]
    fn children_of(&self, pid: u32) -> Vec<u32> {
        let mut sys = self.system.lock();
        sys.refresh_processes();
        sys.processes()
            .iter()
            .filter(|(_, p)| p.parent().map(|pp| pp.as_u32()) == Some(pid))
            .map(|(child, _)| child.as_u32())
            .collect()
    }
}

impl Default for SystemControl {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessControl for SystemControl {
    fn request_terminate(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        match self.signal(pid, Signal::Term) {
            Ok(()) => self.wait_for_exit(&[pid], timeout, "graceful exit"),
            Err(ActionError::ProcessNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn force_kill_tree(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        let pid_str = pid.to_string();

        #[cfg(windows)]
        {
            let mut cmd = Command::new("taskkill");
            cmd.args(["/f", "/pid", &pid_str, "/t"]);
            run_bounded(cmd, timeout)?;
        }

        #[cfg(not(windows))]
        {
            let deadline = Instant::now() + timeout;

            let mut children = Command::new("pkill");
            children.args(["-KILL", "-P", &pid_str]);
            run_bounded(children, timeout)?;

            let mut target = Command::new("kill");
            target.args(["-KILL", &pid_str]);
            run_bounded(target, deadline.saturating_duration_since(Instant::now()))?;
        }

        Ok(())
    }

    #[cfg(windows)]
    fn remove_children(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        let mut cmd = Command::new("wmic");
        cmd.args(["process", "where", &format!("ParentProcessId={}", pid), "delete"]);
        run_bounded(cmd, timeout).map(|_| ())
    }

    #[cfg(not(windows))]
    fn remove_children(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        let children = self.children_of(pid);
        for &child in &children {
            // a child may exit on its own between listing and signalling
            let _ = self.signal(child, Signal::Kill);
        }
        self.wait_for_exit(&children, timeout, "child removal")
    }

    #[cfg(windows)]
    fn remove_process(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        let mut cmd = Command::new("wmic");
        cmd.args(["process", "where", &format!("ProcessId={}", pid), "delete"]);
        run_bounded(cmd, timeout).map(|_| ())
    }

    #[cfg(not(windows))]
    fn remove_process(&self, pid: u32, timeout: Duration) -> Result<(), ActionError> {
        match self.signal(pid, Signal::Kill) {
            Ok(()) => self.wait_for_exit(&[pid], timeout, "process removal"),
            Err(ActionError::ProcessNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        let mut sys = self.system.lock();
        let sys_pid = Pid::from_u32(pid);
        sys.refresh_process(sys_pid)
            && sys
                .process(sys_pid)
                .map(|p| p.status() != ProcessStatus::Zombie)
                .unwrap_or(false)
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Run a command, killing it if it outlives `timeout`. A non-zero exit is
/// not an error: the kill tools report "no such process" that way.
fn run_bounded(mut command: Command, timeout: Duration) -> Result<ExitStatus, ActionError> {
    let program = command.get_program().to_string_lossy().to_string();

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ActionError::CommandFailed {
            command: program.clone(),
            exit_code: -1,
            stderr: e.to_string(),
        })?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    log::debug!("{} exited with {}", program, status);
                }
                return Ok(status);
            }
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ActionError::TimedOut { what: program, after: timeout });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(ActionError::Other { message: e.to_string() }),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spawn_sleeper() -> std::process::Child {
        Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("sleep should be available")
    }

    #[test]
    fn test_missing_process_counts_as_terminated() {
        let control = SystemControl::new();
        // pid far above any default pid_max
        assert!(control.request_terminate(u32::MAX - 7, Duration::from_millis(100)).is_ok());
        assert!(!control.is_alive(u32::MAX - 7));
    }

    #[test]
    fn test_graceful_terminate_real_child() {
        let mut child = spawn_sleeper();
        let pid = child.id();
        let control = SystemControl::new();
        assert!(control.is_alive(pid));

        // SIGTERM lands; the child stays a zombie until we reap it
        let _ = control.request_terminate(pid, Duration::from_millis(500));
        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[test]
    fn test_run_bounded_times_out() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_bounded(cmd, Duration::from_millis(100));
        assert!(matches!(result, Err(ActionError::TimedOut { .. })));
    }

    #[test]
    fn test_run_bounded_missing_binary() {
        let cmd = Command::new("definitely-not-a-real-binary-xyz");
        let result = run_bounded(cmd, Duration::from_millis(100));
        assert!(matches!(result, Err(ActionError::CommandFailed { .. })));
    }
}
