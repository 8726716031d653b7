//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Keyword and module lists live in `logic::threat::rules`.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Fortress Guardian";

/// Environment variable naming the JSON config file
pub const CONFIG_ENV: &str = "FORTRESS_CONFIG";

/// Default log file (relative to the working directory)
pub const DEFAULT_LOG_FILE: &str = "fortress_guardian.log";

/// Data directory name under the platform's local data dir
pub const DATA_DIR_NAME: &str = "fortress-guardian";

// ============================================
// Supervisor timing
// ============================================

/// Pause between scan cycles (seconds)
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 2;

/// Pause after a failed iteration (seconds)
pub const DEFAULT_COOLDOWN_SECS: u64 = 5;

/// Connection Guard runs on every Nth iteration, starting at 0
pub const DEFAULT_GUARD_EVERY: u64 = 5;

// ============================================
// Termination ladder
// ============================================

/// Tier 1: wait for cooperative exit (ms)
pub const DEFAULT_GRACEFUL_TIMEOUT_MS: u64 = 1_000;

/// Tier 2: forced tree kill command bound (ms)
pub const DEFAULT_FORCED_TIMEOUT_MS: u64 = 5_000;

/// Tier 3: each process-table removal step bound (ms)
pub const DEFAULT_NUCLEAR_TIMEOUT_MS: u64 = 5_000;

/// Fixed tag stored on every threat record
pub const KILL_METHOD_TAG: &str = "AGGRESSIVE_KILL";

// ============================================
// Alerting & retention
// ============================================

/// Elevated alert every N kills
pub const DEFAULT_ALERT_EVERY: u64 = 5;

/// In-memory threat records kept by the default ring policy
pub const DEFAULT_RING_CAPACITY: usize = 500;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get config file path from environment, if any
pub fn get_config_path() -> Option<std::path::PathBuf> {
    std::env::var_os(CONFIG_ENV)
        .filter(|v| !v.is_empty())
        .map(std::path::PathBuf::from)
}

/// Base directory for archives and other persisted data
pub fn get_data_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(DATA_DIR_NAME)
}
