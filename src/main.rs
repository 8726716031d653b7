//! Fortress Guardian - Main Entry Point
//!
//! `fortress-guardian --scan` runs one scan and prints a summary.
//! `fortress-guardian` protects continuously until Ctrl-C.

mod api;
mod logic;
pub mod constants;

use api::commands::{self, Mode};
use logic::config::GuardianConfig;

fn main() {
    let loaded = GuardianConfig::from_env();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    logic::logging::init(config.log_file());
    log::info!("Starting {} v{}", constants::APP_NAME, constants::APP_VERSION);

    if let Err(e) = &loaded {
        log::error!("Config rejected, using defaults: {}", e);
    }

    match Mode::from_args(std::env::args().skip(1)) {
        Mode::SingleScan => {
            commands::run_single_scan(&config);
        }
        Mode::Fortress => commands::run_fortress_mode(&config),
    }
}
