//! API Module
//!
//! Entry points behind the command-line mode selector.
//!
//! - `commands::run_single_scan()` - one cycle, print a summary, exit
//! - `commands::run_fortress_mode()` - supervisor loop until Ctrl-C

pub mod commands;
