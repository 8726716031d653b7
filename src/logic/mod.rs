//! Logic Module - Guardian Engines
//!
//! Scan → classify → terminate, plus the connection side path and the
//! supervisor loop that drives both.
//!
//! ## Layout
//! - `threat/` - Classifier and matcher rules
//! - `process_intel/` - Process table and socket table access
//! - `response/` - Termination ladder, counters, threat log
//! - `scanner`, `connection_guard`, `guardian`, `supervisor` - the pipeline

// Core pipeline
pub mod scanner;
pub mod connection_guard;
pub mod guardian;
pub mod supervisor;

// Domain modules
pub mod threat;
pub mod process_intel;
pub mod response;

// Ambient
pub mod config;
pub mod error;
pub mod logging;

#[cfg(test)]
pub mod testing;
