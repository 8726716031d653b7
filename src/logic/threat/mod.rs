//! Threat Module
//!
//! Decides whether a single process snapshot is automation software aimed at
//! a protected application.
//!
//! ## Structure
//! - `types`: Protected entries, signatures, verdicts
//! - `rules`: Default lists and the matcher capability set
//! - `classifier`: Classification logic
//!
//! ## Usage
//! ```ignore
//! let classifier = Classifier::new(&interpreter, &protected, &signature)?;
//! if let Some(verdict) = classifier.classify(&snapshot) {
//!     println!("{}", verdict.reason());
//! }
//! ```

pub mod types;
pub mod rules;
pub mod classifier;

pub use types::{ProtectedProcessEntry, ThreatSignature, ThreatVerdict};
pub use rules::{Matcher, MatcherSpec};
pub use classifier::Classifier;
