//! Process Intelligence Module
//!
//! # Components
//! - `source.rs`: Process table enumeration (sysinfo)
//! - `connections.rs`: Socket-to-process table
//! - `types.rs`: Snapshots and connections

pub mod source;
pub mod connections;
pub mod types;

pub use types::ProcessSnapshot;
pub use source::{ProcessSource, SysinfoSource};
pub use connections::{platform_table, ConnectionTable};
