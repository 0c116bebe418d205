//! DNS Integrity Checker
//!
//! ## Structure
//! - `types`: result records, probe panel, resolver allow-lists
//! - `checker`: trust evaluation + resolution probing

pub mod checker;
pub mod types;

pub use checker::{servers_trusted, DnsChecker};
pub use types::{DnsCheckResult, DnsConfig, DnsProbeResult};
