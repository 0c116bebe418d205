//! Logic Module - Detection Engines
//!
//! The signal sources and the fusion core. Each checker produces a fixed,
//! strongly-typed record; the fusion engine consumes typed fields only.
//!
//! ## Structure
//! - `discovery/` - neighbor snapshot (passive table / active probe)
//! - `gateway/` - gateway latency statistics
//! - `dns/` - resolver trust + resolution integrity
//! - `tls/` - leaf certificate inspection
//! - `fusion/` - the scoring and verdict core
//! - `detector` - concurrent cycle orchestration

pub mod availability;
pub mod detector;
pub mod discovery;
pub mod dns;
pub mod fusion;
pub mod gateway;
pub mod severity;
pub mod tls;

pub use availability::Availability;
pub use severity::ThreatLevel;
