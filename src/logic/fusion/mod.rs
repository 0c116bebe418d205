//! Threat Fusion Engine
//!
//! Reconciles four independently-failing signal sources into one
//! low-false-positive verdict. This is the decision core: everything
//! upstream only gathers evidence.
//!
//! ## Structure
//! - `types`: verdict record and classification enums
//! - `rules`: score contributions and decision thresholds
//! - `engine`: the fusion logic

pub mod engine;
pub mod rules;
pub mod types;

pub use engine::{duplicate_macs, fuse, new_device_count};
pub use rules::FusionThresholds;
pub use types::{DetectionType, ThreatVerdict};
