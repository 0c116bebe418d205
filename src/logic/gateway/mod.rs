//! Gateway Latency Analyzer
//!
//! ## Structure
//! - `types`: profile, signal, threshold constants
//! - `analyzer`: probe loop + pure statistics

pub mod analyzer;
pub mod types;

pub use analyzer::{filter_outliers, profile_from_samples, GatewayAnalyzer};
pub use types::{GatewayProfile, GatewaySignal, GatewayThresholds};
