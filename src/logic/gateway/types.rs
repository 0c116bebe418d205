//! Gateway Analysis Types
//!
//! Data structures and threshold constants for gateway latency analysis.
//! The threshold values are empirically tuned; they are kept as named
//! constants with a configurable override struct.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::logic::availability::Availability;

// ============================================================================
// THRESHOLDS (Constants)
// ============================================================================

/// Above this average the gateway is suspicious (interception typically
/// adds 50-150ms of forwarding overhead)
pub const SUSPICIOUS_LATENCY_MS: f64 = 100.0;

/// Above this average the latency is outright high
pub const HIGH_LATENCY_MS: f64 = 150.0;

/// Standard deviation above this marks inconsistent forwarding
pub const LATENCY_STD_DEV_MS: f64 = 40.0;

/// Warm-up probes allowed to wake a radio in power-save mode
pub const WARMUP_MAX_PROBES: u32 = 5;

/// A warm-up probe under this bound proves the radio is awake
pub const WARMUP_AWAKE_MS: f64 = 2000.0;

/// Fixed measurement probe count
pub const MEASUREMENT_PROBES: u32 = 15;

/// Per-probe connect budget (ms)
pub const PROBE_TIMEOUT_MS: u64 = 1000;

/// Success rate below this (and above zero) is a partial failure
pub const PARTIAL_FAILURE_RATE: f64 = 0.8;

/// Samples beyond this many standard deviations are outliers
pub const OUTLIER_SIGMA: f64 = 2.0;

/// Minimum samples for outlier filtering to apply
pub const MIN_FILTERED_SAMPLES: usize = 3;

/// Gateway latency above this fraction of the external reference latency
/// flags a routing anomaly (the first hop should be faster)
pub const ROUTING_ANOMALY_RATIO: f64 = 0.8;

/// External reference host for the routing comparison
pub const EXTERNAL_REFERENCE_HOST: &str = "8.8.8.8";

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayThresholds {
    pub suspicious_latency_ms: f64,
    pub high_latency_ms: f64,
    pub std_dev_ms: f64,
    pub partial_failure_rate: f64,
    pub probe_timeout_ms: u64,
    pub routing_anomaly_ratio: f64,
    pub external_reference_host: String,
}

impl Default for GatewayThresholds {
    fn default() -> Self {
        Self {
            suspicious_latency_ms: SUSPICIOUS_LATENCY_MS,
            high_latency_ms: HIGH_LATENCY_MS,
            std_dev_ms: LATENCY_STD_DEV_MS,
            partial_failure_rate: PARTIAL_FAILURE_RATE,
            probe_timeout_ms: PROBE_TIMEOUT_MS,
            routing_anomaly_ratio: ROUTING_ANOMALY_RATIO,
            external_reference_host: EXTERNAL_REFERENCE_HOST.to_string(),
        }
    }
}

// ============================================================================
// PROFILE
// ============================================================================

/// Statistical profile of gateway round-trips for one cycle.
///
/// Produced fresh every cycle - either a full set of statistics or the
/// unreachable variant, never half-filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayProfile {
    pub gateway_ip: IpAddr,
    pub avg_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub std_dev_ms: f64,
    pub success_rate: f64,
    /// All measurement probes failed - the strongest single signal
    pub unreachable: bool,
    /// Some probes failed (success rate in (0, 0.8))
    pub partial_failure: bool,
    /// Average above the suspicious bound but not the high bound
    pub suspicious_latency: bool,
    /// Average above the high bound
    pub high_latency: bool,
    /// Standard deviation above the variance bound
    pub high_variance: bool,
}

impl GatewayProfile {
    pub fn unreachable(gateway_ip: IpAddr) -> Self {
        Self {
            gateway_ip,
            avg_latency_ms: 0.0,
            min_latency_ms: 0.0,
            max_latency_ms: 0.0,
            std_dev_ms: 0.0,
            success_rate: 0.0,
            unreachable: true,
            partial_failure: false,
            suspicious_latency: false,
            high_latency: false,
            high_variance: false,
        }
    }
}

/// Gateway signal as consumed by the fusion engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySignal {
    pub availability: Availability,
    pub profile: Option<GatewayProfile>,
    pub routing_anomaly: bool,
}

impl GatewaySignal {
    pub fn unavailable() -> Self {
        Self {
            availability: Availability::Unavailable,
            profile: None,
            routing_anomaly: false,
        }
    }
}
