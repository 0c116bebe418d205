//! Fusion Rules & Thresholds
//!
//! Score contributions and decision thresholds for the fusion engine.
//! The values are empirically tuned magic numbers inherited from field
//! testing; they are kept as named constants with a configurable
//! override struct rather than re-derived.

use serde::{Deserialize, Serialize};

// ============================================================================
// SCORE CONTRIBUTIONS (Constants)
// ============================================================================

/// Gateway completely unreachable - the strongest single signal
pub const SCORE_GATEWAY_UNREACHABLE: u32 = 60;

/// Intermittent gateway connectivity (mutually exclusive with the above)
pub const SCORE_GATEWAY_PARTIAL: u32 = 40;

/// Average gateway latency above the high bound
pub const SCORE_HIGH_LATENCY: u32 = 35;

/// Average gateway latency above the suspicious bound (mutually
/// exclusive with high; higher wins)
pub const SCORE_SUSPICIOUS_LATENCY: u32 = 25;

/// Latency standard deviation above the variance bound
pub const SCORE_HIGH_VARIANCE: u32 = 20;

/// Bonus when suspicious latency and high variance fire together
pub const SCORE_LATENCY_VARIANCE_COMBO: u32 = 15;

/// Gateway slower than the external reference
pub const SCORE_ROUTING_ANOMALY: u32 = 20;

/// Same MAC claiming two or more IPs (passive discovery only)
pub const SCORE_DUPLICATE_MAC: u32 = 40;

/// More than `DEVICE_CHURN_THRESHOLD` devices newly present
pub const SCORE_DEVICE_CHURN: u32 = 15;

/// New-device count must strictly exceed this to score
pub const DEVICE_CHURN_THRESHOLD: usize = 3;

/// Every DNS query failed
pub const SCORE_DNS_BLACKOUT: u32 = 50;

/// DNS success rate below one half
pub const SCORE_DNS_MAJORITY_FAILED: u32 = 35;

/// DNS success rate below three quarters
pub const SCORE_DNS_PARTIAL_FAILED: u32 = 20;

/// Bonus when the resolvers are untrusted AND queries are failing
pub const SCORE_DNS_UNTRUSTED_BONUS: u32 = 15;

/// DNS success-rate boundaries for the score ladder
pub const DNS_MAJORITY_FAILED_RATE: f64 = 0.5;
pub const DNS_PARTIAL_FAILED_RATE: f64 = 0.75;

// ============================================================================
// DECISION THRESHOLDS
// ============================================================================

/// Combined score at or above this is a detection (when below the
/// network-down bound)
pub const DETECTION_THRESHOLD: u32 = 50;

/// Combined score at or above this, with a DNS blackout and a dominant
/// network sub-score, means the network is DOWN - an outage, not an
/// attack
pub const NETWORK_DOWN_THRESHOLD: u32 = 90;

/// Network sub-score floor for the network-down reclassification
pub const NETWORK_DOWN_MIN_NETWORK_SCORE: u32 = 60;

/// Network sub-score at or above this is an explicit discovery threat
/// flag even when the combined score stays below the detection threshold
pub const DISCOVERY_THREAT_THRESHOLD: u32 = 40;

/// Scores are clamped to [0, SCORE_CAP]
pub const SCORE_CAP: u32 = 100;

// ============================================================================
// VERDICT LEVEL BANDS
// ============================================================================

pub const LEVEL_CRITICAL_SCORE: u32 = 80;
pub const LEVEL_HIGH_SCORE: u32 = 60;
pub const LEVEL_MEDIUM_SCORE: u32 = 40;

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// Decision thresholds (configurable; score contributions stay fixed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionThresholds {
    /// At or above this = detection
    pub detection_threshold: u32,
    /// At or above this (plus DNS blackout) = outage, not attack
    pub network_down_threshold: u32,
    /// Network sub-score floor for the outage reclassification
    pub network_down_min_network_score: u32,
    /// Network sub-score that flags a discovery threat on its own
    pub discovery_threat_threshold: u32,
    /// New-device count that marks unusual churn
    pub device_churn_threshold: usize,
}

impl Default for FusionThresholds {
    fn default() -> Self {
        Self {
            detection_threshold: DETECTION_THRESHOLD,
            network_down_threshold: NETWORK_DOWN_THRESHOLD,
            network_down_min_network_score: NETWORK_DOWN_MIN_NETWORK_SCORE,
            discovery_threat_threshold: DISCOVERY_THREAT_THRESHOLD,
            device_churn_threshold: DEVICE_CHURN_THRESHOLD,
        }
    }
}

impl FusionThresholds {
    /// High sensitivity - lower thresholds, more alerts
    pub fn high_sensitivity() -> Self {
        Self {
            detection_threshold: 40,
            discovery_threat_threshold: 30,
            ..Default::default()
        }
    }

    /// Low sensitivity - higher thresholds, fewer alerts
    pub fn low_sensitivity() -> Self {
        Self {
            detection_threshold: 60,
            discovery_threat_threshold: 50,
            ..Default::default()
        }
    }
}
