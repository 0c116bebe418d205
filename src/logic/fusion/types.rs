//! Fusion Types
//!
//! The fused verdict and its classification enums. No logic here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::severity::ThreatLevel;

/// Primary classification of a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionType {
    /// Nothing suspicious
    None,
    /// Gateway/discovery evidence (latency, duplicate MACs, churn)
    NetworkAnomaly,
    /// Resolution tampering
    DnsHijacking,
    /// Unexpected self-signed certificates on known endpoints
    SslStripping,
    /// Total connectivity collapse - an outage, not an attack
    NetworkDown,
}

impl DetectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionType::None => "none",
            DetectionType::NetworkAnomaly => "networkAnomaly",
            DetectionType::DnsHijacking => "dnsHijacking",
            DetectionType::SslStripping => "sslStripping",
            DetectionType::NetworkDown => "networkDown",
        }
    }
}

impl std::fmt::Display for DetectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The composite verdict for one detection cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatVerdict {
    pub id: Uuid,
    pub detected: bool,
    /// Combined score, clamped to [0, 100]
    pub score: u32,
    pub level: ThreatLevel,
    pub detection_type: DetectionType,
    /// Ordered, human-readable contributing conditions
    pub reasons: Vec<String>,
    /// True when the score pattern matches an outage rather than an attack
    pub network_down: bool,
    /// Discovery + gateway portion of the score (pre-clamp)
    pub network_score: u32,
    /// DNS portion of the score (pre-clamp)
    pub dns_score: u32,
    pub timestamp: DateTime<Utc>,
}
