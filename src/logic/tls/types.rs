//! TLS Checker Types

use serde::{Deserialize, Serialize};

use crate::logic::availability::Availability;
use crate::logic::severity::ThreatLevel;

/// Highly reliable HTTPS endpoints probed each cycle
pub const TEST_ENDPOINTS: [&str; 2] = ["www.google.com", "www.cloudflare.com"];

/// At least this many real (non-network-error) invalid certificates
/// raise the aggregate level to Medium
pub const INVALID_CERT_MEDIUM_COUNT: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub endpoints: Vec<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            endpoints: TEST_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Inspection result for one endpoint's leaf certificate.
///
/// `is_network_error` and security invalidity are mutually exclusive: a
/// connection failure never counts as a security finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateCheckResult {
    pub endpoint: String,
    pub valid: bool,
    pub self_signed: bool,
    pub expired: bool,
    /// Recorded but never invalidating - CDN and wildcard deployments
    /// mismatch legitimately
    pub hostname_mismatch: bool,
    pub is_network_error: bool,
    pub error: Option<String>,
}

impl CertificateCheckResult {
    pub fn network_error(endpoint: &str, message: String) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            valid: true,
            self_signed: false,
            expired: false,
            hostname_mismatch: false,
            is_network_error: true,
            error: Some(message),
        }
    }
}

/// SSL-stripping heuristic outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrippingResult {
    pub stripping_detected: bool,
    /// Endpoints that presented a self-signed certificate
    pub suspicious_endpoints: Vec<String>,
    pub total_probes: usize,
    pub https_successful: usize,
}

/// Aggregate TLS signal as consumed by the fusion engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsCheckSummary {
    pub results: Vec<CertificateCheckResult>,
    pub stripping: StrippingResult,
    pub self_signed_count: usize,
    pub invalid_cert_count: usize,
    pub threat_detected: bool,
    pub threat_level: ThreatLevel,
    pub availability: Availability,
}

impl TlsCheckSummary {
    pub fn unavailable() -> Self {
        Self {
            results: Vec::new(),
            stripping: StrippingResult {
                stripping_detected: false,
                suspicious_endpoints: Vec::new(),
                total_probes: 0,
                https_successful: 0,
            },
            self_signed_count: 0,
            invalid_cert_count: 0,
            threat_detected: false,
            threat_level: ThreatLevel::Low,
            availability: Availability::Unavailable,
        }
    }
}
