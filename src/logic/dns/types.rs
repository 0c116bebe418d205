//! DNS Checker Types

use std::collections::BTreeSet;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::logic::availability::Availability;
use crate::logic::severity::ThreatLevel;

/// Domains resolved during the integrity probe. All are high-traffic
/// public sites with no reason to resolve privately.
pub const TEST_DOMAINS: [&str; 4] = ["google.com", "cloudflare.com", "wikipedia.org", "github.com"];

/// Curated public resolvers accepted without question
pub const TRUSTED_PUBLIC_RESOLVERS: [&str; 6] = [
    "8.8.8.8",        // Google
    "8.8.4.4",        // Google secondary
    "1.1.1.1",        // Cloudflare
    "1.0.0.1",        // Cloudflare secondary
    "208.67.222.222", // OpenDNS
    "208.67.220.220", // OpenDNS secondary
];

/// Private-range and known carrier resolver prefixes, tolerated so
/// ISP-assigned resolvers are not treated as hostile by default
pub const ISP_RESOLVER_PATTERNS: [&str; 9] = [
    r"^10\.",                        // private
    r"^172\.(1[6-9]|2[0-9]|3[0-1])\.", // private
    r"^192\.168\.",                  // private
    r"^203\.80\.",                   // TM
    r"^202\.188\.",                  // Maxis
    r"^210\.195\.",                  // TIME
    r"^218\.111\.",                  // Digi
    r"^124\.217\.",                  // Celcom
    r"^61\.6\.",                     // TM Streamyx
];

/// Probe tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsConfig {
    pub test_domains: Vec<String>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            test_domains: TEST_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Outcome of resolving one panel domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsProbeResult {
    pub domain: String,
    pub resolved_addresses: Vec<IpAddr>,
    pub suspicious: bool,
    /// Resolution error, if the query failed outright
    pub error: Option<String>,
}

/// Result of the DNS integrity check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsCheckResult {
    pub configured_servers: BTreeSet<IpAddr>,
    pub servers_trusted: bool,
    pub probe_results: Vec<DnsProbeResult>,
    pub hijacking_detected: bool,
    pub successful_probes: usize,
    pub total_probes: usize,
    /// Fraction of panel domains that resolved cleanly, in [0, 1]
    pub success_rate: f64,
    pub threat_detected: bool,
    pub threat_level: ThreatLevel,
    pub availability: Availability,
}

impl DnsCheckResult {
    /// Placeholder when the checker could not run at all. A success rate
    /// of 1.0 keeps the fusion score untouched.
    pub fn unavailable() -> Self {
        Self {
            configured_servers: BTreeSet::new(),
            servers_trusted: false,
            probe_results: Vec::new(),
            hijacking_detected: false,
            successful_probes: 0,
            total_probes: 0,
            success_rate: 1.0,
            threat_detected: false,
            threat_level: ThreatLevel::Low,
            availability: Availability::Unavailable,
        }
    }
}
