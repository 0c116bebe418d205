//! DNS Integrity Checker
//!
//! Evaluates whether the configured resolvers deserve trust and probes a
//! panel of well-known domains for hijacked answers. Detection requires
//! corroboration: a single flaky domain or an unusual-but-working ISP
//! resolver is not enough to alarm.

use std::collections::BTreeSet;
use std::net::IpAddr;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::RegexSet;

use crate::logic::availability::Availability;
use crate::logic::severity::ThreatLevel;
use crate::platform::DomainResolver;

use super::types::{
    DnsCheckResult, DnsConfig, DnsProbeResult, ISP_RESOLVER_PATTERNS, TRUSTED_PUBLIC_RESOLVERS,
};

static ISP_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new(ISP_RESOLVER_PATTERNS).expect("ISP resolver patterns must compile")
});

/// Multiple suspicious domains, or one suspicious domain alongside a
/// total resolution blackout, are required before calling hijack.
const HIJACK_MIN_SUSPICIOUS: usize = 2;

/// Hijack evidence this strong is a threat even with trusted resolvers
const HIJACK_OVERWHELMING_SUSPICIOUS: usize = 3;

pub struct DnsChecker<'a> {
    resolver: &'a dyn DomainResolver,
    config: &'a DnsConfig,
}

impl<'a> DnsChecker<'a> {
    pub fn new(resolver: &'a dyn DomainResolver, config: &'a DnsConfig) -> Self {
        Self { resolver, config }
    }

    /// Run the full integrity check against the configured servers.
    pub async fn check(&self) -> DnsCheckResult {
        let configured_servers: BTreeSet<IpAddr> =
            self.resolver.configured_servers().into_iter().collect();
        let servers_trusted = servers_trusted(&configured_servers);
        debug!(
            "dns servers: {:?} (trusted: {})",
            configured_servers, servers_trusted
        );

        let mut probe_results = Vec::with_capacity(self.config.test_domains.len());
        let mut successful = 0usize;
        let mut suspicious_count = 0usize;

        for domain in &self.config.test_domains {
            let result = self.probe_domain(domain).await;
            if result.suspicious {
                suspicious_count += 1;
                warn!(
                    "suspicious resolution for {}: {:?}",
                    domain, result.resolved_addresses
                );
            } else if result.error.is_none() {
                successful += 1;
            }
            probe_results.push(result);
        }

        let total = probe_results.len();
        let success_rate = if total > 0 {
            successful as f64 / total as f64
        } else {
            1.0
        };
        debug!("dns probes: {}/{} successful", successful, total);

        let hijacking_detected = suspicious_count >= HIJACK_MIN_SUSPICIOUS
            || (suspicious_count > 0 && successful == 0);

        let has_untrusted = !servers_trusted && !configured_servers.is_empty();

        // Composite threat needs BOTH untrusted resolvers and hijack
        // evidence - unless the evidence is overwhelming on its own.
        let threat_detected = (hijacking_detected && has_untrusted)
            || (hijacking_detected && suspicious_count >= HIJACK_OVERWHELMING_SUSPICIOUS);

        let threat_level = if threat_detected {
            ThreatLevel::Critical
        } else if hijacking_detected {
            ThreatLevel::High
        } else if has_untrusted {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        };

        if hijacking_detected {
            warn!(
                "dns hijack pattern: {} suspicious domain(s), {} success(es)",
                suspicious_count, successful
            );
        }

        DnsCheckResult {
            configured_servers,
            servers_trusted,
            probe_results,
            hijacking_detected,
            successful_probes: successful,
            total_probes: total,
            success_rate,
            threat_detected,
            threat_level,
            availability: Availability::Available,
        }
    }

    async fn probe_domain(&self, domain: &str) -> DnsProbeResult {
        match self.resolver.resolve(domain).await {
            Ok(addresses) => {
                let suspicious =
                    addresses.is_empty() || addresses.iter().any(|ip| is_suspicious_answer(*ip, domain));
                DnsProbeResult {
                    domain: domain.to_string(),
                    resolved_addresses: addresses,
                    suspicious,
                    error: None,
                }
            }
            Err(e) => {
                // A failed query is a failed sample, not hijack evidence
                debug!("resolution failed for {}: {}", domain, e);
                DnsProbeResult {
                    domain: domain.to_string(),
                    resolved_addresses: Vec::new(),
                    suspicious: false,
                    error: Some(e.message),
                }
            }
        }
    }
}

// ============================================================================
// TRUST EVALUATION (pure)
// ============================================================================

/// A server list is trusted when at least one address is a curated public
/// resolver or matches the private/ISP allow-list. An empty list is not
/// trusted - there is nothing to vouch for.
pub fn servers_trusted(servers: &BTreeSet<IpAddr>) -> bool {
    servers
        .iter()
        .any(|server| is_trusted_public(*server) || is_isp_resolver(*server))
}

fn is_trusted_public(server: IpAddr) -> bool {
    let addr = server.to_string();
    TRUSTED_PUBLIC_RESOLVERS.iter().any(|known| *known == addr)
}

fn is_isp_resolver(server: IpAddr) -> bool {
    ISP_PATTERNS.is_match(&server.to_string())
}

/// A public panel domain answered with a loopback, unspecified, or
/// private address has been tampered with.
fn is_suspicious_answer(ip: IpAddr, domain: &str) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            // 0.0.0.x "this network" answers are blocker artifacts
            if octets[0] == 0 && octets[1] == 0 && octets[2] == 0 {
                return true;
            }
            v4.is_private() && !domain.contains("local")
        }
        IpAddr::V6(_) => false,
    }
}
