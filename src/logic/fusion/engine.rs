//! Threat Fusion Engine
//!
//! Folds the four signal packages plus the discovery delta into one
//! verdict. The engine is stateless and never fails: missing signals
//! contribute nothing to the score and show up as gap notes in the
//! reasons list.

use std::collections::BTreeMap;
use std::net::IpAddr;

use chrono::Utc;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::logic::discovery::{DeviceSnapshot, DiscoveryReport, MacAddr};
use crate::logic::dns::DnsCheckResult;
use crate::logic::gateway::GatewaySignal;
use crate::logic::severity::ThreatLevel;
use crate::logic::tls::TlsCheckSummary;

use super::rules::*;
use super::types::{DetectionType, ThreatVerdict};

/// Fuse one cycle's signals into a verdict.
///
/// `previous` is the caller-retained snapshot from the last successful
/// cycle; the engine only reads it.
pub fn fuse(
    discovery: &DiscoveryReport,
    previous: Option<&DeviceSnapshot>,
    gateway: &GatewaySignal,
    dns: &DnsCheckResult,
    tls: &TlsCheckSummary,
    thresholds: &FusionThresholds,
) -> ThreatVerdict {
    let mut reasons: Vec<String> = Vec::new();

    let network_score = score_network(discovery, previous, gateway, thresholds, &mut reasons);
    let dns_score = score_dns(dns, &mut reasons);

    let combined = (network_score + dns_score).min(SCORE_CAP);
    debug!(
        "fusion: network {} + dns {} => combined {}",
        network_score, dns_score, combined
    );

    // Total connectivity collapse is an outage, not interception; a
    // false MITM alarm here would be worse than useless.
    let dns_blackout = dns.availability.is_available() && dns.success_rate == 0.0;
    let network_down = combined >= thresholds.network_down_threshold
        && dns_blackout
        && network_score >= thresholds.network_down_min_network_score;

    let discovery_threat = network_score >= thresholds.discovery_threat_threshold;

    let in_detection_band =
        combined >= thresholds.detection_threshold && combined < thresholds.network_down_threshold;

    let detected = !network_down
        && (in_detection_band
            || discovery_threat
            || dns.threat_detected
            || dns.hijacking_detected
            || tls.threat_detected);

    let detection_type = if network_down {
        DetectionType::NetworkDown
    } else if dns.hijacking_detected {
        DetectionType::DnsHijacking
    } else if discovery_threat || in_detection_band {
        DetectionType::NetworkAnomaly
    } else if tls.self_signed_count > 0 {
        DetectionType::SslStripping
    } else {
        DetectionType::None
    };

    // Remaining named conditions, in priority order after the scored ones
    if dns.hijacking_detected {
        reasons.push("DNS resolution showing suspicious patterns".to_string());
    }
    if tls.self_signed_count > 0 {
        reasons.push(format!(
            "{} self-signed certificate(s) detected",
            tls.self_signed_count
        ));
    }
    if tls.stripping.stripping_detected && tls.self_signed_count == 0 {
        reasons.push("Possible SSL stripping attack".to_string());
    }
    append_gap_notes(discovery, gateway, dns, tls, &mut reasons);

    let reasons = if network_down {
        vec![format!(
            "Network appears to be down or temporarily unavailable. \
             This is NOT a security threat - likely a power-saving radio \
             or temporary connectivity loss. (score {}/100)",
            combined
        )]
    } else if reasons.is_empty() {
        vec![format!(
            "No threats detected. Network appears secure. (score {}/100)",
            combined
        )]
    } else {
        reasons
    };

    let level = verdict_level(combined, dns, tls);

    if network_down {
        warn!("verdict: network DOWN (score {}) - not an attack", combined);
    } else if detected {
        warn!(
            "verdict: THREAT ({}, score {}, level {})",
            detection_type, combined, level
        );
    } else {
        info!("verdict: clean (score {})", combined);
    }

    ThreatVerdict {
        id: Uuid::new_v4(),
        detected,
        score: combined,
        level,
        detection_type,
        reasons,
        network_down,
        network_score,
        dns_score,
        timestamp: Utc::now(),
    }
}

// ============================================================================
// NETWORK SUB-SCORE (discovery + gateway)
// ============================================================================

fn score_network(
    discovery: &DiscoveryReport,
    previous: Option<&DeviceSnapshot>,
    gateway: &GatewaySignal,
    thresholds: &FusionThresholds,
    reasons: &mut Vec<String>,
) -> u32 {
    let mut score = 0u32;

    let profile = gateway
        .profile
        .as_ref()
        .filter(|_| gateway.availability.is_available());
    if let Some(profile) = profile {
        if profile.unreachable {
            score += SCORE_GATEWAY_UNREACHABLE;
            reasons.push("Gateway completely unreachable".to_string());
        } else if profile.partial_failure {
            score += SCORE_GATEWAY_PARTIAL;
            reasons.push("Intermittent gateway connectivity".to_string());
        } else if profile.high_latency {
            score += SCORE_HIGH_LATENCY;
            reasons.push(format!(
                "Very high gateway latency ({}ms)",
                profile.avg_latency_ms as i64
            ));
        } else if profile.suspicious_latency {
            score += SCORE_SUSPICIOUS_LATENCY;
            reasons.push(format!(
                "High gateway latency ({}ms)",
                profile.avg_latency_ms as i64
            ));
        }

        if profile.high_variance {
            score += SCORE_HIGH_VARIANCE;
            reasons.push(format!(
                "Inconsistent network performance (stddev {}ms)",
                profile.std_dev_ms as i64
            ));
        }

        if profile.suspicious_latency && profile.high_variance {
            score += SCORE_LATENCY_VARIANCE_COMBO;
            reasons.push("Gateway behavior consistent with interception".to_string());
        }
    }

    if gateway.routing_anomaly {
        score += SCORE_ROUTING_ANOMALY;
        reasons.push("Routing anomaly detected".to_string());
    }

    // Duplicate MACs only mean something when a MAC was actually read
    // from the neighbor table
    let duplicates = duplicate_macs(&discovery.snapshot);
    if !duplicates.is_empty() {
        score += SCORE_DUPLICATE_MAC;
        warn!("{} MAC(s) claiming multiple IPs", duplicates.len());
        reasons.push("Duplicate MAC addresses detected (possible ARP spoofing)".to_string());
    }

    if discovery.availability.is_available() {
        if let Some(previous) = previous {
            let new_devices = new_device_count(&discovery.snapshot, previous);
            if new_devices > thresholds.device_churn_threshold {
                score += SCORE_DEVICE_CHURN;
                reasons.push(format!("Unusual number of new devices ({})", new_devices));
            }
        }
    }

    score
}

// ============================================================================
// DNS SUB-SCORE
// ============================================================================

fn score_dns(dns: &DnsCheckResult, reasons: &mut Vec<String>) -> u32 {
    if !dns.availability.is_available() {
        return 0;
    }

    let mut score = 0u32;

    if dns.success_rate == 0.0 {
        score += SCORE_DNS_BLACKOUT;
        reasons.push(format!(
            "Complete DNS failure - all queries blocked or hijacked ({}/{} successful)",
            dns.successful_probes, dns.total_probes
        ));
    } else if dns.success_rate < DNS_MAJORITY_FAILED_RATE {
        score += SCORE_DNS_MAJORITY_FAILED;
        reasons.push(format!(
            "Majority of DNS queries failed ({}/{} successful)",
            dns.successful_probes, dns.total_probes
        ));
    } else if dns.success_rate < DNS_PARTIAL_FAILED_RATE {
        score += SCORE_DNS_PARTIAL_FAILED;
        reasons.push(format!(
            "Some DNS queries failed ({}/{} successful)",
            dns.successful_probes, dns.total_probes
        ));
    }

    if !dns.servers_trusted && dns.success_rate < 1.0 {
        score += SCORE_DNS_UNTRUSTED_BONUS;
        reasons.push("Untrusted DNS servers with failing queries".to_string());
    }

    score
}

// ============================================================================
// DELTA HELPERS (pure)
// ============================================================================

/// MACs observed for two or more IPs. Only passive discovery carries
/// MACs, so active snapshots yield nothing here.
pub fn duplicate_macs(snapshot: &DeviceSnapshot) -> Vec<(MacAddr, Vec<IpAddr>)> {
    let mut by_mac: BTreeMap<MacAddr, Vec<IpAddr>> = BTreeMap::new();
    for device in &snapshot.devices {
        if let Some(mac) = device.mac {
            by_mac.entry(mac).or_default().push(device.ip);
        }
    }
    by_mac.into_iter().filter(|(_, ips)| ips.len() > 1).collect()
}

/// Devices present now that were absent from the previous snapshot.
pub fn new_device_count(current: &DeviceSnapshot, previous: &DeviceSnapshot) -> usize {
    current
        .devices
        .iter()
        .filter(|device| !previous.devices.iter().any(|p| p.ip == device.ip))
        .count()
}

// ============================================================================
// LEVEL & GAPS
// ============================================================================

fn verdict_level(score: u32, dns: &DnsCheckResult, tls: &TlsCheckSummary) -> ThreatLevel {
    let band = if score >= LEVEL_CRITICAL_SCORE {
        ThreatLevel::Critical
    } else if score >= LEVEL_HIGH_SCORE {
        ThreatLevel::High
    } else if score >= LEVEL_MEDIUM_SCORE {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    };
    band.max(dns.threat_level).max(tls.threat_level)
}

fn append_gap_notes(
    discovery: &DiscoveryReport,
    gateway: &GatewaySignal,
    dns: &DnsCheckResult,
    tls: &TlsCheckSummary,
    reasons: &mut Vec<String>,
) {
    if !discovery.availability.is_available() {
        reasons.push("Neighbor discovery unavailable - not scored".to_string());
    }
    if !gateway.availability.is_available() {
        reasons.push("Unable to analyze gateway - not scored".to_string());
    }
    if !dns.availability.is_available() {
        reasons.push("DNS check unavailable - not scored".to_string());
    }
    if !tls.availability.is_available() {
        reasons.push("Certificate check unavailable - not scored".to_string());
    }
}
