//! Certificate / TLS Security Checker
//!
//! Inspects leaf certificates on known-good endpoints. The only findings
//! treated as attack evidence are real certificate defects - above all a
//! self-signed leaf where a public CA chain belongs. Connection failures
//! are network weather, excluded from every security count.

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::logic::availability::Availability;
use crate::logic::severity::ThreatLevel;
use crate::platform::{CertificateFetcher, LeafCertificate};

use super::types::{
    CertificateCheckResult, StrippingResult, TlsCheckSummary, TlsConfig, INVALID_CERT_MEDIUM_COUNT,
};

pub struct TlsChecker<'a> {
    fetcher: &'a dyn CertificateFetcher,
    config: &'a TlsConfig,
}

impl<'a> TlsChecker<'a> {
    pub fn new(fetcher: &'a dyn CertificateFetcher, config: &'a TlsConfig) -> Self {
        Self { fetcher, config }
    }

    /// Probe the endpoint panel and aggregate the findings.
    pub async fn check(&self) -> TlsCheckSummary {
        let mut results = Vec::with_capacity(self.config.endpoints.len());
        for endpoint in &self.config.endpoints {
            results.push(self.check_endpoint(endpoint).await);
        }
        summarize(results)
    }

    /// Stripping heuristic alone: only self-signed leaves count as
    /// interception evidence; plain failures are ignored.
    pub async fn detect_stripping(&self) -> StrippingResult {
        self.check().await.stripping
    }

    async fn check_endpoint(&self, endpoint: &str) -> CertificateCheckResult {
        match self.fetcher.fetch_leaf(endpoint).await {
            Ok(leaf) => {
                let result = validate_leaf(endpoint, &leaf, Utc::now());
                if !result.valid {
                    warn!(
                        "{}: invalid certificate (self_signed={}, expired={})",
                        endpoint, result.self_signed, result.expired
                    );
                }
                result
            }
            Err(e) => {
                // Timeouts, refusals and handshake errors are not findings
                debug!("{}: {} (network, not a security issue)", endpoint, e);
                CertificateCheckResult::network_error(endpoint, e.to_string())
            }
        }
    }
}

// ============================================================================
// VALIDATION (pure)
// ============================================================================

/// Apply the validity rules to one leaf.
///
/// Invalid only for real defects: outside the validity window, or
/// self-signed (issuer equals subject). Hostname mismatch is recorded but
/// tolerated.
pub fn validate_leaf(
    endpoint: &str,
    leaf: &LeafCertificate,
    now: DateTime<Utc>,
) -> CertificateCheckResult {
    let expired = now > leaf.not_after || now < leaf.not_before;
    let self_signed = leaf.issuer == leaf.subject;
    let hostname_mismatch = !hostname_matches(endpoint, &leaf.subject);

    let error = if expired {
        Some("certificate expired or not yet valid".to_string())
    } else if self_signed {
        Some("self-signed certificate".to_string())
    } else if hostname_mismatch {
        Some("certificate hostname mismatch (might be CDN)".to_string())
    } else {
        None
    };

    CertificateCheckResult {
        endpoint: endpoint.to_string(),
        valid: !expired && !self_signed,
        self_signed,
        expired,
        hostname_mismatch,
        is_network_error: false,
        error,
    }
}

/// Relaxed subject match: exact CN or any wildcard CN.
fn hostname_matches(host: &str, subject: &str) -> bool {
    if host.is_empty() {
        return true;
    }
    let subject_lower = subject.to_lowercase();
    let cn = format!("cn={}", host.to_lowercase());
    subject_lower.contains(&cn) || subject_lower.contains("cn=*.")
}

/// Aggregate endpoint results into the fusion-facing summary.
pub fn summarize(results: Vec<CertificateCheckResult>) -> TlsCheckSummary {
    let self_signed: Vec<&CertificateCheckResult> =
        results.iter().filter(|r| r.self_signed).collect();
    let invalid_cert_count = results
        .iter()
        .filter(|r| !r.valid && !r.is_network_error)
        .count();
    let https_successful = results
        .iter()
        .filter(|r| r.valid && !r.is_network_error)
        .count();

    let suspicious_endpoints: Vec<String> =
        self_signed.iter().map(|r| r.endpoint.clone()).collect();
    let stripping = StrippingResult {
        stripping_detected: !suspicious_endpoints.is_empty(),
        suspicious_endpoints,
        total_probes: results.len(),
        https_successful,
    };

    let self_signed_count = self_signed.len();
    let threat_detected = self_signed_count > 0;

    let threat_level = if self_signed_count > 0 {
        ThreatLevel::Critical
    } else if stripping.stripping_detected {
        ThreatLevel::High
    } else if invalid_cert_count >= INVALID_CERT_MEDIUM_COUNT {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    };

    if threat_detected {
        warn!(
            "tls check: {} self-signed certificate(s) on known endpoints",
            self_signed_count
        );
    }

    TlsCheckSummary {
        results,
        stripping,
        self_signed_count,
        invalid_cert_count,
        threat_detected,
        threat_level,
        availability: Availability::Available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn leaf(issuer: &str, subject: &str, days_until_expiry: i64) -> LeafCertificate {
        let now = Utc::now();
        LeafCertificate {
            issuer: issuer.to_string(),
            subject: subject.to_string(),
            not_before: now - Duration::days(30),
            not_after: now + Duration::days(days_until_expiry),
        }
    }

    #[test]
    fn test_self_signed_with_valid_dates_is_invalid() {
        let cert = leaf("CN=evil.example", "CN=evil.example", 90);
        let result = validate_leaf("www.google.com", &cert, Utc::now());
        assert!(!result.valid);
        assert!(result.self_signed);
        assert!(!result.expired);
        assert!(!result.is_network_error);
    }

    #[test]
    fn test_expired_ca_cert_is_invalid_but_not_self_signed() {
        let cert = leaf("CN=GTS CA 1C3, O=Google Trust Services", "CN=www.google.com", -5);
        let result = validate_leaf("www.google.com", &cert, Utc::now());
        assert!(!result.valid);
        assert!(result.expired);
        assert!(!result.self_signed);
    }

    #[test]
    fn test_not_yet_valid_counts_as_expired() {
        let now = Utc::now();
        let cert = LeafCertificate {
            issuer: "CN=GTS CA 1C3".to_string(),
            subject: "CN=www.google.com".to_string(),
            not_before: now + Duration::days(1),
            not_after: now + Duration::days(90),
        };
        let result = validate_leaf("www.google.com", &cert, now);
        assert!(result.expired);
        assert!(!result.valid);
    }

    #[test]
    fn test_hostname_mismatch_does_not_invalidate() {
        let cert = leaf("CN=Some CA", "CN=cdn-edge.example", 90);
        let result = validate_leaf("www.google.com", &cert, Utc::now());
        assert!(result.hostname_mismatch);
        assert!(result.valid);
    }

    #[test]
    fn test_wildcard_subject_matches() {
        let cert = leaf("CN=Some CA", "CN=*.google.com", 90);
        let result = validate_leaf("www.google.com", &cert, Utc::now());
        assert!(!result.hostname_mismatch);
    }

    #[test]
    fn test_network_error_excluded_from_invalid_count() {
        let results = vec![
            CertificateCheckResult::network_error("www.google.com", "timeout".to_string()),
            CertificateCheckResult::network_error("www.cloudflare.com", "refused".to_string()),
        ];
        let summary = summarize(results);
        assert_eq!(summary.invalid_cert_count, 0);
        assert_eq!(summary.self_signed_count, 0);
        assert!(!summary.threat_detected);
        assert!(!summary.stripping.stripping_detected);
        assert_eq!(summary.threat_level, ThreatLevel::Low);
    }

    #[test]
    fn test_self_signed_drives_critical() {
        let cert = leaf("CN=mitm", "CN=mitm", 90);
        let results = vec![validate_leaf("www.google.com", &cert, Utc::now())];
        let summary = summarize(results);
        assert_eq!(summary.self_signed_count, 1);
        assert!(summary.threat_detected);
        assert!(summary.stripping.stripping_detected);
        assert_eq!(summary.threat_level, ThreatLevel::Critical);
    }

    #[test]
    fn test_two_invalid_certs_is_medium() {
        let expired_a = validate_leaf("www.google.com", &leaf("CN=A CA", "CN=a", -1), Utc::now());
        let expired_b =
            validate_leaf("www.cloudflare.com", &leaf("CN=B CA", "CN=b", -1), Utc::now());
        let summary = summarize(vec![expired_a, expired_b]);
        assert_eq!(summary.invalid_cert_count, 2);
        assert!(!summary.threat_detected);
        assert_eq!(summary.threat_level, ThreatLevel::Medium);
    }

    // ------------------------------------------------------------------
    // checker-level tests over a scripted fetcher
    // ------------------------------------------------------------------

    struct ScriptedFetcher {
        self_signed_hosts: Vec<String>,
        dead_hosts: Vec<String>,
    }

    #[async_trait::async_trait]
    impl CertificateFetcher for ScriptedFetcher {
        async fn fetch_leaf(
            &self,
            host: &str,
        ) -> Result<LeafCertificate, crate::platform::CertFetchError> {
            if self.dead_hosts.iter().any(|h| h == host) {
                return Err(crate::platform::CertFetchError::Timeout {
                    endpoint: host.to_string(),
                });
            }
            if self.self_signed_hosts.iter().any(|h| h == host) {
                Ok(leaf(&format!("CN={}", host), &format!("CN={}", host), 90))
            } else {
                Ok(leaf("CN=Public CA", &format!("CN={}", host), 90))
            }
        }
    }

    #[tokio::test]
    async fn test_checker_mixes_network_errors_and_findings() {
        let fetcher = ScriptedFetcher {
            self_signed_hosts: vec!["www.google.com".to_string()],
            dead_hosts: vec!["www.cloudflare.com".to_string()],
        };
        let config = TlsConfig::default();
        let summary = TlsChecker::new(&fetcher, &config).check().await;

        assert_eq!(summary.self_signed_count, 1);
        assert_eq!(summary.invalid_cert_count, 1);
        assert!(summary.results[1].is_network_error);
        assert_eq!(summary.threat_level, ThreatLevel::Critical);
    }

    #[tokio::test]
    async fn test_detect_stripping_names_the_endpoint() {
        let fetcher = ScriptedFetcher {
            self_signed_hosts: vec!["www.cloudflare.com".to_string()],
            dead_hosts: Vec::new(),
        };
        let config = TlsConfig::default();
        let stripping = TlsChecker::new(&fetcher, &config).detect_stripping().await;

        assert!(stripping.stripping_detected);
        assert_eq!(stripping.suspicious_endpoints, vec!["www.cloudflare.com"]);
        assert_eq!(stripping.https_successful, 1);
    }

    #[tokio::test]
    async fn test_all_dead_endpoints_stay_clean() {
        let fetcher = ScriptedFetcher {
            self_signed_hosts: Vec::new(),
            dead_hosts: vec!["www.google.com".to_string(), "www.cloudflare.com".to_string()],
        };
        let config = TlsConfig::default();
        let summary = TlsChecker::new(&fetcher, &config).check().await;

        assert!(!summary.threat_detected);
        assert_eq!(summary.threat_level, ThreatLevel::Low);
        assert!(summary.results.iter().all(|r| r.is_network_error));
    }
}
