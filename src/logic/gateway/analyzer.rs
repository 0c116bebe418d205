//! Gateway Latency Analyzer
//!
//! Measures round-trip latency to the default gateway with bounded TCP
//! connects (ICMP is unavailable without privileges) and characterizes it
//! statistically. Probes run strictly sequentially - concurrent probes
//! would distort the latency being measured.

use std::net::IpAddr;
use std::time::Duration;

use log::{debug, warn};

use crate::logic::availability::Availability;
use crate::platform::HostProber;

use super::types::{
    GatewayProfile, GatewaySignal, GatewayThresholds, MEASUREMENT_PROBES, MIN_FILTERED_SAMPLES,
    OUTLIER_SIGMA, WARMUP_AWAKE_MS, WARMUP_MAX_PROBES,
};

const PRIMARY_PORT: u16 = 80;
const FALLBACK_PORT: u16 = 443;

pub struct GatewayAnalyzer<'a> {
    prober: &'a dyn HostProber,
    thresholds: &'a GatewayThresholds,
}

impl<'a> GatewayAnalyzer<'a> {
    pub fn new(prober: &'a dyn HostProber, thresholds: &'a GatewayThresholds) -> Self {
        Self { prober, thresholds }
    }

    /// Analyze the gateway. No gateway address means the signal is
    /// unavailable, never a threat.
    pub async fn analyze(&self, gateway_ip: Option<IpAddr>) -> GatewaySignal {
        let gateway_ip = match gateway_ip {
            Some(ip) => ip,
            None => {
                warn!("no gateway address - latency analysis unavailable");
                return GatewaySignal::unavailable();
            }
        };

        self.warm_up(gateway_ip).await;

        let mut samples = Vec::with_capacity(MEASUREMENT_PROBES as usize);
        for probe in 1..=MEASUREMENT_PROBES {
            match self.probe_once(gateway_ip).await {
                Some(ms) => {
                    debug!("gateway probe {}: {:.1}ms", probe, ms);
                    samples.push(ms);
                }
                None => debug!("gateway probe {}: failed", probe),
            }
        }

        let profile = profile_from_samples(
            gateway_ip,
            &samples,
            MEASUREMENT_PROBES as usize,
            self.thresholds,
        );

        let routing_anomaly = if profile.unreachable {
            false
        } else {
            self.detect_routing_anomaly(gateway_ip).await
        };

        GatewaySignal {
            availability: Availability::Available,
            profile: Some(profile),
            routing_anomaly,
        }
    }

    /// Up to five throwaway probes to wake a radio in power-save mode;
    /// stop as soon as one completes quickly. Samples are discarded.
    async fn warm_up(&self, gateway_ip: IpAddr) {
        for attempt in 1..=WARMUP_MAX_PROBES {
            match self.probe_once(gateway_ip).await {
                Some(ms) if ms < WARMUP_AWAKE_MS => {
                    debug!("gateway warm-up done after {} probe(s)", attempt);
                    return;
                }
                _ => {}
            }
        }
        debug!("gateway may still be in power-save mode, continuing");
    }

    /// One connect-based latency sample: port 80, falling back to 443.
    async fn probe_once(&self, gateway_ip: IpAddr) -> Option<f64> {
        let timeout = Duration::from_millis(self.thresholds.probe_timeout_ms);
        for port in [PRIMARY_PORT, FALLBACK_PORT] {
            if let Ok(elapsed) = self.prober.connect(gateway_ip, port, timeout).await {
                return Some(elapsed.as_secs_f64() * 1000.0);
            }
        }
        None
    }

    /// The first hop should be faster than a multi-hop destination; a
    /// gateway slower than 0.8x the external reference suggests the
    /// "gateway" is forwarding through an extra machine.
    async fn detect_routing_anomaly(&self, gateway_ip: IpAddr) -> bool {
        let reference: IpAddr = match self.thresholds.external_reference_host.parse() {
            Ok(ip) => ip,
            Err(_) => return false,
        };

        let gateway_ms = match self.probe_once(gateway_ip).await {
            Some(ms) => ms,
            None => return false,
        };
        let external_ms = match self.probe_once(reference).await {
            Some(ms) => ms,
            None => return false,
        };

        if gateway_ms > external_ms * self.thresholds.routing_anomaly_ratio {
            warn!(
                "routing anomaly: gateway {:.1}ms vs external {:.1}ms",
                gateway_ms, external_ms
            );
            return true;
        }
        false
    }
}

// ============================================================================
// STATISTICS (pure)
// ============================================================================

/// Build the statistical profile from the sequential samples.
pub fn profile_from_samples(
    gateway_ip: IpAddr,
    samples: &[f64],
    attempted: usize,
    thresholds: &GatewayThresholds,
) -> GatewayProfile {
    if samples.is_empty() {
        warn!("all gateway probes failed - gateway unreachable");
        return GatewayProfile::unreachable(gateway_ip);
    }

    let success_rate = samples.len() as f64 / attempted as f64;
    let partial_failure = success_rate < thresholds.partial_failure_rate;

    let filtered = if samples.len() >= MIN_FILTERED_SAMPLES {
        let kept = filter_outliers(samples);
        if kept.len() < samples.len() {
            debug!("filtered {} latency outlier(s)", samples.len() - kept.len());
        }
        if kept.len() >= MIN_FILTERED_SAMPLES {
            kept
        } else {
            samples.to_vec()
        }
    } else {
        samples.to_vec()
    };

    let avg = mean(&filtered);
    let std_dev = std_deviation(&filtered, avg);
    let min = filtered.iter().copied().fold(f64::INFINITY, f64::min);
    let max = filtered.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let high_latency = avg > thresholds.high_latency_ms;
    let suspicious_latency = !high_latency && avg > thresholds.suspicious_latency_ms;
    let high_variance = std_dev > thresholds.std_dev_ms;

    debug!(
        "gateway profile: avg {:.1}ms, stddev {:.1}ms, rate {:.2}",
        avg, std_dev, success_rate
    );

    GatewayProfile {
        gateway_ip,
        avg_latency_ms: avg,
        min_latency_ms: min,
        max_latency_ms: max,
        std_dev_ms: std_dev,
        success_rate,
        unreachable: false,
        partial_failure,
        suspicious_latency,
        high_latency,
        high_variance,
    }
}

/// Drop samples beyond `OUTLIER_SIGMA` standard deviations from the raw
/// mean. Idempotent: a set with no outliers comes back unchanged.
pub fn filter_outliers(samples: &[f64]) -> Vec<f64> {
    let raw_mean = mean(samples);
    let raw_std = std_deviation(samples, raw_mean);
    samples
        .iter()
        .copied()
        .filter(|value| (value - raw_mean).abs() <= OUTLIER_SIGMA * raw_std)
        .collect()
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

fn std_deviation(samples: &[f64], mean: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let variance =
        samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::gateway::types::MEASUREMENT_PROBES;

    fn gw() -> IpAddr {
        "192.168.1.1".parse().unwrap()
    }

    fn thresholds() -> GatewayThresholds {
        GatewayThresholds::default()
    }

    #[test]
    fn test_all_failures_is_unreachable() {
        let profile = profile_from_samples(gw(), &[], MEASUREMENT_PROBES as usize, &thresholds());
        assert!(profile.unreachable);
        assert_eq!(profile.avg_latency_ms, 0.0);
        assert!(!profile.partial_failure);
    }

    #[test]
    fn test_partial_failure_band() {
        // 7/15 = 0.47, strictly between 0 and 0.8
        let samples = vec![20.0; 7];
        let profile =
            profile_from_samples(gw(), &samples, MEASUREMENT_PROBES as usize, &thresholds());
        assert!(profile.partial_failure);
        assert!(!profile.unreachable);
        assert!((profile.avg_latency_ms - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_clean_profile_has_no_flags() {
        let samples = vec![18.0, 20.0, 22.0, 19.0, 21.0, 20.0, 18.5, 21.5, 20.0, 19.0,
                           20.5, 21.0, 19.5, 20.0, 20.5];
        let profile =
            profile_from_samples(gw(), &samples, MEASUREMENT_PROBES as usize, &thresholds());
        assert!(!profile.partial_failure);
        assert!(!profile.suspicious_latency);
        assert!(!profile.high_latency);
        assert!(!profile.high_variance);
    }

    #[test]
    fn test_latency_flags_are_mutually_exclusive() {
        let suspicious = vec![120.0; 15];
        let profile =
            profile_from_samples(gw(), &suspicious, MEASUREMENT_PROBES as usize, &thresholds());
        assert!(profile.suspicious_latency);
        assert!(!profile.high_latency);

        let high = vec![180.0; 15];
        let profile =
            profile_from_samples(gw(), &high, MEASUREMENT_PROBES as usize, &thresholds());
        assert!(profile.high_latency);
        assert!(!profile.suspicious_latency);
    }

    #[test]
    fn test_high_variance_flag() {
        let samples = vec![10.0, 90.0, 10.0, 95.0, 12.0, 88.0, 11.0, 92.0, 10.0, 90.0,
                           11.0, 93.0, 12.0, 89.0, 10.0];
        let profile =
            profile_from_samples(gw(), &samples, MEASUREMENT_PROBES as usize, &thresholds());
        assert!(profile.high_variance);
    }

    #[test]
    fn test_outlier_filter_drops_spike() {
        let mut samples = vec![20.0; 14];
        samples.push(500.0);
        let kept = filter_outliers(&samples);
        assert_eq!(kept.len(), 14);
        assert!(kept.iter().all(|&v| v == 20.0));
    }

    #[test]
    fn test_outlier_filter_is_idempotent() {
        let samples = vec![15.0, 18.0, 20.0, 22.0, 25.0, 19.0, 21.0];
        let once = filter_outliers(&samples);
        let twice = filter_outliers(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_keeps_uniform_samples() {
        let samples = vec![30.0; 15];
        assert_eq!(filter_outliers(&samples), samples);
    }

    #[test]
    fn test_small_sample_sets_skip_filtering() {
        // Below MIN_FILTERED_SAMPLES the raw set is used as-is
        let samples = vec![10.0, 400.0];
        let profile = profile_from_samples(gw(), &samples, 15, &thresholds());
        assert!((profile.avg_latency_ms - 205.0).abs() < 1e-9);
        assert!(profile.partial_failure);
    }
}
