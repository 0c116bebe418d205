//! Detection Cycle Orchestration
//!
//! Runs the four signal sources concurrently, each under its own timeout
//! budget, then hands everything to the fusion engine. A checker that
//! overruns its budget or fails internally degrades to "unable to
//! analyze" - the cycle itself always produces a verdict.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use std::future::Future;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;

use crate::constants;
use crate::logic::discovery::{
    DeviceSnapshot, DiscoveryConfig, DiscoveryReport, DiscoveryService,
};
use crate::logic::dns::{DnsCheckResult, DnsChecker, DnsConfig};
use crate::logic::fusion::{fuse, FusionThresholds, ThreatVerdict};
use crate::logic::gateway::{GatewayAnalyzer, GatewaySignal, GatewayThresholds};
use crate::logic::tls::{TlsCheckSummary, TlsChecker, TlsConfig};
use crate::platform::{
    CertificateFetcher, DomainResolver, HostProber, LinkInfoSource, NeighborTableSource,
};

// ============================================================================
// CONFIG
// ============================================================================

/// Per-checker wall-clock budgets (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerBudgets {
    pub discovery_secs: u64,
    pub gateway_secs: u64,
    pub dns_secs: u64,
    pub tls_secs: u64,
}

impl Default for CheckerBudgets {
    fn default() -> Self {
        Self {
            discovery_secs: constants::get_discovery_budget_secs(),
            gateway_secs: constants::get_gateway_budget_secs(),
            dns_secs: constants::get_dns_budget_secs(),
            tls_secs: constants::get_tls_budget_secs(),
        }
    }
}

/// Full detection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionConfig {
    pub discovery: DiscoveryConfig,
    pub gateway: GatewayThresholds,
    pub dns: DnsConfig,
    pub tls: TlsConfig,
    pub fusion: FusionThresholds,
    pub budgets: CheckerBudgets,
}

// ============================================================================
// STATE
// ============================================================================

/// The only state crossing cycles: the previous device snapshot, owned
/// by the caller and replaced atomically at the end of a successful
/// cycle. A cycle whose discovery was unavailable leaves it untouched,
/// so the next delta is still computed against real data.
#[derive(Debug, Clone, Default)]
pub struct DetectionState {
    previous: Option<DeviceSnapshot>,
}

impl DetectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&DeviceSnapshot> {
        self.previous.as_ref()
    }
}

// ============================================================================
// DETECTOR
// ============================================================================

pub struct Detector {
    neighbors: Arc<dyn NeighborTableSource>,
    link: Arc<dyn LinkInfoSource>,
    prober: Arc<dyn HostProber>,
    resolver: Arc<dyn DomainResolver>,
    certificates: Arc<dyn CertificateFetcher>,
    config: DetectionConfig,
}

impl Detector {
    pub fn new(
        neighbors: Arc<dyn NeighborTableSource>,
        link: Arc<dyn LinkInfoSource>,
        prober: Arc<dyn HostProber>,
        resolver: Arc<dyn DomainResolver>,
        certificates: Arc<dyn CertificateFetcher>,
        config: DetectionConfig,
    ) -> Self {
        Self {
            neighbors,
            link,
            prober,
            resolver,
            certificates,
            config,
        }
    }

    /// Wire up the default platform collaborators.
    pub fn with_defaults(config: DetectionConfig) -> Self {
        Self::new(
            Arc::new(crate::platform::ProcNeighborTable::new()),
            Arc::new(crate::platform::ProcRouteLinkInfo::new()),
            Arc::new(crate::platform::TcpProber::new()),
            Arc::new(crate::platform::HickoryDomainResolver::new()),
            Arc::new(crate::platform::RustlsCertificateFetcher::new()),
            config,
        )
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run one full detection cycle.
    ///
    /// The four signal sources run concurrently and join before fusion;
    /// dropping the returned future cancels every in-flight probe and
    /// discards partial results.
    pub async fn run_detection_cycle(&self, state: &mut DetectionState) -> ThreatVerdict {
        info!("detection cycle started");
        let budgets = &self.config.budgets;
        let gateway_ip = self.link.gateway_ip().map(IpAddr::V4);
        let gateway_analyzer = GatewayAnalyzer::new(self.prober.as_ref(), &self.config.gateway);

        let (discovery, gateway, dns, tls) = tokio::join!(
            guarded(
                Duration::from_secs(budgets.discovery_secs),
                "discovery",
                self.discover(),
                DiscoveryReport::unavailable,
            ),
            guarded(
                Duration::from_secs(budgets.gateway_secs),
                "gateway",
                gateway_analyzer.analyze(gateway_ip),
                GatewaySignal::unavailable,
            ),
            guarded(
                Duration::from_secs(budgets.dns_secs),
                "dns",
                self.check_dns(),
                DnsCheckResult::unavailable,
            ),
            guarded(
                Duration::from_secs(budgets.tls_secs),
                "tls",
                self.check_certificates(),
                TlsCheckSummary::unavailable,
            ),
        );

        if let Some(gateway_ip) = gateway_ip {
            if let Some(mac) = discovery.snapshot.mac_of(gateway_ip) {
                debug!("gateway {} resolves to MAC {}", gateway_ip, mac);
            }
        }

        let verdict = fuse(
            &discovery,
            state.previous(),
            &gateway,
            &dns,
            &tls,
            &self.config.fusion,
        );

        // Replace-on-success: a snapshot the discovery layer actually
        // measured, swapped in whole at cycle end
        if discovery.availability.is_available() {
            state.previous = Some(discovery.snapshot);
        }

        info!(
            "detection cycle finished: score {}, detected {}",
            verdict.score, verdict.detected
        );
        verdict
    }

    /// Discovery only, for lighter-weight callers.
    pub async fn discover(&self) -> DiscoveryReport {
        DiscoveryService::new(
            self.neighbors.as_ref(),
            self.link.as_ref(),
            self.prober.as_ref(),
            &self.config.discovery,
        )
        .discover()
        .await
    }

    /// DNS integrity check only.
    pub async fn check_dns(&self) -> DnsCheckResult {
        DnsChecker::new(self.resolver.as_ref(), &self.config.dns)
            .check()
            .await
    }

    /// Certificate check only.
    pub async fn check_certificates(&self) -> TlsCheckSummary {
        TlsChecker::new(self.certificates.as_ref(), &self.config.tls)
            .check()
            .await
    }
}

/// Bound a checker by its budget and contain anything it throws; either
/// way the checker degrades to its explicit unavailable state and the
/// rest of the cycle proceeds.
async fn guarded<T>(
    budget: Duration,
    name: &str,
    fut: impl Future<Output = T>,
    unavailable: impl FnOnce() -> T,
) -> T {
    match tokio::time::timeout(budget, AssertUnwindSafe(fut).catch_unwind()).await {
        Ok(Ok(value)) => value,
        Ok(Err(_)) => {
            error!("{} checker failed internally - unable to analyze", name);
            unavailable()
        }
        Err(_) => {
            warn!(
                "{} checker exceeded its {}s budget - unable to analyze",
                name,
                budget.as_secs()
            );
            unavailable()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guarded_passes_value_through() {
        let value = guarded(Duration::from_secs(1), "test", async { 7 }, || 0).await;
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_guarded_times_out_to_fallback() {
        let value = guarded(
            Duration::from_millis(10),
            "test",
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                7
            },
            || 0,
        )
        .await;
        assert_eq!(value, 0);
    }

    #[tokio::test]
    async fn test_guarded_contains_panic() {
        let value = guarded(
            Duration::from_secs(1),
            "test",
            async { panic!("checker exploded") },
            || 0,
        )
        .await;
        assert_eq!(value, 0);
    }
}
