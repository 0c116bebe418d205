//! Active Probe
//!
//! Fallback discovery for platforms where the neighbor table is locked
//! down: fan out reachability checks across all 254 host addresses of the
//! locally derived /24. Probes are independent, bounded by a semaphore,
//! and individually time-limited; a host that fails to answer simply does
//! not appear in the result.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use tokio::sync::Semaphore;

use crate::platform::{HostProber, LinkInfoSource};

use super::types::{Device, DiscoveryConfig, DiscoveryMethod};

/// Probe the local /24 and return the reachable devices, deduplicated by
/// IP and ordered by address. No usable subnet yields an empty list.
pub async fn scan(
    link: &dyn LinkInfoSource,
    prober: &dyn HostProber,
    config: &DiscoveryConfig,
) -> Vec<Device> {
    let subnet = match link.local_subnet() {
        Some(subnet) => subnet,
        None => {
            warn!("no usable subnet - skipping active scan");
            return Vec::new();
        }
    };

    debug!("active scan of {}", subnet);
    let host_timeout = Duration::from_millis(config.host_timeout_ms);
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency));

    let mut probes = FuturesUnordered::new();
    for last_octet in 1..=254u8 {
        let ip = IpAddr::V4(subnet.host(last_octet));
        let semaphore = Arc::clone(&semaphore);
        probes.push(async move {
            let _permit = semaphore.acquire().await.ok()?;
            if !prober.reachable(ip, host_timeout).await {
                return None;
            }
            // Lookup failure is ignored, not propagated
            let hostname = prober.reverse_lookup(ip).await;
            Some(Device {
                ip,
                mac: None,
                hostname,
                method: DiscoveryMethod::Active,
            })
        });
    }

    let mut by_ip: BTreeMap<IpAddr, Device> = BTreeMap::new();
    while let Some(result) = probes.next().await {
        if let Some(device) = result {
            by_ip.entry(device.ip).or_insert(device);
        }
    }

    debug!("active scan found {} devices", by_ip.len());
    by_ip.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ProbeError, SubnetPrefix};
    use async_trait::async_trait;
    use std::collections::HashSet;

    struct FixedLink(Option<SubnetPrefix>);
    impl LinkInfoSource for FixedLink {
        fn gateway_ip(&self) -> Option<std::net::Ipv4Addr> {
            None
        }
        fn local_subnet(&self) -> Option<SubnetPrefix> {
            self.0
        }
    }

    struct FixedHosts {
        up: HashSet<IpAddr>,
    }

    #[async_trait]
    impl HostProber for FixedHosts {
        async fn connect(
            &self,
            _addr: IpAddr,
            _port: u16,
            _timeout: Duration,
        ) -> Result<Duration, ProbeError> {
            Err(ProbeError::Timeout)
        }
        async fn reachable(&self, addr: IpAddr, _timeout: Duration) -> bool {
            self.up.contains(&addr)
        }
        async fn reverse_lookup(&self, addr: IpAddr) -> Option<String> {
            if addr == "10.0.0.1".parse::<IpAddr>().unwrap() {
                Some("router.lan".to_string())
            } else {
                None
            }
        }
    }

    #[tokio::test]
    async fn test_finds_reachable_hosts_in_order() {
        let link = FixedLink(Some(SubnetPrefix::new(10, 0, 0)));
        let up: HashSet<IpAddr> = ["10.0.0.7", "10.0.0.1", "10.0.0.200"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let prober = FixedHosts { up };

        let devices = scan(&link, &prober, &DiscoveryConfig::default()).await;
        let ips: Vec<String> = devices.iter().map(|d| d.ip.to_string()).collect();
        assert_eq!(ips, vec!["10.0.0.1", "10.0.0.7", "10.0.0.200"]);
        assert_eq!(devices[0].hostname.as_deref(), Some("router.lan"));
        assert!(devices.iter().all(|d| d.mac.is_none()));
        assert!(devices.iter().all(|d| d.method == DiscoveryMethod::Active));
    }

    #[tokio::test]
    async fn test_no_subnet_yields_empty() {
        let link = FixedLink(None);
        let prober = FixedHosts { up: HashSet::new() };
        let devices = scan(&link, &prober, &DiscoveryConfig::default()).await;
        assert!(devices.is_empty());
    }
}
