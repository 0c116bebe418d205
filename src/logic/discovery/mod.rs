//! Neighbor Discovery Service
//!
//! Enumerates the devices on the local segment through two strategies
//! behind one capability:
//! - `passive`: read the kernel neighbor table (fast, carries MACs)
//! - `active`: probe the /24 when the table is unavailable (no MACs)
//!
//! The strategy choice is a pure policy function of the passive result's
//! availability, not of its contents: an empty-but-readable table means a
//! quiet network and is accepted as-is.

pub mod active;
pub mod passive;
pub mod types;

pub use types::{
    Device, DeviceSnapshot, DiscoveryConfig, DiscoveryMethod, DiscoveryReport, MacAddr,
};

use log::info;

use crate::logic::availability::Availability;
use crate::platform::{HostProber, LinkInfoSource, NeighborTableSource};

/// Pure fallback policy: active probing only when passive is unavailable.
pub fn select_strategy(passive: Availability) -> DiscoveryMethod {
    match passive {
        Availability::Available => DiscoveryMethod::Passive,
        Availability::Unavailable | Availability::Unknown => DiscoveryMethod::Active,
    }
}

pub struct DiscoveryService<'a> {
    neighbors: &'a dyn NeighborTableSource,
    link: &'a dyn LinkInfoSource,
    prober: &'a dyn HostProber,
    config: &'a DiscoveryConfig,
}

impl<'a> DiscoveryService<'a> {
    pub fn new(
        neighbors: &'a dyn NeighborTableSource,
        link: &'a dyn LinkInfoSource,
        prober: &'a dyn HostProber,
        config: &'a DiscoveryConfig,
    ) -> Self {
        Self {
            neighbors,
            link,
            prober,
            config,
        }
    }

    /// Capture one snapshot of the segment.
    pub async fn discover(&self) -> DiscoveryReport {
        let (passive_devices, passive_availability) = passive::read(self.neighbors);

        match select_strategy(passive_availability) {
            DiscoveryMethod::Passive => {
                info!("discovery: neighbor table, {} devices", passive_devices.len());
                DiscoveryReport {
                    snapshot: DeviceSnapshot::new(passive_devices),
                    availability: Availability::Available,
                    method: DiscoveryMethod::Passive,
                }
            }
            DiscoveryMethod::Active => {
                let devices = active::scan(self.link, self.prober, self.config).await;
                // A scan with no derivable subnet measured nothing at all
                let availability = if self.link.local_subnet().is_some() {
                    Availability::Available
                } else {
                    Availability::Unavailable
                };
                info!("discovery: active scan, {} devices", devices.len());
                DiscoveryReport {
                    snapshot: DeviceSnapshot::new(devices),
                    availability,
                    method: DiscoveryMethod::Active,
                }
            }
        }
    }
}
