//! Discovery Types
//!
//! Core types for neighbor discovery. No logic - data structures only.

use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::availability::Availability;

// ============================================================================
// MAC ADDRESS
// ============================================================================

/// Link-layer hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// All-zero MACs mark incomplete neighbor entries
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 6]
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut count = 0;
        for part in s.split(':') {
            if count == 6 {
                return Err(format!("too many octets in '{}'", s));
            }
            octets[count] =
                u8::from_str_radix(part, 16).map_err(|_| format!("bad octet in '{}'", s))?;
            count += 1;
        }
        if count != 6 {
            return Err(format!("expected 6 octets in '{}'", s));
        }
        Ok(MacAddr(octets))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// DEVICES
// ============================================================================

/// How a device was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryMethod {
    /// Read from the neighbor table (fast, carries a MAC)
    Passive,
    /// Found by active reachability probing (slower, no MAC)
    Active,
}

impl DiscoveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMethod::Passive => "passive",
            DiscoveryMethod::Active => "active",
        }
    }
}

/// One device on the local segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub ip: IpAddr,
    /// Present only via passive discovery
    pub mac: Option<MacAddr>,
    /// Best-effort reverse lookup
    pub hostname: Option<String>,
    pub method: DiscoveryMethod,
}

/// The devices seen in one cycle; exactly one prior snapshot is retained
/// by the caller across cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub devices: Vec<Device>,
    pub captured_at: DateTime<Utc>,
}

impl DeviceSnapshot {
    pub fn new(devices: Vec<Device>) -> Self {
        Self {
            devices,
            captured_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// MAC observed for a given address, if passive discovery saw one
    pub fn mac_of(&self, ip: IpAddr) -> Option<MacAddr> {
        self.devices.iter().find(|d| d.ip == ip).and_then(|d| d.mac)
    }
}

/// Result of one discovery pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub snapshot: DeviceSnapshot,
    pub availability: Availability,
    pub method: DiscoveryMethod,
}

impl DiscoveryReport {
    pub fn unavailable() -> Self {
        Self {
            snapshot: DeviceSnapshot::empty(),
            availability: Availability::Unavailable,
            method: DiscoveryMethod::Passive,
        }
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Active-probe tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Per-host reachability budget (ms)
    pub host_timeout_ms: u64,
    /// Concurrent in-flight host probes
    pub max_concurrency: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            host_timeout_ms: 500,
            max_concurrency: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_parse_and_display() {
        let mac: MacAddr = "Aa:Bb:Cc:00:11:ff".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:00:11:ff");
    }

    #[test]
    fn test_mac_rejects_malformed() {
        assert!("aa:bb:cc".parse::<MacAddr>().is_err());
        assert!("aa:bb:cc:dd:ee:ff:00".parse::<MacAddr>().is_err());
        assert!("zz:bb:cc:dd:ee:ff".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_zero_mac() {
        let mac: MacAddr = "00:00:00:00:00:00".parse().unwrap();
        assert!(mac.is_zero());
    }

    #[test]
    fn test_snapshot_mac_lookup() {
        let gateway: IpAddr = "192.168.1.1".parse().unwrap();
        let snapshot = DeviceSnapshot::new(vec![Device {
            ip: gateway,
            mac: Some("aa:bb:cc:dd:ee:ff".parse().unwrap()),
            hostname: None,
            method: DiscoveryMethod::Passive,
        }]);
        assert_eq!(
            snapshot.mac_of(gateway).unwrap().to_string(),
            "aa:bb:cc:dd:ee:ff"
        );
        assert!(snapshot.mac_of("192.168.1.2".parse().unwrap()).is_none());
    }
}
