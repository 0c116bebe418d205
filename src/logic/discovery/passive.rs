//! Passive Table Reader
//!
//! Parses the kernel neighbor table into devices. The table is
//! fixed-column: IP address, HW type, flags, HW address, mask, device.
//! Rows with an all-zero MAC are incomplete entries and dropped.

use std::net::IpAddr;

use log::{debug, warn};

use crate::logic::availability::Availability;
use crate::platform::NeighborTableSource;

use super::types::{Device, DiscoveryMethod, MacAddr};

/// Read and parse the neighbor table.
///
/// Any access failure yields an empty device list tagged `Unavailable` -
/// explicitly not a threat signal. An empty-but-readable table is a quiet
/// network and comes back `Available`.
pub fn read(source: &dyn NeighborTableSource) -> (Vec<Device>, Availability) {
    match source.read_table() {
        Ok(text) => {
            let devices = parse_neighbor_table(&text);
            debug!("neighbor table: {} usable entries", devices.len());
            (devices, Availability::Available)
        }
        Err(e) => {
            warn!("neighbor table unavailable: {}", e);
            (Vec::new(), Availability::Unavailable)
        }
    }
}

/// Parse the fixed-column table text, header line included.
pub fn parse_neighbor_table(text: &str) -> Vec<Device> {
    text.lines().skip(1).filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<Device> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return None;
    }

    let ip: IpAddr = fields[0].parse().ok()?;
    let mac: MacAddr = fields[3].parse().ok()?;
    if mac.is_zero() {
        return None;
    }

    Some(Device {
        ip,
        mac: Some(mac),
        hostname: None,
        method: DiscoveryMethod::Passive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        wlan0
192.168.1.23     0x1         0x2         11:22:33:44:55:66     *        wlan0
192.168.1.99     0x1         0x0         00:00:00:00:00:00     *        wlan0
";

    #[test]
    fn test_parses_complete_rows() {
        let devices = parse_neighbor_table(TABLE);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].ip, "192.168.1.1".parse::<IpAddr>().unwrap());
        assert_eq!(devices[0].mac.unwrap().to_string(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(devices[0].method, DiscoveryMethod::Passive);
    }

    #[test]
    fn test_drops_zero_mac_rows() {
        let devices = parse_neighbor_table(TABLE);
        assert!(devices.iter().all(|d| !d.mac.unwrap().is_zero()));
    }

    #[test]
    fn test_skips_header_and_short_rows() {
        let devices = parse_neighbor_table("IP address HW type\ngarbage row\n");
        assert!(devices.is_empty());
    }

    #[test]
    fn test_empty_table_is_available() {
        struct Empty;
        impl NeighborTableSource for Empty {
            fn read_table(&self) -> Result<String, crate::platform::SourceError> {
                Ok("IP address       HW type     Flags       HW address            Mask     Device\n".to_string())
            }
        }
        let (devices, availability) = read(&Empty);
        assert!(devices.is_empty());
        assert_eq!(availability, Availability::Available);
    }

    #[test]
    fn test_denied_table_is_unavailable() {
        struct Denied;
        impl NeighborTableSource for Denied {
            fn read_table(&self) -> Result<String, crate::platform::SourceError> {
                Err(crate::platform::SourceError::PermissionDenied {
                    path: "/proc/net/arp".to_string(),
                })
            }
        }
        let (devices, availability) = read(&Denied);
        assert!(devices.is_empty());
        assert_eq!(availability, Availability::Unavailable);
    }
}
