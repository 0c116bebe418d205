//! Link Info Source
//!
//! Unprivileged gateway and subnet discovery: the default route comes
//! from `/proc/net/route`, the local /24 from the address a connected UDP
//! socket reports. Neither requires elevation or packet capture.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::path::PathBuf;

use log::debug;

use super::{LinkInfoSource, SubnetPrefix};

const ROUTE_TABLE_PATH: &str = "/proc/net/route";

/// Address only used to pick an outbound interface; no packet is sent.
const INTERFACE_PROBE_ADDR: &str = "8.8.8.8:80";

pub struct ProcRouteLinkInfo {
    route_path: PathBuf,
}

impl ProcRouteLinkInfo {
    pub fn new() -> Self {
        Self {
            route_path: PathBuf::from(ROUTE_TABLE_PATH),
        }
    }

    pub fn with_route_path(path: impl Into<PathBuf>) -> Self {
        Self {
            route_path: path.into(),
        }
    }

    fn local_ip(&self) -> Option<Ipv4Addr> {
        let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
        socket.connect(INTERFACE_PROBE_ADDR).ok()?;
        match socket.local_addr().ok()?.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        }
    }
}

impl Default for ProcRouteLinkInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkInfoSource for ProcRouteLinkInfo {
    fn gateway_ip(&self) -> Option<Ipv4Addr> {
        let table = std::fs::read_to_string(&self.route_path).ok()?;
        let gateway = parse_default_gateway(&table);
        if gateway.is_none() {
            debug!("no default route found in {}", self.route_path.display());
        }
        gateway
    }

    fn local_subnet(&self) -> Option<SubnetPrefix> {
        self.local_ip().map(SubnetPrefix::of)
    }
}

/// Parse the default-route gateway out of `/proc/net/route`.
///
/// Columns: Iface Destination Gateway Flags ... - destination and gateway
/// are little-endian hex words; the default route has destination 0.
fn parse_default_gateway(table: &str) -> Option<Ipv4Addr> {
    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }
        if fields[1] != "00000000" {
            continue;
        }
        let raw = match u32::from_str_radix(fields[2], 16) {
            Ok(value) => value,
            Err(_) => continue,
        };
        let octets = raw.to_le_bytes();
        let gateway = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
        if !gateway.is_unspecified() {
            return Some(gateway);
        }
    }
    None
}
