//! Platform Collaborators
//!
//! The detection core never performs raw I/O itself - it consumes a small
//! set of collaborator traits for everything the operating system or the
//! network provides: neighbor-table rows, link configuration, bounded
//! connect attempts, DNS resolution, and TLS leaf certificates.
//!
//! ## Structure
//! - trait seams + error types live here
//! - `neighbor`: `/proc/net/arp` backed table source
//! - `link`: gateway/subnet discovery from route + interface state
//! - `probe`: tokio TCP connect prober with reverse lookup
//! - `resolver`: hickory-resolver backed domain resolver
//! - `cert`: tokio-rustls leaf certificate fetcher

pub mod cert;
pub mod link;
pub mod neighbor;
pub mod probe;
pub mod resolver;

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use cert::RustlsCertificateFetcher;
pub use link::ProcRouteLinkInfo;
pub use neighbor::ProcNeighborTable;
pub use probe::TcpProber;
pub use resolver::HickoryDomainResolver;

// ============================================================================
// ERRORS
// ============================================================================

/// Failure to access a local data source (neighbor table, route table)
#[derive(Debug, Clone)]
pub enum SourceError {
    /// Access denied - normal on hardened systems, NOT a threat
    PermissionDenied { path: String },
    /// Source does not exist on this platform
    NotFound { path: String },
    /// Any other read failure
    Io { path: String, message: String },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::PermissionDenied { path } => {
                write!(f, "permission denied reading {}", path)
            }
            SourceError::NotFound { path } => write!(f, "{} not found", path),
            SourceError::Io { path, message } => write!(f, "error reading {}: {}", path, message),
        }
    }
}

impl std::error::Error for SourceError {}

/// Failure of a single bounded connect attempt
#[derive(Debug, Clone)]
pub enum ProbeError {
    /// No answer within the timeout budget
    Timeout,
    /// Host answered but refused the connection
    Refused { message: String },
    /// Any other socket-level failure
    Io { message: String },
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeError::Timeout => write!(f, "connect timed out"),
            ProbeError::Refused { message } => write!(f, "connection refused: {}", message),
            ProbeError::Io { message } => write!(f, "socket error: {}", message),
        }
    }
}

impl std::error::Error for ProbeError {}

/// Failure of a single DNS probe
#[derive(Debug, Clone)]
pub struct ResolveError {
    pub message: String,
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resolution failed: {}", self.message)
    }
}

impl std::error::Error for ResolveError {}

/// Failure to obtain a leaf certificate from an endpoint
///
/// Every variant is a connection-level problem; none of them is security
/// evidence on its own.
#[derive(Debug, Clone)]
pub enum CertFetchError {
    Timeout { endpoint: String },
    Connect { endpoint: String, message: String },
    Handshake { endpoint: String, message: String },
    /// Peer presented no certificate, or the leaf would not parse
    Malformed { endpoint: String, message: String },
}

impl std::fmt::Display for CertFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertFetchError::Timeout { endpoint } => write!(f, "{}: connect timed out", endpoint),
            CertFetchError::Connect { endpoint, message } => {
                write!(f, "{}: connect failed: {}", endpoint, message)
            }
            CertFetchError::Handshake { endpoint, message } => {
                write!(f, "{}: TLS handshake failed: {}", endpoint, message)
            }
            CertFetchError::Malformed { endpoint, message } => {
                write!(f, "{}: unusable certificate: {}", endpoint, message)
            }
        }
    }
}

impl std::error::Error for CertFetchError {}

// ============================================================================
// SHARED VALUE TYPES
// ============================================================================

/// A /24 prefix derived from the local interface address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetPrefix {
    octets: [u8; 3],
}

impl SubnetPrefix {
    pub fn new(a: u8, b: u8, c: u8) -> Self {
        Self { octets: [a, b, c] }
    }

    /// Derive the /24 prefix containing `addr`
    pub fn of(addr: Ipv4Addr) -> Self {
        let o = addr.octets();
        Self::new(o[0], o[1], o[2])
    }

    /// The host address for the given final octet
    pub fn host(&self, last_octet: u8) -> Ipv4Addr {
        Ipv4Addr::new(self.octets[0], self.octets[1], self.octets[2], last_octet)
    }
}

impl std::fmt::Display for SubnetPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}.0/24", self.octets[0], self.octets[1], self.octets[2])
    }
}

/// Leaf certificate fields as presented by a TLS endpoint
///
/// Only the fields the checker inspects - no chain, no extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafCertificate {
    pub issuer: String,
    pub subject: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Access to the link-layer neighbor cache (IP -> MAC)
pub trait NeighborTableSource: Send + Sync {
    /// Raw fixed-column table text including the header line
    fn read_table(&self) -> Result<String, SourceError>;
}

/// Current link configuration (gateway, local subnet)
pub trait LinkInfoSource: Send + Sync {
    fn gateway_ip(&self) -> Option<Ipv4Addr>;
    fn local_subnet(&self) -> Option<SubnetPrefix>;
}

/// Bounded, scoped connect attempts against arbitrary hosts
///
/// Every call opens, measures, and closes its own socket - nothing
/// persists between probes.
#[async_trait]
pub trait HostProber: Send + Sync {
    /// TCP connect to `addr:port`, returning the handshake duration
    async fn connect(
        &self,
        addr: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> Result<Duration, ProbeError>;

    /// Unprivileged reachability check (a refused connection still proves
    /// the host is up)
    async fn reachable(&self, addr: IpAddr, timeout: Duration) -> bool;

    /// Best-effort reverse hostname lookup; failures yield None
    async fn reverse_lookup(&self, addr: IpAddr) -> Option<String>;
}

/// DNS resolution through the system-configured resolvers
#[async_trait]
pub trait DomainResolver: Send + Sync {
    /// The resolver addresses currently configured on the device
    fn configured_servers(&self) -> Vec<IpAddr>;

    /// Resolve a domain to its addresses
    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveError>;
}

/// Leaf certificate retrieval from an HTTPS endpoint
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    /// Complete a handshake with `host:443` and return the leaf fields
    async fn fetch_leaf(&self, host: &str) -> Result<LeafCertificate, CertFetchError>;
}
