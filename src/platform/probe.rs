//! TCP Connect Prober
//!
//! Connection-based latency and reachability probes. ICMP is generally
//! unavailable to unprivileged callers, so every measurement is a bounded
//! TCP handshake that is opened, timed, and closed in one scope.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use log::debug;
use tokio::net::TcpStream;

use super::{HostProber, ProbeError};

/// Ports tried when only liveness matters, not latency
const REACHABILITY_PORTS: [u16; 2] = [80, 443];

pub struct TcpProber {
    ptr_resolver: TokioResolver,
}

impl TcpProber {
    pub fn new() -> Self {
        // System resolver preferred so reverse lookups can see local names;
        // fall back to a public configuration when it cannot be read.
        let ptr_resolver = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(e) => {
                debug!("system resolver unavailable for PTR lookups: {}", e);
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .build()
            }
        };
        Self { ptr_resolver }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostProber for TcpProber {
    async fn connect(
        &self,
        addr: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> Result<Duration, ProbeError> {
        let target = SocketAddr::new(addr, port);
        let start = Instant::now();
        match tokio::time::timeout(timeout, TcpStream::connect(target)).await {
            Ok(Ok(_stream)) => Ok(start.elapsed()),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => Err(ProbeError::Refused {
                message: e.to_string(),
            }),
            Ok(Err(e)) => Err(ProbeError::Io {
                message: e.to_string(),
            }),
            Err(_) => Err(ProbeError::Timeout),
        }
    }

    async fn reachable(&self, addr: IpAddr, timeout: Duration) -> bool {
        // A refused connection is still an answer from the host
        let per_port = timeout / REACHABILITY_PORTS.len() as u32;
        for port in REACHABILITY_PORTS {
            match self.connect(addr, port, per_port).await {
                Ok(_) | Err(ProbeError::Refused { .. }) => return true,
                Err(_) => continue,
            }
        }
        false
    }

    async fn reverse_lookup(&self, addr: IpAddr) -> Option<String> {
        let lookup = self.ptr_resolver.reverse_lookup(addr).await.ok()?;
        lookup
            .iter()
            .next()
            .map(|name| name.to_string().trim_end_matches('.').to_string())
    }
}
