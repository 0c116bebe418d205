//! Domain Resolver
//!
//! Wraps hickory-resolver over the system configuration. The configured
//! server list is read from `/etc/resolv.conf` so the DNS checker can
//! evaluate resolver trust without privileged interface queries.

use std::net::IpAddr;
use std::path::PathBuf;

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use log::{debug, warn};

use super::{DomainResolver, ResolveError};

const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

pub struct HickoryDomainResolver {
    resolver: TokioResolver,
    resolv_conf: PathBuf,
}

impl HickoryDomainResolver {
    pub fn new() -> Self {
        let resolver = match TokioResolver::builder_tokio() {
            Ok(builder) => builder.build(),
            Err(e) => {
                warn!("system resolver configuration unreadable ({}), using defaults", e);
                TokioResolver::builder_with_config(
                    ResolverConfig::default(),
                    TokioConnectionProvider::default(),
                )
                .build()
            }
        };
        Self {
            resolver,
            resolv_conf: PathBuf::from(RESOLV_CONF_PATH),
        }
    }

    pub fn with_resolv_conf(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolv_conf = path.into();
        self
    }
}

impl Default for HickoryDomainResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract `nameserver` entries from resolv.conf text
fn parse_nameservers(text: &str) -> Vec<IpAddr> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix("nameserver")?;
            rest.trim().parse::<IpAddr>().ok()
        })
        .collect()
}

#[async_trait]
impl DomainResolver for HickoryDomainResolver {
    fn configured_servers(&self) -> Vec<IpAddr> {
        match std::fs::read_to_string(&self.resolv_conf) {
            Ok(text) => parse_nameservers(&text),
            Err(e) => {
                debug!("could not read {}: {}", self.resolv_conf.display(), e);
                Vec::new()
            }
        }
    }

    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>, ResolveError> {
        match self.resolver.lookup_ip(domain).await {
            Ok(lookup) => Ok(lookup.iter().collect()),
            Err(e) => Err(ResolveError {
                message: e.to_string(),
            }),
        }
    }
}
