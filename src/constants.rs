//! Central Configuration Constants
//!
//! Single source of truth for cycle-level defaults. Individual checker
//! thresholds live next to their checkers; only the orchestration-level
//! knobs are here.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Net Guard";

/// Default wall-clock budget for neighbor discovery (seconds).
/// An active /24 sweep at 500ms per host and bounded concurrency fits
/// comfortably inside this.
pub const DEFAULT_DISCOVERY_BUDGET_SECS: u64 = 30;

/// Default budget for gateway analysis: warm-up plus 15 sequential
/// probes plus the routing comparison.
pub const DEFAULT_GATEWAY_BUDGET_SECS: u64 = 45;

/// Default budget for the DNS probe panel.
pub const DEFAULT_DNS_BUDGET_SECS: u64 = 20;

/// Default budget for the certificate panel.
pub const DEFAULT_TLS_BUDGET_SECS: u64 = 30;

// ============================================
// Helper functions to read from env with fallback
// ============================================

fn env_secs(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Discovery budget from environment or default
pub fn get_discovery_budget_secs() -> u64 {
    env_secs("NET_GUARD_DISCOVERY_BUDGET_SECS", DEFAULT_DISCOVERY_BUDGET_SECS)
}

/// Gateway budget from environment or default
pub fn get_gateway_budget_secs() -> u64 {
    env_secs("NET_GUARD_GATEWAY_BUDGET_SECS", DEFAULT_GATEWAY_BUDGET_SECS)
}

/// DNS budget from environment or default
pub fn get_dns_budget_secs() -> u64 {
    env_secs("NET_GUARD_DNS_BUDGET_SECS", DEFAULT_DNS_BUDGET_SECS)
}

/// TLS budget from environment or default
pub fn get_tls_budget_secs() -> u64 {
    env_secs("NET_GUARD_TLS_BUDGET_SECS", DEFAULT_TLS_BUDGET_SECS)
}
