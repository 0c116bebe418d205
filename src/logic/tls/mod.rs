//! Certificate / TLS Security Checker
//!
//! ## Structure
//! - `types`: per-endpoint and aggregate result records, endpoint panel
//! - `checker`: leaf validation rules + stripping heuristic

pub mod checker;
pub mod types;

pub use checker::{summarize, validate_leaf, TlsChecker};
pub use types::{CertificateCheckResult, StrippingResult, TlsCheckSummary, TlsConfig};
