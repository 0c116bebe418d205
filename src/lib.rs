//! Net Guard Core
//!
//! Detects Man-in-the-Middle interception on the local segment using
//! only unprivileged, device-local observations: neighbor discovery,
//! gateway latency statistics, DNS resolution integrity, and TLS leaf
//! certificate inspection, fused into one scored verdict.
//!
//! ```ignore
//! use net_guard_core::{DetectionConfig, DetectionState, Detector};
//!
//! let detector = Detector::with_defaults(DetectionConfig::default());
//! let mut state = DetectionState::new();
//! let verdict = detector.run_detection_cycle(&mut state).await;
//! if verdict.detected {
//!     println!("{:?}: {}", verdict.detection_type, verdict.reasons.join("; "));
//! }
//! ```

pub mod constants;
pub mod logic;
pub mod platform;

pub use logic::availability::Availability;
pub use logic::detector::{CheckerBudgets, DetectionConfig, DetectionState, Detector};
pub use logic::discovery::{Device, DeviceSnapshot, DiscoveryMethod, DiscoveryReport, MacAddr};
pub use logic::dns::{DnsCheckResult, DnsConfig};
pub use logic::fusion::{DetectionType, FusionThresholds, ThreatVerdict};
pub use logic::gateway::{GatewayProfile, GatewaySignal, GatewayThresholds};
pub use logic::severity::ThreatLevel;
pub use logic::tls::{CertificateCheckResult, TlsCheckSummary, TlsConfig};
