//! Net Guard Core - Main Entry Point
//!
//! Runs one detection cycle against the local network and prints the
//! verdict as JSON. Any long-running transport (RPC, IPC, scheduler) is
//! an external binding layer on top of the library.

use net_guard_core::constants::{APP_NAME, APP_VERSION};
use net_guard_core::{DetectionConfig, DetectionState, Detector};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let detector = Detector::with_defaults(DetectionConfig::default());
    let mut state = DetectionState::new();

    let verdict = detector.run_detection_cycle(&mut state).await;

    match serde_json::to_string_pretty(&verdict) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("could not serialize verdict: {}", e),
    }

    if verdict.network_down {
        log::warn!("Network appears DOWN (score {}) - not an attack", verdict.score);
    } else if verdict.detected {
        log::warn!(
            "THREAT DETECTED: {} (score {}, level {})",
            verdict.detection_type,
            verdict.score,
            verdict.level
        );
    } else {
        log::info!("No threats detected (score {})", verdict.score);
    }
}
