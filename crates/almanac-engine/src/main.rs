//! Host binary for the almanac timer engine.
//!
//! Wires the engine to the host: it loads configuration, seeds the clock
//! from the system wall clock in place of a bus time telegram, and polls
//! the engine until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `almanac-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the timer engine
//! 4. Seed it from the system clock (if enabled)
//! 5. Run the poll loop until Ctrl-C
//! 6. Log the final status and snapshot

mod error;
mod host;

use std::path::Path;
use std::time::Duration;

use almanac_core::TimerEngine;
use almanac_core::config::AlmanacConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "almanac-config.yaml";

/// Application entry point for the almanac host.
///
/// # Errors
///
/// Returns an error if configuration loading or the final snapshot fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = Path::new(CONFIG_PATH);
    let config = load_config(config_path)?;

    // 2. Initialize structured logging. RUST_LOG overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("almanac-engine starting");
    if !config_path.exists() {
        info!("Config file not found, using defaults");
    }
    info!(
        longitude = config.location.longitude,
        latitude = config.location.latitude,
        timezone = config.location.timezone,
        tick_interval_ms = config.clock.tick_interval_ms,
        poll_interval_ms = config.host.poll_interval_ms,
        "Configuration loaded"
    );

    // 3. Create the engine.
    let mut engine = TimerEngine::with_system_clock(&config);

    // 4. Seed from the system clock.
    if config.host.seed_from_system_clock {
        let now = chrono::Local::now().fixed_offset();
        engine.apply_date_time(host::system_update(now, config.location.timezone));
        info!(time = %engine.clock(), validity = ?engine.validity(), "Clock seeded from system time");
    } else {
        warn!("System clock seeding disabled, waiting for external updates");
    }

    // 5. Run until interrupted.
    let summary = host::run(
        &mut engine,
        Duration::from_millis(config.host.poll_interval_ms),
        shutdown_signal(),
    )
    .await;

    // 6. Log results.
    engine.log_status();
    let snapshot = serde_json::to_string(&engine.snapshot()).map_err(EngineError::from)?;
    info!(
        ticks = summary.ticks,
        minute_edges = summary.minute_edges,
        holiday_edges = summary.holiday_edges,
        snapshot = %snapshot,
        "almanac-engine shutdown complete"
    );

    Ok(())
}

/// Load the configuration, falling back to defaults when the file does
/// not exist.
fn load_config(path: &Path) -> Result<AlmanacConfig, EngineError> {
    if path.exists() {
        Ok(AlmanacConfig::from_file(path)?)
    } else {
        Ok(AlmanacConfig::default())
    }
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}
