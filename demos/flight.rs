//! Flight Demo
//!
//! Logs a short flight-controller session, runs two limit checks, then prints
//! the safety report and the full JSON export.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example flight
//!
//! # Use limits and logger settings from a file
//! cargo run --example flight -- --config aegis.toml
//!
//! # Show the consumer's diagnostic lines
//! RUST_LOG=debug cargo run --example flight
//! ```

use std::sync::Arc;
use std::time::Duration;

use aegis::prelude::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = match args.iter().position(|a| a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .ok_or_else(|| anyhow::anyhow!("--config needs a path"))?;
            AegisConfig::load(path)?
        }
        None => AegisConfig::default(),
    };

    let logger = Arc::new(EventLogger::with_config(config.logger.clone())?);
    let monitor = SafetyMonitor::new(Arc::clone(&logger));

    logger.log(EventDraft::new(
        Category::Audit,
        "flight_controller",
        Severity::Info,
        "System started",
    ))?;

    logger.log(
        EventDraft::new(
            Category::SensorError,
            "sensor_fusion",
            Severity::Warn,
            "IMU calibration drift detected",
        )
        .with_metadata("drift_value", 0.05)
        .with_metadata("threshold", 0.03),
    )?;

    let envelope = config.envelope;
    if !monitor.check_altitude_limit(150.0, envelope.max_altitude) {
        tracing::warn!("altitude check failed");
    }
    if !monitor.check_velocity_limit(25.0, envelope.max_velocity) {
        tracing::warn!("velocity check failed");
    }

    logger.flush(Duration::from_secs(5))?;

    println!("{}", monitor.generate_safety_report());
    println!("Exported events:");
    println!("{}", logger.export_json()?);

    let stats = logger.stats();
    tracing::info!(
        accepted = stats.accepted,
        stored = stats.stored,
        dropped = stats.dropped,
        "logger statistics"
    );

    logger.shutdown()?;
    Ok(())
}
