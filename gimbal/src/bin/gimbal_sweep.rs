//! Run a sample capture plan on the motorized gimbal.
//!
//! All parameters come from [`RunConfig`]. Set `GIMBAL_SWEEP_CONFIG` to a JSON
//! file to override any of the defaults, for example:
//!
//! ```json
//! { "plan": "horizontal_sweep", "output_dir": "/data/flare/run1", "port": "/dev/ttyUSB0" }
//! ```
//!
//! This binary drives the simulated gimbal and binds no camera, so it is a dry
//! run of the motion sequence and sidecar. Bench setups replace the connector
//! with their controller adapter and bind an image capture with
//! `GimbalSession::with_capture`.
//!
//! Analysis is a separate step: hand the written `config.slconf` to
//! `stray_light::run_analysis` and exit with `AnalysisReport::exit_code`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use gimbal::{GimbalSession, RunConfig, SimulatedGimbal};
use tracing::{info, Level};

/// Environment variable naming an optional JSON run configuration.
const CONFIG_ENV: &str = "GIMBAL_SWEEP_CONFIG";

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Loading run configuration from {}", path.display());
            RunConfig::load(&path)
                .with_context(|| format!("Failed to load run configuration {}", path.display()))?
        }
        None => RunConfig::default(),
    };

    info!("Configuration:");
    info!("  Plan: {:?}", config.plan);
    info!("  Port: {}", config.session.port);
    info!(
        "  Reference: azimuth {} deg, field angle {} deg",
        config.session.reference.azimuth_deg, config.session.reference.field_deg
    );

    let plan = config.plan.build();
    let mut session = GimbalSession::new(SimulatedGimbal::default(), config.session);

    if let Some(summary) = session.run(Some(&plan)).context("Gimbal session failed")? {
        info!(
            "Visited {} positions, captured {} images, wrote {}",
            summary.positions_visited,
            summary.images_captured,
            summary.sidecar_path.display()
        );
    }

    Ok(())
}
