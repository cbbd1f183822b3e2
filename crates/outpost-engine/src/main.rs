//! Demo driver binary for the Outpost decision engine.
//!
//! The decision core exposes exactly one entry point — `run_tick` — and
//! consumes a host-provided `World`. This binary is the thin outer loop
//! that wires the two together against the in-memory reference host:
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `outpost-config.yaml` (optional)
//! 3. Build the starting world
//! 4. Advance the host and run one tick, `max_ticks` times
//! 5. Log the final population

mod error;

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use outpost_agents::roles::RoleRoster;
use outpost_core::config::ControlConfig;
use outpost_core::tick::run_tick;
use outpost_world::{World, create_starting_world};

use crate::error::EngineError;

/// Default configuration file name, looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "outpost-config.yaml";

/// Engine-level settings wrapped around the decision core's thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct EngineConfig {
    /// Number of ticks to simulate.
    #[serde(default = "default_max_ticks")]
    max_ticks: u64,

    /// Real-time delay between ticks, in milliseconds.
    #[serde(default)]
    tick_interval_ms: u64,

    /// Decision-core thresholds.
    #[serde(default)]
    control: ControlConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            tick_interval_ms: 0,
            control: ControlConfig::default(),
        }
    }
}

const fn default_max_ticks() -> u64 {
    200
}

/// Load the engine configuration.
///
/// A missing file is not an error — the defaults run the demo; an
/// unreadable or malformed file is.
fn load_config(path: &Path) -> Result<EngineConfig, EngineError> {
    if !path.exists() {
        info!(path = %path.display(), "No config file; using defaults");
        return Ok(EngineConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(outpost_core::ConfigError::from)?;
    let config: EngineConfig =
        serde_yml::from_str(&contents).map_err(outpost_core::ConfigError::from)?;
    Ok(config)
}

/// Application entry point for the demo driver.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("outpost-engine starting");

    // 2. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
    let config = load_config(Path::new(&config_path))?;
    info!(
        max_ticks = config.max_ticks,
        tick_interval_ms = config.tick_interval_ms,
        production_floor = config.control.production_floor,
        "Configuration loaded"
    );

    // 3. Build the starting world.
    let (mut world, ids) = create_starting_world().map_err(EngineError::from)?;
    info!(zone = %ids.zone, factory = %ids.factory, "Starting world created");

    // 4. The simulation loop.
    let roster = RoleRoster::standard();
    for _ in 0..config.max_ticks {
        world.advance();
        run_tick(&mut world, &roster, &config.control);

        if config.tick_interval_ms > 0 {
            std::thread::sleep(Duration::from_millis(config.tick_interval_ms));
        }
    }

    // 5. Final population report.
    let survivors = world.agents(ids.zone).len();
    let zone = world.zone(ids.zone);
    info!(
        ticks = config.max_ticks,
        agents = survivors,
        energy_available = zone.map_or(0, |z| z.energy_available),
        "Simulation finished"
    );

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let config = load_config(Path::new("does-not-exist.yaml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn nested_control_section_parses() {
        let config: EngineConfig =
            serde_yml::from_str("max_ticks: 10\ncontrol:\n  production_floor: 400\n").unwrap();
        assert_eq!(config.max_ticks, 10);
        assert_eq!(config.control.production_floor, 400);
        assert_eq!(config.control.budget_pct, 80);
    }
}
