//! Engine binary for the Snow Globe simulation.
//!
//! This is the main entry point that wires together configuration, the
//! item catalog, the demo world and the tick loop, then runs the
//! simulation until the tick limit is reached or it is interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `snowglobe-config.yaml` (or the path given
//!    as the first argument)
//! 2. Initialize structured logging (tracing)
//! 3. Load the item catalog
//! 4. Build the grid and simulation state
//! 5. Spawn plants and characters and register them for commands
//! 6. Send every character off to a random cell
//! 7. Run the simulation loop
//! 8. Log the result and each character's final status

mod error;
mod spawner;
mod tick_logger;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use snowglobe_core::config::LoggingConfig;
use snowglobe_core::{
    CommandDispatcher, CommandRequest, ConfigError, ItemCatalog, RunControl, SimulationConfig,
    SimulationState, runner,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::spawner::SpawnerConfig;
use crate::tick_logger::TickLogger;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "snowglobe-config.yaml";

/// Ticks between full status reports.
const REPORT_EVERY_TICKS: u64 = 50;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let (config, spawner_config) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        tick_seconds = config.world.tick_seconds,
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = config.world.max_ticks,
        "snowglobe-engine starting"
    );

    // 3. Load the item catalog.
    let catalog = load_catalog(&config.catalog.directory)?;

    // 4. Build the grid and simulation state.
    let grid = spawner::build_grid(&config.world, &spawner_config)?;
    let mut state = SimulationState::new(&config, grid, catalog)?;

    // 5. Populate the world.
    let mut dispatcher = CommandDispatcher::new();
    let spawned = spawner::spawn_demo_world(&spawner_config, &mut state, &mut dispatcher)?;

    // 6. Set everyone walking.
    let mut call_id: u64 = 0;
    for (instance, _) in &spawned.characters {
        call_id = call_id.saturating_add(1);
        let request = CommandRequest {
            call_id,
            instance_id: instance.clone(),
            method: String::from("move_to_random"),
            args: Vec::new(),
        };
        let response = dispatcher.dispatch(&mut state, &request);
        if response.success {
            info!(character = %instance, target = ?response.value, "Wandering");
        } else {
            warn!(character = %instance, error = ?response.error, "Could not start wandering");
        }
    }

    // 7. Run the simulation.
    let control = Arc::new(RunControl::from_config(&config.world));
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current tick");
                control.request_stop();
            }
        });
    }

    let mut logger = TickLogger::new(REPORT_EVERY_TICKS);
    let result = runner::run_simulation(&mut state, &control, &mut logger).await?;

    // 8. Log results.
    runner::log_simulation_end(&result);
    let totals = logger.totals();
    info!(
        plant_deaths = totals.plant_deaths,
        remains = totals.remains,
        fruit_dropped = totals.fruit_dropped,
        arrivals = totals.arrivals,
        callbacks = totals.callbacks,
        "Run totals"
    );

    for (instance, _) in &spawned.characters {
        call_id = call_id.saturating_add(1);
        let request = CommandRequest {
            call_id,
            instance_id: instance.clone(),
            method: String::from("get_status"),
            args: Vec::new(),
        };
        let status = dispatcher
            .dispatch(&mut state, &request)
            .value
            .unwrap_or(Value::Null);
        info!(character = %instance, status = %status, "Final status");
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "snowglobe-engine shutdown complete"
    );
    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level; an unparseable
/// level falls back to `info`.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Load the simulation configuration and the `demo` section.
///
/// A missing file means defaults for both.
fn load_config(path: &Path) -> Result<(SimulationConfig, SpawnerConfig), EngineError> {
    if !path.exists() {
        return Ok((SimulationConfig::default(), SpawnerConfig::default()));
    }
    let contents = std::fs::read_to_string(path).map_err(ConfigError::from)?;
    let config = SimulationConfig::parse(&contents)?;

    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(ConfigError::from)?;
    let spawner_config = match raw.get("demo") {
        Some(demo) => serde_yml::from_value(demo.clone()).map_err(ConfigError::from)?,
        None => SpawnerConfig::default(),
    };
    Ok((config, spawner_config))
}

/// Load every item definition in `dir`. A missing directory yields an
/// empty catalog.
fn load_catalog(dir: &Path) -> Result<ItemCatalog, EngineError> {
    if !dir.is_dir() {
        warn!(directory = %dir.display(), "Catalog directory not found, starting with no items");
        return Ok(ItemCatalog::new());
    }
    let catalog = ItemCatalog::load_dir(dir)?;
    info!(directory = %dir.display(), items = catalog.len(), "Item catalog loaded");
    Ok(catalog)
}
