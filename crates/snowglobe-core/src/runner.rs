//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`run_tick`] at the configured wall-clock
//! interval until the tick limit is reached or a stop is requested through
//! [`RunControl`]. Pausing is honoured between ticks.
//!
//! [`run_tick`]: crate::tick::run_tick

use tracing::{info, warn};

use crate::operator::{RunControl, SimulationEndReason};
use crate::state::SimulationState;
use crate::tick::{self, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A tick callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub async fn run_simulation(
    state: &mut SimulationState,
    control: &RunControl,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks = control.max_ticks(),
        tick_interval_ms = control.tick_interval_ms(),
        characters = state.characters.len(),
        plants = state.world.plant_count(),
        "Simulation starting"
    );

    loop {
        if control.is_paused() {
            info!("Simulation paused, waiting for resume...");
            control.wait_if_paused().await;
            info!("Simulation resumed");
        }

        if control.is_stop_requested() {
            info!("Stop requested");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::Stopped,
                final_summary: last_summary,
                total_ticks,
            });
        }

        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, state);

        if control.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = control.max_ticks(),
                "Tick limit reached"
            );
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log how the run ended.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            elapsed_seconds = summary.elapsed_seconds,
            plants_alive = summary.plants_alive,
            characters = summary.characters,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
