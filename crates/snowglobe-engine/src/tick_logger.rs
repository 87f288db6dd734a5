//! Tick callback that reports the simulation through the log.
//!
//! After each tick the callback logs plant deaths, dropped fruit and
//! arrivals, and keeps running totals. Every `report_every` ticks it logs
//! a status line per character.

use snowglobe_core::{SimulationState, TickCallback, TickSummary};
use tracing::{debug, info};

/// Totals accumulated over the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Plants that died.
    pub plant_deaths: u64,
    /// Remains spawned.
    pub remains: u64,
    /// Fruit dropped on the ground.
    pub fruit_dropped: u64,
    /// Paths completed.
    pub arrivals: u64,
    /// Scheduled callbacks fired.
    pub callbacks: u64,
}

/// Logs what each tick did.
#[derive(Debug)]
pub struct TickLogger {
    report_every: u64,
    totals: RunTotals,
}

impl TickLogger {
    /// Create a logger that writes a full status report every
    /// `report_every` ticks (0 disables the report).
    pub const fn new(report_every: u64) -> Self {
        Self {
            report_every,
            totals: RunTotals {
                plant_deaths: 0,
                remains: 0,
                fruit_dropped: 0,
                arrivals: 0,
                callbacks: 0,
            },
        }
    }

    /// Totals so far.
    pub const fn totals(&self) -> RunTotals {
        self.totals
    }

    fn report(sim: &SimulationState, tick: u64) {
        for character in sim.characters.values() {
            let status = character.status();
            let inventory = character.inventory();
            info!(
                tick,
                character = %status.id,
                name = %status.name,
                position = %status.position,
                carried = inventory.current_weight(),
                capacity = inventory.capacity(),
                "Character status"
            );
        }
        info!(
            tick,
            plants = sim.world.plant_count(),
            ground_items = sim.world.ground_items().count(),
            scheduled = sim.scheduler.len(),
            "World status"
        );
    }
}

impl TickCallback for TickLogger {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        for death in &summary.plant_deaths {
            info!(
                tick = summary.tick,
                plant = %death.plant,
                cause = %death.cause,
                cell = %death.cell,
                "Plant died"
            );
        }
        for &(id, pos) in &summary.arrivals {
            let name = sim.character(id).map_or("?", |c| c.name());
            debug!(tick = summary.tick, character = %id, name, position = %pos, "Arrived");
        }
        if !summary.fruit_dropped.is_empty() {
            debug!(tick = summary.tick, count = summary.fruit_dropped.len(), "Fruit dropped");
        }

        let t = &mut self.totals;
        t.plant_deaths = t.plant_deaths.saturating_add(len_u64(summary.plant_deaths.len()));
        t.remains = t.remains.saturating_add(len_u64(summary.remains_spawned.len()));
        t.fruit_dropped = t.fruit_dropped.saturating_add(len_u64(summary.fruit_dropped.len()));
        t.arrivals = t.arrivals.saturating_add(len_u64(summary.arrivals.len()));
        t.callbacks = t.callbacks.saturating_add(u64::from(summary.callbacks_fired));

        if self.report_every > 0 && summary.tick.checked_rem(self.report_every) == Some(0) {
            Self::report(sim, summary.tick);
        }
    }
}

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
