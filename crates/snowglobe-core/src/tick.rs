//! Tick cycle: the fixed-step loop that drives the Snow Globe simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Clock** -- advance the tick counter by one step of `tick_seconds`.
//! 2. **Plants** -- age and grow every plant; remove the dead and spawn their
//!    remains; let the automatic-drop policy act on ripe fruit.
//! 3. **Movement** -- move every walking character along its path and keep
//!    the registry in step.
//! 4. **Callbacks** -- fire scheduled effects that are due, skipping any
//!    whose target no longer exists.
//!
//! The cycle is deterministic given the same initial state.

use snowglobe_types::{EntityId, WorldPos};
use snowglobe_world::{PlantDeath, Scheduled};
use tracing::{debug, info};

use crate::state::{ScheduledEffect, SimulationState};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: snowglobe_world::WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Simulated seconds elapsed at the end of the tick.
    pub elapsed_seconds: f64,
    /// Living plants at the end of the tick.
    pub plants_alive: usize,
    /// Plants that grew, with their new stage.
    pub grown: Vec<(EntityId, u32)>,
    /// Plants that died this tick.
    pub plant_deaths: Vec<PlantDeath>,
    /// Ground items spawned as remains.
    pub remains_spawned: Vec<EntityId>,
    /// Ground items dropped by automatic-drop plants.
    pub fruit_dropped: Vec<EntityId>,
    /// Characters that reached the end of their path, and where.
    pub arrivals: Vec<(EntityId, WorldPos)>,
    /// Scheduled effects applied.
    pub callbacks_fired: u32,
    /// Scheduled effects dropped because their target was gone.
    pub callbacks_skipped: u32,
    /// Characters in the simulation.
    pub characters: usize,
}

/// Execute one complete tick of the simulation.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter overflows and
/// [`TickError::World`] if a moving character is missing from the registry.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let tick = state.clock.advance()?;
    let delta = state.clock.tick_seconds();
    let now = state.clock.elapsed();
    debug!(tick, elapsed = now, "Tick started");

    // --- Phase 2: Plants ---
    let report = state
        .world
        .advance_plants(delta, &state.catalog, state.auto_drop.as_mut());

    // --- Phase 3: Movement ---
    let arrivals = phase_movement(state, delta)?;

    // --- Phase 4: Callbacks ---
    let due = state.scheduler.take_due(now);
    let (callbacks_fired, callbacks_skipped) = phase_callbacks(state, due);

    let summary = TickSummary {
        tick,
        elapsed_seconds: now,
        plants_alive: state.world.plant_count(),
        grown: report.grown,
        plant_deaths: report.deaths,
        remains_spawned: report.remains,
        fruit_dropped: report.dropped,
        arrivals,
        callbacks_fired,
        callbacks_skipped,
        characters: state.characters.len(),
    };

    info!(
        tick,
        plants = summary.plants_alive,
        deaths = summary.plant_deaths.len(),
        arrivals = summary.arrivals.len(),
        callbacks = summary.callbacks_fired,
        "Tick completed"
    );
    Ok(summary)
}

fn phase_movement(
    state: &mut SimulationState,
    delta: f32,
) -> Result<Vec<(EntityId, WorldPos)>, TickError> {
    let mut arrivals = Vec::new();
    for (&id, character) in &mut state.characters {
        if !character.follower().is_moving() {
            continue;
        }
        let status = character.follow_path(delta);
        state.world.move_entity(id, character.position())?;
        if let snowglobe_agents::MoveStatus::Arrived(pos) = status {
            arrivals.push((id, pos));
        }
    }
    Ok(arrivals)
}

fn phase_callbacks(state: &mut SimulationState, due: Vec<Scheduled<ScheduledEffect>>) -> (u32, u32) {
    let mut fired: u32 = 0;
    let mut skipped: u32 = 0;
    for entry in due {
        let applied = match &entry.payload {
            ScheduledEffect::RevertBuff(reversal) => state
                .characters
                .get_mut(&entry.target)
                .map(|c| reversal.revert(c))
                .is_some(),
            ScheduledEffect::GrowPlant => state
                .world
                .plant_mut(entry.target)
                .map(|p| p.grow())
                .is_some(),
        };
        if applied {
            fired = fired.saturating_add(1);
        } else {
            skipped = skipped.saturating_add(1);
            debug!(callback = %entry.id, target = %entry.target, "Callback target gone, skipped");
        }
    }
    (fired, skipped)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use snowglobe_agents::CharacterAttributes;
    use snowglobe_types::{DeathCause, Gender, GridCell, Stat};
    use snowglobe_world::{AutoDropPolicy, GridMap, Plant, Tile, TileGrid};

    use super::*;
    use crate::catalog::ItemCatalog;
    use crate::config::SimulationConfig;

    const FLOWER: &str = r#"{"item_id": "flower", "preset_type": "plant",
        "parameters": {"kind": "grass", "growth_stages": 4, "lifespan_seconds": 20.0,
                       "remains": "dry_grass"}}"#;
    const DRY_GRASS: &str = r#"{"item_id": "dry_grass", "preset_type": "default",
        "parameters": {"weight": 0.1}}"#;
    const BERRY_BUSH: &str = r#"{"item_id": "berry_bush", "preset_type": "plant",
        "parameters": {"kind": "grass", "growth_stages": 2, "lifespan_seconds": 0.0,
                       "has_fruit": true, "fruit_item": "berry", "fruit_drop_mode": "automatic"}}"#;
    const BERRY: &str = r#"{"item_id": "berry", "preset_type": "consumable",
        "parameters": {"hunger_restore": 1}}"#;
    const TONIC: &str = r#"{"item_id": "tonic", "preset_type": "consumable",
        "parameters": {"healing_amount": 0, "buff_duration": 10.0,
                       "buffs": {"stats": {"strength": 4}}}}"#;

    fn state(tick_seconds: f32) -> SimulationState {
        let mut catalog = ItemCatalog::new();
        for json in [FLOWER, DRY_GRASS, BERRY_BUSH, BERRY, TONIC] {
            catalog.insert_json(json).unwrap();
        }
        let mut config = SimulationConfig::default();
        config.world.tick_seconds = tick_seconds;
        let grid = TileGrid::filled(8, 8, 64.0, Tile::Grass).unwrap();
        SimulationState::new(&config, grid, catalog).unwrap()
    }

    #[test]
    fn plant_grows_and_dies_leaving_remains() {
        let mut state = state(5.0);
        let plant = state.spawn_plant("flower", GridCell::new(3, 3)).unwrap();

        for expected_stage in 1..=3 {
            let summary = run_tick(&mut state).unwrap();
            assert_eq!(summary.grown, vec![(plant, expected_stage)]);
        }
        assert!(state.world.plant(plant).unwrap().is_mature());

        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.plant_deaths.len(), 1);
        let death = summary.plant_deaths.first().unwrap();
        assert_eq!(death.cause, DeathCause::LifespanExhausted);
        assert_eq!(summary.remains_spawned.len(), 1);
        assert_eq!(summary.plants_alive, 0);
        assert!(state.world.plant(plant).is_none());

        let remains = state.world.ground_items().next().unwrap();
        assert_eq!(remains.item.id, "dry_grass");
        assert_eq!(remains.cell, GridCell::new(3, 3));
    }

    #[test]
    fn walking_characters_arrive_and_update_registry() {
        let mut state = state(0.5);
        let id = state.add_character("Ada", Gender::Female, GridCell::new(0, 0)).unwrap();
        state.move_to(id, GridCell::new(2, 0)).unwrap();

        let mut arrived = None;
        for _ in 0..10 {
            let summary = run_tick(&mut state).unwrap();
            if let Some(&(who, pos)) = summary.arrivals.first() {
                arrived = Some((who, pos));
                break;
            }
        }
        let (who, pos) = arrived.unwrap();
        assert_eq!(who, id);
        assert_eq!(state.world.position_of(id), Some(pos));
        assert_eq!(state.world.grid().world_to_cell(pos), GridCell::new(2, 0));
    }

    #[test]
    fn temporary_buff_expires_on_schedule() {
        let mut state = state(5.0);
        let id = state.add_character("Bo", Gender::Male, GridCell::new(1, 1)).unwrap();
        let tonic = state.catalog.get("tonic").unwrap().to_item();
        state.character_mut(id).unwrap().pick_up(&tonic, 1).unwrap();
        state.use_item(id, "tonic").unwrap();
        assert_eq!(state.character(id).unwrap().stat(Stat::Strength), 5);
        assert!((state.character(id).unwrap().inventory().capacity() - 50.0).abs() < 1e-3);

        let first = run_tick(&mut state).unwrap();
        assert_eq!(first.callbacks_fired, 0);
        assert_eq!(state.character(id).unwrap().stat(Stat::Strength), 5);

        let second = run_tick(&mut state).unwrap();
        assert_eq!(second.callbacks_fired, 1);
        assert_eq!(state.character(id).unwrap().stat(Stat::Strength), 1);
        assert!((state.character(id).unwrap().inventory().capacity() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn reversal_is_skipped_when_target_is_gone() {
        let mut state = state(5.0);
        let id = state.add_character("Cy", Gender::Male, GridCell::new(1, 1)).unwrap();
        let tonic = state.catalog.get("tonic").unwrap().to_item();
        state.character_mut(id).unwrap().pick_up(&tonic, 1).unwrap();
        state.use_item(id, "tonic").unwrap();

        state.characters.remove(&id);
        state.world.unregister(id);
        run_tick(&mut state).unwrap();
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.callbacks_fired, 0);
        assert_eq!(summary.callbacks_skipped, 1);
    }

    #[test]
    fn scheduled_growth_fires_once() {
        let mut state = state(1.0);
        let plant = state.spawn_plant("berry_bush", GridCell::new(2, 2)).unwrap();
        state.schedule_growth(plant, 0.5);
        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.callbacks_fired, 1);
        assert_eq!(state.world.plant(plant).unwrap().stage(), 1);
        assert!(state.scheduler.is_empty());
    }

    struct DropBerries;

    impl AutoDropPolicy for DropBerries {
        fn on_fruit_ripe(&mut self, plant: &Plant) -> Vec<String> {
            vec![plant.definition().fruit_item.clone()]
        }
    }

    #[test]
    fn auto_drop_policy_places_fruit() {
        let mut state = state(1.0).with_auto_drop(Box::new(DropBerries));
        let plant = state.spawn_plant("berry_bush", GridCell::new(4, 4)).unwrap();

        let mut dropped = Vec::new();
        for _ in 0..15 {
            dropped.extend(run_tick(&mut state).unwrap().fruit_dropped);
        }
        assert!(!dropped.is_empty());
        assert!(state.world.plant(plant).is_some());
        let item = state.world.ground_item(*dropped.first().unwrap()).unwrap();
        assert_eq!(item.item.id, "berry");
        assert_eq!(item.cell, GridCell::new(4, 4));
    }

    #[test]
    fn default_policy_holds_fruit() {
        let mut state = state(1.0);
        state.spawn_plant("berry_bush", GridCell::new(4, 4)).unwrap();
        for _ in 0..15 {
            assert!(run_tick(&mut state).unwrap().fruit_dropped.is_empty());
        }
        assert_eq!(state.world.ground_items().count(), 0);
    }
}
