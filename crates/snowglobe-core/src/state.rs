//! Simulation state and character interactions.
//!
//! [`SimulationState`] bundles everything a tick needs: the clock, the
//! world, every character, the item catalog, scheduled callbacks and the
//! automatic fruit-drop policy. Its methods are the interactions a
//! character can attempt. Each one resolves catalog references, checks the
//! interaction gate where a target is involved, and delegates to the world
//! or the character.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use snowglobe_agents::{
    AgentError, BuffReversal, Character, CharacterConfig, ConsumeOutcome, Weapon,
};
use snowglobe_types::{CallbackId, EntityId, EntityKind, Gender, GridCell, PlantKind, WorldPos};
use snowglobe_world::{
    AutoDropPolicy, CellInfo, GridMap, Harvester, HoldFruit, Scheduler, TileGrid, World,
    WorldError,
};
use tracing::{debug, info};

use crate::catalog::{ItemCatalog, reference_id};
use crate::clock::{ClockError, SimClock};
use crate::config::SimulationConfig;

/// Errors from character interactions.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// No character with this id exists.
    #[error("character not found: {0}")]
    CharacterNotFound(EntityId),

    /// The catalog has no item with this reference.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// The item exists but cannot be used this way.
    #[error("item {item} is not a {expected}")]
    WrongItemKind {
        /// The item.
        item: String,
        /// What the operation needed.
        expected: &'static str,
    },

    /// No suitable target is in the world.
    #[error("no {kind} nearby")]
    NoTarget {
        /// What was searched for.
        kind: &'static str,
    },

    /// A character operation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// A deferred effect waiting in the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledEffect {
    /// Undo a temporary buff on the target character.
    RevertBuff(BuffReversal),
    /// Force the target plant up one growth stage.
    GrowPlant,
}

/// Products of a harvest or chop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionOutcome {
    /// The plant acted on.
    pub target: EntityId,
    /// Product identities, in delivery order.
    pub products: Vec<String>,
}

/// The mutable simulation state passed through the tick cycle.
pub struct SimulationState {
    /// The simulation clock.
    pub clock: SimClock,
    /// Grid, plants, ground items and the entity registry.
    pub world: World,
    /// Every character, by id.
    pub characters: BTreeMap<EntityId, Character>,
    /// Item definitions; also the world's materializer.
    pub catalog: ItemCatalog,
    /// Deferred effects keyed to elapsed seconds.
    pub scheduler: Scheduler<ScheduledEffect>,
    /// What automatic-drop plants do with ripe fruit.
    pub auto_drop: Box<dyn AutoDropPolicy + Send>,
    /// Template for new characters.
    pub character_config: CharacterConfig,
    /// Seeded random source for wandering.
    pub rng: SmallRng,
}

impl core::fmt::Debug for SimulationState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulationState")
            .field("clock", &self.clock)
            .field("world", &self.world)
            .field("characters", &self.characters)
            .field("catalog", &self.catalog.len())
            .field("scheduled", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}

impl SimulationState {
    /// Build a state over `grid` from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the tick length is invalid.
    pub fn new(
        config: &SimulationConfig,
        grid: TileGrid,
        catalog: ItemCatalog,
    ) -> Result<Self, ClockError> {
        Ok(Self {
            clock: SimClock::from_config(&config.world)?,
            world: World::new(grid).with_fallback_stage_seconds(config.plants.fallback_stage_seconds),
            characters: BTreeMap::new(),
            catalog,
            scheduler: Scheduler::new(),
            auto_drop: Box::new(HoldFruit),
            character_config: config.character.clone(),
            rng: SmallRng::seed_from_u64(config.world.seed),
        })
    }

    /// Replace the automatic fruit-drop policy.
    #[must_use]
    pub fn with_auto_drop(mut self, policy: Box<dyn AutoDropPolicy + Send>) -> Self {
        self.auto_drop = policy;
        self
    }

    // -- Characters ----------------------------------------------------------

    /// Create a character standing in `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellOutOfBounds`] if `cell` is outside the grid.
    pub fn add_character(
        &mut self,
        name: &str,
        gender: Gender,
        cell: GridCell,
    ) -> Result<EntityId, SimulationError> {
        let grid = self.world.grid();
        if !grid.in_bounds(cell) {
            return Err(WorldError::CellOutOfBounds(cell).into());
        }
        let position = grid.cell_to_world(cell);
        let character = Character::new(name, gender, position, self.character_config.clone());
        let id = character.id();
        self.world.register_character(id, position);
        self.characters.insert(id, character);
        info!(character = name, id = %id, cell = %cell, "Character added");
        Ok(id)
    }

    /// Remove a character and cancel everything scheduled for it.
    pub fn remove_character(&mut self, id: EntityId) -> Option<Character> {
        let character = self.characters.remove(&id)?;
        self.world.unregister(id);
        let cancelled = self.scheduler.cancel_target(id);
        debug!(character = %id, cancelled, "Character removed");
        Some(character)
    }

    /// Look up a character.
    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Mutable access to a character.
    pub fn character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    // -- Plants --------------------------------------------------------------

    /// Spawn the plant species named by `reference` in `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownItem`] or
    /// [`SimulationError::WrongItemKind`] if the reference is not a plant,
    /// and a world error if the cell is out of bounds.
    pub fn spawn_plant(&mut self, reference: &str, cell: GridCell) -> Result<EntityId, SimulationError> {
        let definition = self.plant_definition(reference)?;
        Ok(self.world.spawn_plant(definition, cell)?)
    }

    /// Schedule a plant to grow one stage after `delay` seconds.
    pub fn schedule_growth(&mut self, plant: EntityId, delay: f64) -> CallbackId {
        self.scheduler
            .schedule(self.clock.elapsed(), delay, plant, ScheduledEffect::GrowPlant)
    }

    /// The plant closest to a character.
    pub fn nearest_plant(&self, character: EntityId) -> Option<EntityId> {
        let from = self.characters.get(&character)?.position();
        self.world.find_nearest(EntityKind::Plant, from, None)
    }

    /// The tree closest to a character. Ties go to the earliest spawned.
    pub fn nearest_tree(&self, character: EntityId) -> Option<EntityId> {
        let from = self.characters.get(&character)?.position();
        self.world
            .registry()
            .find_nearest_by(EntityKind::Plant, from, |entry| {
                self.world
                    .plant(entry.id)
                    .is_some_and(|p| p.definition().kind == PlantKind::Tree)
            })
            .map(|entry| entry.id)
    }

    /// Harvest a plant within reach.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OutOfRange`] if the plant is too far away and
    /// the harvest precondition that failed otherwise.
    pub fn harvest(&mut self, character: EntityId, plant: EntityId) -> Result<Vec<String>, SimulationError> {
        let actor = self
            .characters
            .get_mut(&character)
            .ok_or(SimulationError::CharacterNotFound(character))?;
        let target = self
            .world
            .position_of(plant)
            .ok_or(WorldError::PlantNotFound(plant))?;
        actor.check_reach(self.world.grid(), target)?;
        let products = self
            .world
            .harvest(plant, Some(actor as &mut dyn Harvester), &self.catalog)?;
        info!(character = %character, plant = %plant, products = products.len(), "Harvested");
        Ok(products)
    }

    /// Harvest the nearest plant.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NoTarget`] if there are no plants, and
    /// the errors of [`harvest`](Self::harvest).
    pub fn harvest_nearest(&mut self, character: EntityId) -> Result<InteractionOutcome, SimulationError> {
        self.ensure_character(character)?;
        let target = self
            .nearest_plant(character)
            .ok_or(SimulationError::NoTarget { kind: "plant" })?;
        let products = self.harvest(character, target)?;
        Ok(InteractionOutcome { target, products })
    }

    /// Chop a tree within reach.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OutOfRange`] if the tree is too far away and
    /// the chop precondition that failed otherwise.
    pub fn chop(&mut self, character: EntityId, plant: EntityId) -> Result<Vec<String>, SimulationError> {
        let actor = self
            .characters
            .get_mut(&character)
            .ok_or(SimulationError::CharacterNotFound(character))?;
        let target = self
            .world
            .position_of(plant)
            .ok_or(WorldError::PlantNotFound(plant))?;
        actor.check_reach(self.world.grid(), target)?;
        let products = self
            .world
            .chop(plant, Some(actor as &mut dyn Harvester), &self.catalog)?;
        info!(character = %character, plant = %plant, products = products.len(), "Chopped");
        Ok(products)
    }

    /// Chop the nearest tree.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NoTarget`] if there are no trees, and the
    /// errors of [`chop`](Self::chop).
    pub fn chop_nearest(&mut self, character: EntityId) -> Result<InteractionOutcome, SimulationError> {
        self.ensure_character(character)?;
        let target = self
            .nearest_tree(character)
            .ok_or(SimulationError::NoTarget { kind: "tree" })?;
        let products = self.chop(character, target)?;
        Ok(InteractionOutcome { target, products })
    }

    // -- Items ---------------------------------------------------------------

    /// Consume one unit of a held consumable or fruit. Temporary buffs are
    /// scheduled for reversal.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownItem`] or
    /// [`SimulationError::WrongItemKind`] for non-consumables and
    /// [`AgentError::NotFound`] if the item is not held.
    pub fn use_item(&mut self, character: EntityId, item: &str) -> Result<ConsumeOutcome, SimulationError> {
        let definition = self
            .catalog
            .consumable(item)
            .cloned()
            .ok_or_else(|| self.wrong_kind(item, "consumable"))?;
        let actor = self
            .characters
            .get_mut(&character)
            .ok_or(SimulationError::CharacterNotFound(character))?;
        let outcome = actor.consume(reference_id(item), &definition)?;
        if let Some(reversal) = &outcome.reversal {
            let id = self.scheduler.schedule(
                self.clock.elapsed(),
                f64::from(reversal.duration),
                character,
                ScheduledEffect::RevertBuff(reversal.clone()),
            );
            debug!(character = %character, callback = %id, duration = reversal.duration, "Buff reversal scheduled");
        }
        Ok(outcome)
    }

    /// Equip a held weapon.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::WrongItemKind`] for non-weapons and
    /// [`AgentError::NotFound`] if the weapon is not held.
    pub fn equip(&mut self, character: EntityId, item: &str) -> Result<Option<String>, SimulationError> {
        let definition = self
            .catalog
            .weapon(item)
            .cloned()
            .ok_or_else(|| self.wrong_kind(item, "weapon"))?;
        let actor = self
            .characters
            .get_mut(&character)
            .ok_or(SimulationError::CharacterNotFound(character))?;
        let previous = actor.equip(Weapon::new(reference_id(item), definition))?;
        Ok(previous.map(|w| w.item_id().to_owned()))
    }

    /// Unequip the current weapon. Returns its item id.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NothingEquipped`] if nothing is equipped.
    pub fn unequip(&mut self, character: EntityId) -> Result<String, SimulationError> {
        let actor = self
            .characters
            .get_mut(&character)
            .ok_or(SimulationError::CharacterNotFound(character))?;
        Ok(actor.unequip()?.item_id().to_owned())
    }

    /// Plant a held fruit in the character's cell.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::WrongItemKind`] for non-fruit, the
    /// planting checks of [`Character::plant_fruit`], and
    /// [`SimulationError::UnknownItem`] if the plant it grows into is
    /// missing from the catalog.
    pub fn plant_fruit(&mut self, character: EntityId, item: &str) -> Result<EntityId, SimulationError> {
        let fruit = self
            .catalog
            .fruit(item)
            .cloned()
            .ok_or_else(|| self.wrong_kind(item, "fruit"))?;
        let plant = if fruit.plant.is_empty() {
            // Let the character report it as unplantable.
            snowglobe_world::PlantDefinition::default()
        } else {
            self.plant_definition(&fruit.plant)?
        };
        let actor = self
            .characters
            .get_mut(&character)
            .ok_or(SimulationError::CharacterNotFound(character))?;
        Ok(actor.plant_fruit(reference_id(item), &fruit, plant, &mut self.world)?)
    }

    // -- Movement ------------------------------------------------------------

    /// Start walking to `cell`. Returns the number of waypoints.
    ///
    /// # Errors
    ///
    /// Returns the wrapped [`WorldError::PathUnreachable`] if no path
    /// exists.
    pub fn move_to(&mut self, character: EntityId, cell: GridCell) -> Result<usize, SimulationError> {
        let actor = self
            .characters
            .get_mut(&character)
            .ok_or(SimulationError::CharacterNotFound(character))?;
        let grid = self.world.grid();
        Ok(actor.move_to(grid, grid.cell_to_world(cell))?)
    }

    /// Start walking to a random walkable cell. Returns the chosen cell.
    ///
    /// # Errors
    ///
    /// Same as [`move_to`](Self::move_to).
    pub fn move_to_random(&mut self, character: EntityId) -> Result<GridCell, SimulationError> {
        let cell = self.world.grid().random_walkable_cell(&mut self.rng);
        self.move_to(character, cell)?;
        Ok(cell)
    }

    /// Walkability of every cell within `radius` of `center`.
    pub fn nearby_cells(&self, center: GridCell, radius: u32) -> Vec<CellInfo> {
        self.world.grid().nearby_cells(center, radius)
    }

    /// Position of a character.
    pub fn position_of(&self, character: EntityId) -> Option<WorldPos> {
        self.characters.get(&character).map(Character::position)
    }

    // -- Helpers -------------------------------------------------------------

    fn ensure_character(&self, id: EntityId) -> Result<(), SimulationError> {
        if self.characters.contains_key(&id) {
            Ok(())
        } else {
            Err(SimulationError::CharacterNotFound(id))
        }
    }

    fn plant_definition(&self, reference: &str) -> Result<snowglobe_world::PlantDefinition, SimulationError> {
        self.catalog
            .plant(reference)
            .cloned()
            .ok_or_else(|| self.wrong_kind(reference, "plant"))
    }

    fn wrong_kind(&self, item: &str, expected: &'static str) -> SimulationError {
        if self.catalog.get(item).is_some() {
            SimulationError::WrongItemKind {
                item: item.to_owned(),
                expected,
            }
        } else {
            SimulationError::UnknownItem(item.to_owned())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use snowglobe_world::{Tile, TileGrid};

    use super::*;

    fn grove() -> SimulationState {
        let mut catalog = ItemCatalog::new();
        for json in [
            r#"{"item_id": "oak", "preset_type": "plant", "parameters": {"kind": "tree"}}"#,
            r#"{"item_id": "clover", "preset_type": "plant", "parameters": {"kind": "grass"}}"#,
        ] {
            catalog.insert_json(json).unwrap();
        }
        let grid = TileGrid::filled(8, 8, 64.0, Tile::Grass).unwrap();
        SimulationState::new(&SimulationConfig::default(), grid, catalog).unwrap()
    }

    #[test]
    fn nearest_tree_skips_closer_grass() {
        let mut state = grove();
        let ada = state.add_character("Ada", Gender::Female, GridCell::new(0, 0)).unwrap();
        let clover = state.spawn_plant("clover", GridCell::new(1, 0)).unwrap();
        let far_oak = state.spawn_plant("oak", GridCell::new(5, 5)).unwrap();
        let oak_a = state.spawn_plant("oak", GridCell::new(0, 3)).unwrap();
        state.spawn_plant("oak", GridCell::new(3, 0)).unwrap();

        assert_eq!(state.nearest_plant(ada), Some(clover));
        assert_eq!(state.nearest_tree(ada), Some(oak_a));
        assert_ne!(state.nearest_tree(ada), Some(far_oak));
    }

    #[test]
    fn nearest_tree_is_none_without_trees() {
        let mut state = grove();
        let ada = state.add_character("Ada", Gender::Male, GridCell::new(2, 2)).unwrap();
        state.spawn_plant("clover", GridCell::new(2, 3)).unwrap();
        assert!(state.nearest_tree(ada).is_none());
        assert!(state.nearest_tree(EntityId::new()).is_none());
    }
}
