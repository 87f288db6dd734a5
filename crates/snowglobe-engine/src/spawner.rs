//! Demo world spawner.
//!
//! At startup the spawner lays out the tile grid, scatters trees and bushes
//! over walkable cells, creates the seed characters with unique names and
//! hands each of them the configured starting items. Everything it creates
//! is registered with the command dispatcher under a readable instance id.

use rand::Rng;
use serde::Deserialize;
use snowglobe_core::catalog::reference_id;
use snowglobe_core::config::WorldConfig;
use snowglobe_core::{CommandDispatcher, SimulationState};
use snowglobe_types::{EntityId, Gender};
use snowglobe_world::{Tile, TileGrid};
use tracing::{info, warn};

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Demo world layout, loaded from the `demo` section of
/// `snowglobe-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpawnerConfig {
    /// Number of characters to spawn.
    #[serde(default = "default_characters")]
    pub characters: u32,

    /// Number of trees to plant.
    #[serde(default = "default_trees")]
    pub trees: u32,

    /// Number of bushes to plant.
    #[serde(default = "default_bushes")]
    pub bushes: u32,

    /// Catalog reference of the tree species.
    #[serde(default = "default_tree_item")]
    pub tree_item: String,

    /// Catalog reference of the bush species.
    #[serde(default = "default_bush_item")]
    pub bush_item: String,

    /// Items every character starts with.
    #[serde(default = "default_starting_items")]
    pub starting_items: Vec<String>,

    /// ASCII map rows (`.` grass, `~` water, anything else stone). Empty
    /// means an all-grass grid of the configured world size.
    #[serde(default)]
    pub map: Vec<String>,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            characters: default_characters(),
            trees: default_trees(),
            bushes: default_bushes(),
            tree_item: default_tree_item(),
            bush_item: default_bush_item(),
            starting_items: default_starting_items(),
            map: Vec::new(),
        }
    }
}

const fn default_characters() -> u32 {
    3
}

const fn default_trees() -> u32 {
    4
}

const fn default_bushes() -> u32 {
    6
}

fn default_tree_item() -> String {
    String::from("apple_tree")
}

fn default_bush_item() -> String {
    String::from("berry_bush")
}

fn default_starting_items() -> Vec<String> {
    vec![String::from("stone_axe")]
}

// -----------------------------------------------------------------------
// Name pool
// -----------------------------------------------------------------------

/// Built-in pool of character names. The spawner picks randomly without
/// replacement from this list to ensure uniqueness.
const NAME_POOL: &[&str] = &[
    "Alder", "Birch", "Cedar", "Dusk", "Ember", "Fern", "Grove", "Haze",
    "Iris", "Juniper", "Kestrel", "Lark", "Moss", "Nettle", "Oak", "Pine",
    "Quill", "Reed", "Sage", "Thorn", "Umber", "Vale", "Wren", "Yarrow",
];

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

/// Everything the spawner created.
#[derive(Debug, Default)]
pub struct SpawnResult {
    /// Characters, in spawn order, with their instance ids.
    pub characters: Vec<(String, EntityId)>,
    /// Plants, in spawn order, with their instance ids.
    pub plants: Vec<(String, EntityId)>,
}

/// Build the tile grid for the demo world.
///
/// # Errors
///
/// Returns [`EngineError::World`] if the map rows are ragged or the world
/// size or tile size is invalid.
pub fn build_grid(world: &WorldConfig, config: &SpawnerConfig) -> Result<TileGrid, EngineError> {
    if config.map.is_empty() {
        return Ok(TileGrid::filled(world.width, world.height, world.tile_size, Tile::Grass)?);
    }
    let rows: Vec<&str> = config.map.iter().map(String::as_str).collect();
    Ok(TileGrid::from_ascii(&rows, world.tile_size)?)
}

/// Populate `state` with plants and characters and register them with
/// `dispatcher`. The world itself is registered as `"world"`.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if the name pool is too small, and the
/// simulation error if a configured species is missing from the catalog.
pub fn spawn_demo_world(
    config: &SpawnerConfig,
    state: &mut SimulationState,
    dispatcher: &mut CommandDispatcher,
) -> Result<SpawnResult, EngineError> {
    let mut result = SpawnResult::default();
    dispatcher.register_world("world");

    for (species, count) in [(&config.tree_item, config.trees), (&config.bush_item, config.bushes)] {
        for i in 0..count {
            let cell = state.world.grid().random_walkable_cell(&mut state.rng);
            let id = state.spawn_plant(species, cell)?;
            let instance = format!("{}-{i}", reference_id(species));
            dispatcher.register_plant(instance.clone(), id);
            result.plants.push((instance, id));
        }
    }

    let names = pick_unique_names(&mut state.rng, config.characters)?;
    let genders = assign_genders(&mut state.rng, config.characters);

    for (name, gender) in names.into_iter().zip(genders) {
        let cell = state.world.grid().random_walkable_cell(&mut state.rng);
        let id = state.add_character(&name, gender, cell)?;
        give_starting_items(state, id, &config.starting_items);
        let instance = name.to_lowercase();
        dispatcher.register_character(instance.clone(), id);
        info!(
            character = %id,
            name = %name,
            gender = ?gender,
            cell = %cell,
            "Spawned character"
        );
        result.characters.push((instance, id));
    }

    info!(
        characters = result.characters.len(),
        plants = result.plants.len(),
        "Demo world populated"
    );
    Ok(result)
}

fn give_starting_items(state: &mut SimulationState, id: EntityId, items: &[String]) {
    for reference in items {
        let Some(item) = state.catalog.get(reference).map(|e| e.to_item()) else {
            warn!(item = %reference, "Starting item missing from catalog");
            continue;
        };
        let Some(character) = state.character_mut(id) else {
            return;
        };
        if let Err(e) = character.pick_up(&item, 1) {
            warn!(character = %id, item = %reference, error = %e, "Starting item rejected");
        }
    }
}

/// Pick `count` unique names from the name pool using random sampling.
fn pick_unique_names<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Result<Vec<String>, EngineError> {
    let pool_len = NAME_POOL.len();
    let count_usize = usize::try_from(count).map_err(|_conversion_err| EngineError::Spawner {
        message: format!("character count {count} exceeds usize range"),
    })?;

    if count_usize > pool_len {
        return Err(EngineError::Spawner {
            message: format!("requested {count} names but pool only has {pool_len}"),
        });
    }

    // Partial Fisher-Yates over the pool indices.
    let mut indices: Vec<usize> = (0..pool_len).collect();
    for i in 0..count_usize {
        let j = rng.random_range(i..pool_len);
        indices.swap(i, j);
    }

    indices
        .iter()
        .take(count_usize)
        .map(|&idx| {
            NAME_POOL
                .get(idx)
                .map(|s| String::from(*s))
                .ok_or_else(|| EngineError::Spawner {
                    message: format!("name pool index {idx} out of bounds"),
                })
        })
        .collect()
}

/// Assign genders to the seed characters.
///
/// With two or more characters the first two are one male and one female
/// in random order; the rest are a coin flip.
fn assign_genders<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<Gender> {
    let count_usize = usize::try_from(count).unwrap_or(0);
    let mut genders = Vec::with_capacity(count_usize);
    let flip = |rng: &mut R| {
        if rng.random_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        }
    };

    if count_usize >= 2 {
        let first = flip(rng);
        let second = if first == Gender::Male {
            Gender::Female
        } else {
            Gender::Male
        };
        genders.push(first);
        genders.push(second);
    }
    while genders.len() < count_usize {
        genders.push(flip(rng));
    }
    genders
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use snowglobe_core::{ItemCatalog, SimulationConfig};
    use snowglobe_types::GridCell;

    use super::*;

    fn make_state() -> SimulationState {
        let mut catalog = ItemCatalog::new();
        for json in [
            r#"{"item_id": "apple_tree", "preset_type": "plant", "parameters": {"kind": "tree"}}"#,
            r#"{"item_id": "berry_bush", "preset_type": "plant", "parameters": {"kind": "grass"}}"#,
            r#"{"item_id": "stone_axe", "preset_type": "weapon", "parameters": {"tool": "axe"}}"#,
        ] {
            catalog.insert_json(json).unwrap();
        }
        let config = SimulationConfig::default();
        let grid = build_grid(&config.world, &SpawnerConfig::default()).unwrap();
        SimulationState::new(&config, grid, catalog).unwrap()
    }

    #[test]
    fn spawns_configured_counts() {
        let mut state = make_state();
        let mut dispatcher = CommandDispatcher::new();
        let result = spawn_demo_world(&SpawnerConfig::default(), &mut state, &mut dispatcher).unwrap();

        assert_eq!(result.characters.len(), 3);
        assert_eq!(result.plants.len(), 10);
        assert_eq!(state.characters.len(), 3);
        assert_eq!(state.world.plant_count(), 10);
        assert!(dispatcher.instance("world").is_some());
        assert!(dispatcher.instance("apple_tree-0").is_some());
        assert!(dispatcher.instance("berry_bush-5").is_some());
    }

    #[test]
    fn characters_carry_starting_items() {
        let mut state = make_state();
        let mut dispatcher = CommandDispatcher::new();
        let result = spawn_demo_world(&SpawnerConfig::default(), &mut state, &mut dispatcher).unwrap();

        for (_, id) in &result.characters {
            assert!(state.character(*id).unwrap().inventory().has("stone_axe", 1));
        }
    }

    #[test]
    fn missing_species_is_an_error() {
        let mut state = make_state();
        let mut dispatcher = CommandDispatcher::new();
        let config = SpawnerConfig {
            tree_item: String::from("baobab"),
            ..SpawnerConfig::default()
        };
        assert!(spawn_demo_world(&config, &mut state, &mut dispatcher).is_err());
    }

    #[test]
    fn all_unique_names() {
        let mut rng = SmallRng::seed_from_u64(9);
        let names = pick_unique_names(&mut rng, 20).unwrap();
        let set: BTreeSet<&String> = names.iter().collect();
        assert_eq!(set.len(), 20, "all names must be unique");
    }

    #[test]
    fn too_many_names_rejected() {
        let mut rng = SmallRng::seed_from_u64(9);
        let pool = u32::try_from(NAME_POOL.len()).unwrap();
        assert!(pick_unique_names(&mut rng, pool.saturating_add(1)).is_err());
    }

    #[test]
    fn first_two_genders_differ() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..10 {
            let genders = assign_genders(&mut rng, 4);
            assert_eq!(genders.len(), 4);
            assert_ne!(genders.first(), genders.get(1));
        }
    }

    #[test]
    fn ascii_map_overrides_world_size() {
        let config = SpawnerConfig {
            map: vec![String::from("..~"), String::from(".#.")],
            ..SpawnerConfig::default()
        };
        let grid = build_grid(&WorldConfig::default(), &config).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.tile(GridCell::new(2, 0)), Some(Tile::Water));
    }
}
