//! The world: grid, plants, items on the ground, and the entity registry.
//!
//! [`World`] is the single owner of every plant and ground item. It applies
//! the side effects that plants only describe: spilling products onto the
//! ground, removing dead plants, and spawning their remains.

use std::collections::BTreeMap;

use snowglobe_types::{DeathCause, EntityId, EntityKind, GridCell, ItemSpec, WorldPos};
use tracing::{debug, info, warn};

use crate::error::WorldError;
use crate::grid::{GridMap, TileGrid};
use crate::plant::{
    DEFAULT_FALLBACK_STAGE_SECONDS, Harvester, Materializer, Plant, PlantDeath, PlantDefinition,
};
use crate::registry::EntityRegistry;

// ---------------------------------------------------------------------------
// Automatic fruit drop
// ---------------------------------------------------------------------------

/// Decides what a plant with automatic fruit drop lets fall each tick its
/// fruit is ripe.
///
/// The returned references are materialized and placed on the ground at
/// the plant's cell. Returning nothing leaves the fruit on the plant.
pub trait AutoDropPolicy {
    /// Called once per tick for every living plant whose fruit is ripe and
    /// whose drop mode is automatic.
    fn on_fruit_ripe(&mut self, plant: &Plant) -> Vec<String>;
}

/// Keeps ripe fruit on the plant.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldFruit;

impl AutoDropPolicy for HoldFruit {
    fn on_fruit_ripe(&mut self, _plant: &Plant) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Ground items and reports
// ---------------------------------------------------------------------------

/// An item lying on the ground.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundItem {
    /// Entity id.
    pub id: EntityId,
    /// The item.
    pub item: ItemSpec,
    /// Cell it lies in.
    pub cell: GridCell,
}

/// Everything that happened to plants during one [`World::advance_plants`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantReport {
    /// Plants that moved up a stage, with their new stage.
    pub grown: Vec<(EntityId, u32)>,
    /// Plants that died and were removed.
    pub deaths: Vec<PlantDeath>,
    /// Ground items created by automatic fruit drop.
    pub dropped: Vec<EntityId>,
    /// Ground items created as remains.
    pub remains: Vec<EntityId>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Owner of the grid and every non-character entity.
#[derive(Debug, Clone)]
pub struct World {
    grid: TileGrid,
    registry: EntityRegistry,
    plants: BTreeMap<EntityId, Plant>,
    ground: BTreeMap<EntityId, GroundItem>,
    fallback_stage_seconds: f32,
}

impl World {
    /// Create an empty world over `grid`.
    pub const fn new(grid: TileGrid) -> Self {
        Self {
            grid,
            registry: EntityRegistry::new(),
            plants: BTreeMap::new(),
            ground: BTreeMap::new(),
            fallback_stage_seconds: DEFAULT_FALLBACK_STAGE_SECONDS,
        }
    }

    /// Stage duration given to newly spawned immortal plants.
    #[must_use]
    pub const fn with_fallback_stage_seconds(mut self, seconds: f32) -> Self {
        self.fallback_stage_seconds = seconds;
        self
    }

    /// The tile grid.
    pub const fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Mutable access to the tile grid.
    pub const fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    /// The entity registry.
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    // -- Plants ------------------------------------------------------------

    /// Spawn a plant at stage 0 in `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellOutOfBounds`] if `cell` is outside the grid.
    pub fn spawn_plant(
        &mut self,
        definition: PlantDefinition,
        cell: GridCell,
    ) -> Result<EntityId, WorldError> {
        if !self.grid.in_bounds(cell) {
            return Err(WorldError::CellOutOfBounds(cell));
        }
        let plant = Plant::new(definition, cell).with_fallback_stage_seconds(self.fallback_stage_seconds);
        let id = plant.id();
        info!(
            plant = %id,
            name = plant.definition().display_name,
            cell = %cell,
            "Plant spawned"
        );
        self.registry
            .insert(id, EntityKind::Plant, self.grid.cell_to_world(cell));
        self.plants.insert(id, plant);
        Ok(id)
    }

    /// Spawn a plant offset from `origin` by `(dx, dy)` cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellOutOfBounds`] if the target cell is outside
    /// the grid.
    pub fn spawn_plant_near(
        &mut self,
        definition: PlantDefinition,
        origin: GridCell,
        dx: i32,
        dy: i32,
    ) -> Result<EntityId, WorldError> {
        self.spawn_plant(definition, origin.offset(dx, dy))
    }

    /// A living plant.
    pub fn plant(&self, id: EntityId) -> Option<&Plant> {
        self.plants.get(&id)
    }

    /// Mutable access to a living plant.
    pub fn plant_mut(&mut self, id: EntityId) -> Option<&mut Plant> {
        self.plants.get_mut(&id)
    }

    /// Every living plant, ordered by id.
    pub fn plants(&self) -> impl Iterator<Item = &Plant> {
        self.plants.values()
    }

    /// Number of living plants.
    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    /// Advance every plant by `delta` seconds.
    ///
    /// Plants that die are removed and leave their remains. Plants with ripe
    /// automatic-drop fruit consult `policy`.
    pub fn advance_plants(
        &mut self,
        delta: f32,
        materializer: &dyn Materializer,
        policy: &mut dyn AutoDropPolicy,
    ) -> PlantReport {
        let mut report = PlantReport::default();
        let mut drops: Vec<(GridCell, Vec<String>)> = Vec::new();

        for plant in self.plants.values_mut() {
            let tick = plant.advance(delta);
            if tick.grew {
                report.grown.push((plant.id(), plant.stage()));
            }
            if let Some(death) = tick.death {
                report.deaths.push(death);
            } else if tick.fruit_ripe {
                let refs = policy.on_fruit_ripe(plant);
                if !refs.is_empty() {
                    drops.push((plant.cell(), refs));
                }
            }
        }

        for (cell, refs) in drops {
            for reference in refs {
                if let Some(item) = materialize_or_warn(materializer, &reference) {
                    report.dropped.push(self.insert_ground_item(item, cell));
                }
            }
        }
        for death in &report.deaths {
            if let Some(id) = self.bury(death, materializer) {
                report.remains.push(id);
            }
        }
        report
    }

    /// Harvest a plant, spilling what the harvester cannot hold onto the
    /// plant's cell. Returns the product identities.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlantNotFound`] or the failing harvest
    /// precondition.
    pub fn harvest(
        &mut self,
        plant_id: EntityId,
        harvester: Option<&mut dyn Harvester>,
        materializer: &dyn Materializer,
    ) -> Result<Vec<String>, WorldError> {
        let plant = self
            .plants
            .get_mut(&plant_id)
            .ok_or(WorldError::PlantNotFound(plant_id))?;
        let cell = plant.cell();
        let outcome = plant.try_harvest(harvester, materializer)?;
        for item in outcome.ground {
            self.insert_ground_item(item, cell);
        }
        Ok(outcome.products)
    }

    /// Chop a tree down. Products the chopper cannot hold land on the
    /// tree's cell, the tree is removed and its remains are spawned.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlantNotFound`] or the reason the plant cannot
    /// be chopped.
    pub fn chop(
        &mut self,
        plant_id: EntityId,
        chopper: Option<&mut dyn Harvester>,
        materializer: &dyn Materializer,
    ) -> Result<Vec<String>, WorldError> {
        let plant = self
            .plants
            .get_mut(&plant_id)
            .ok_or(WorldError::PlantNotFound(plant_id))?;
        let cell = plant.cell();
        let outcome = plant.try_chop(chopper, materializer)?;
        for item in outcome.ground {
            self.insert_ground_item(item, cell);
        }
        if let Some(death) = outcome.death {
            self.bury(&death, materializer);
        }
        Ok(outcome.products)
    }

    /// Kill a plant from outside (season end, hostile environment).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlantNotFound`] if no such plant is alive.
    pub fn kill_plant(
        &mut self,
        plant_id: EntityId,
        cause: DeathCause,
        materializer: &dyn Materializer,
    ) -> Result<PlantDeath, WorldError> {
        let plant = self
            .plants
            .get_mut(&plant_id)
            .ok_or(WorldError::PlantNotFound(plant_id))?;
        let death = plant.kill(cause).ok_or(WorldError::PlantDead)?;
        self.bury(&death, materializer);
        Ok(death)
    }

    /// Remove a dead plant and spawn its remains once. Returns the remains'
    /// ground item id.
    fn bury(&mut self, death: &PlantDeath, materializer: &dyn Materializer) -> Option<EntityId> {
        self.plants.remove(&death.plant);
        self.registry.remove(death.plant);
        let reference = death.remains.as_deref()?;
        let item = materialize_or_warn(materializer, reference)?;
        debug!(plant = %death.plant, remains = item.id, cell = %death.cell, "Remains spawned");
        Some(self.insert_ground_item(item, death.cell))
    }

    // -- Ground items --------------------------------------------------------

    /// Place an item on the ground at `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellOutOfBounds`] if `cell` is outside the grid.
    pub fn place_item(&mut self, item: ItemSpec, cell: GridCell) -> Result<EntityId, WorldError> {
        if !self.grid.in_bounds(cell) {
            return Err(WorldError::CellOutOfBounds(cell));
        }
        Ok(self.insert_ground_item(item, cell))
    }

    fn insert_ground_item(&mut self, item: ItemSpec, cell: GridCell) -> EntityId {
        let id = EntityId::new();
        self.registry
            .insert(id, EntityKind::Item, self.grid.cell_to_world(cell));
        self.ground.insert(id, GroundItem { id, item, cell });
        id
    }

    /// Pick an item up off the ground.
    pub fn take_item(&mut self, id: EntityId) -> Option<GroundItem> {
        let taken = self.ground.remove(&id)?;
        self.registry.remove(id);
        Some(taken)
    }

    /// A ground item.
    pub fn ground_item(&self, id: EntityId) -> Option<&GroundItem> {
        self.ground.get(&id)
    }

    /// Every ground item, ordered by id.
    pub fn ground_items(&self) -> impl Iterator<Item = &GroundItem> {
        self.ground.values()
    }

    /// Ground items lying in `cell`.
    pub fn items_at(&self, cell: GridCell) -> impl Iterator<Item = &GroundItem> {
        self.ground.values().filter(move |g| g.cell == cell)
    }

    // -- Characters and queries ---------------------------------------------

    /// Register a character at `position`.
    pub fn register_character(&mut self, id: EntityId, position: WorldPos) {
        self.registry.insert(id, EntityKind::Character, position);
    }

    /// Update a registered entity's position.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if the entity is not registered.
    pub fn move_entity(&mut self, id: EntityId, position: WorldPos) -> Result<(), WorldError> {
        if self.registry.set_position(id, position) {
            Ok(())
        } else {
            Err(WorldError::EntityNotFound(id))
        }
    }

    /// Remove a character from the registry.
    pub fn unregister(&mut self, id: EntityId) -> bool {
        self.registry.remove(id)
    }

    /// World position of a registered entity.
    pub fn position_of(&self, id: EntityId) -> Option<WorldPos> {
        self.registry.get(id).map(|e| e.position)
    }

    /// The closest live entity of `kind` to `from`, ties to the earliest
    /// spawned.
    pub fn find_nearest(
        &self,
        kind: EntityKind,
        from: WorldPos,
        exclude: Option<EntityId>,
    ) -> Option<EntityId> {
        self.registry.find_nearest(kind, from, exclude).map(|e| e.id)
    }
}

fn materialize_or_warn(materializer: &dyn Materializer, reference: &str) -> Option<ItemSpec> {
    let item = materializer.materialize(reference);
    if item.is_none() {
        warn!(reference, "Could not materialize item, skipping");
    }
    item
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use snowglobe_types::{FruitDropMode, ItemCategory, PlantKind, ToolKind};

    use super::*;
    use crate::grid::Tile;

    struct Catalog;

    impl Materializer for Catalog {
        fn materialize(&self, reference: &str) -> Option<ItemSpec> {
            (reference != "missing").then(|| ItemSpec::new(reference, 1.0, ItemCategory::Plant))
        }
    }

    struct Pockets {
        room: u32,
        axe: bool,
    }

    impl Harvester for Pockets {
        fn has_tool(&self, tool: ToolKind) -> bool {
            tool == ToolKind::Axe && self.axe
        }

        fn store(&mut self, _item: &ItemSpec) -> bool {
            if self.room == 0 {
                return false;
            }
            self.room -= 1;
            true
        }
    }

    struct DropEverything;

    impl AutoDropPolicy for DropEverything {
        fn on_fruit_ripe(&mut self, plant: &Plant) -> Vec<String> {
            vec![plant.definition().fruit_item.clone()]
        }
    }

    fn world() -> World {
        World::new(TileGrid::filled(8, 8, 10.0, Tile::Grass).unwrap())
    }

    fn short_lived(remains: Option<&str>) -> PlantDefinition {
        PlantDefinition {
            display_name: String::from("Weed"),
            growth_stages: 2,
            lifespan_seconds: 4.0,
            remains: remains.map(String::from),
            ..PlantDefinition::default()
        }
    }

    #[test]
    fn spawn_registers_plant_at_cell_centre() {
        let mut w = world();
        let id = w.spawn_plant(short_lived(None), GridCell::new(2, 3)).unwrap();
        assert_eq!(w.position_of(id), Some(WorldPos::new(25.0, 35.0)));
        assert_eq!(w.plant_count(), 1);
        assert!(w.spawn_plant(short_lived(None), GridCell::new(9, 0)).is_err());
        let near = w
            .spawn_plant_near(short_lived(None), GridCell::new(2, 3), 1, -1)
            .unwrap();
        assert_eq!(w.plant(near).map(Plant::cell), Some(GridCell::new(3, 2)));
    }

    #[test]
    fn dead_plants_are_removed_and_leave_remains_once() {
        let mut w = world();
        let id = w.spawn_plant(short_lived(Some("husk")), GridCell::new(1, 1)).unwrap();
        let report = w.advance_plants(2.0, &Catalog, &mut HoldFruit);
        assert_eq!(report.grown, vec![(id, 1)]);
        assert!(report.deaths.is_empty());

        let report = w.advance_plants(2.0, &Catalog, &mut HoldFruit);
        assert_eq!(report.deaths.len(), 1);
        assert_eq!(report.remains.len(), 1);
        assert!(w.plant(id).is_none());
        assert!(w.find_nearest(EntityKind::Plant, WorldPos::default(), None).is_none());

        let husks: Vec<_> = w.items_at(GridCell::new(1, 1)).collect();
        assert_eq!(husks.len(), 1);
        assert_eq!(husks.first().map(|g| g.item.id.as_str()), Some("husk"));

        let again = w.advance_plants(2.0, &Catalog, &mut HoldFruit);
        assert!(again.deaths.is_empty());
        assert_eq!(w.ground_items().count(), 1);
    }

    #[test]
    fn unmaterializable_remains_are_skipped() {
        let mut w = world();
        w.spawn_plant(short_lived(Some("missing")), GridCell::new(0, 0)).unwrap();
        let report = w.advance_plants(4.0, &Catalog, &mut HoldFruit);
        assert_eq!(report.deaths.len(), 1);
        assert!(report.remains.is_empty());
        assert_eq!(w.ground_items().count(), 0);
    }

    #[test]
    fn harvest_overflow_lands_on_plant_cell() {
        let mut w = world();
        let def = PlantDefinition {
            growth_stages: 1,
            lifespan_seconds: 0.0,
            harvest_products: vec![String::from("a"), String::from("b")],
            ..PlantDefinition::default()
        };
        let id = w.spawn_plant(def, GridCell::new(5, 5)).unwrap();
        let mut pockets = Pockets { room: 1, axe: false };
        let products = w.harvest(id, Some(&mut pockets), &Catalog).unwrap();
        assert_eq!(products, vec!["a", "b"]);
        assert_eq!(w.items_at(GridCell::new(5, 5)).count(), 1);
    }

    #[test]
    fn chop_removes_tree() {
        let mut w = world();
        let def = PlantDefinition {
            kind: PlantKind::Tree,
            chop_products: vec![String::from("log")],
            remains: Some(String::from("stump")),
            ..PlantDefinition::default()
        };
        let id = w.spawn_plant(def, GridCell::new(3, 3)).unwrap();
        let mut pockets = Pockets { room: 5, axe: true };
        let products = w.chop(id, Some(&mut pockets), &Catalog).unwrap();
        assert_eq!(products, vec!["log"]);
        assert!(w.plant(id).is_none());
        assert!(matches!(
            w.chop(id, None, &Catalog),
            Err(WorldError::PlantNotFound(_))
        ));
        assert_eq!(w.items_at(GridCell::new(3, 3)).count(), 1);
    }

    #[test]
    fn auto_drop_policy_places_fruit() {
        let mut w = world();
        let def = PlantDefinition {
            growth_stages: 1,
            lifespan_seconds: 0.0,
            has_fruit: true,
            fruit_drop_mode: FruitDropMode::Automatic,
            fruit_item: String::from("apple"),
            ..PlantDefinition::default()
        };
        w.spawn_plant(def.clone(), GridCell::new(0, 0)).unwrap();
        let held = w.advance_plants(1.0, &Catalog, &mut HoldFruit);
        assert!(held.dropped.is_empty());
        let dropped = w.advance_plants(1.0, &Catalog, &mut DropEverything);
        assert_eq!(dropped.dropped.len(), 1);
        assert_eq!(w.items_at(GridCell::new(0, 0)).count(), 1);
    }

    #[test]
    fn external_kill_buries_plant() {
        let mut w = world();
        let id = w.spawn_plant(short_lived(Some("husk")), GridCell::new(1, 2)).unwrap();
        let death = w.kill_plant(id, DeathCause::SeasonEnd, &Catalog).unwrap();
        assert_eq!(death.cause, DeathCause::SeasonEnd);
        assert!(w.plant(id).is_none());
        assert!(w.kill_plant(id, DeathCause::SeasonEnd, &Catalog).is_err());
    }

    #[test]
    fn ground_items_can_be_picked_up() {
        let mut w = world();
        let id = w
            .place_item(ItemSpec::new("stone", 2.0, ItemCategory::Unknown), GridCell::new(1, 1))
            .unwrap();
        assert_eq!(w.find_nearest(EntityKind::Item, WorldPos::default(), None), Some(id));
        let taken = w.take_item(id).unwrap();
        assert_eq!(taken.item.id, "stone");
        assert!(w.ground_item(id).is_none());
        assert!(w.find_nearest(EntityKind::Item, WorldPos::default(), None).is_none());
    }
}
