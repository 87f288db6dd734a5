//! Characters: attributes, inventory, movement, and equipment in one place.
//!
//! A [`Character`] owns its [`Attributes`], its [`Inventory`], a
//! [`PathFollower`] and at most one equipped [`Weapon`]. It keeps the
//! inventory's capacity tied to strength: any change to strength, whether
//! from a buff, a weapon bonus or a direct set, recomputes capacity.

use serde::Serialize;
use snowglobe_types::{
    AgeGroup, EntityId, Gender, ItemSpec, SpeedKind, Stat, StatusFlag, ToolKind, Vital, WorldPos,
};
use snowglobe_world::{GridMap, Harvester, PlantDefinition, World, find_path};
use tracing::{debug, info};

use crate::attributes::{Attributes, CharacterAttributes};
use crate::config::CharacterConfig;
use crate::effects::{ConsumableDefinition, ConsumeOutcome, apply_consumable};
use crate::error::AgentError;
use crate::fruit::{FruitDefinition, check_can_plant};
use crate::interaction::{InteractionGate, InteractionRequest};
use crate::inventory::{Inventory, InventorySnapshot};
use crate::movement::{MoveStatus, PathFollower};
use crate::weapon::Weapon;

/// A simulated character.
#[derive(Debug)]
pub struct Character {
    id: EntityId,
    name: String,
    age_group: AgeGroup,
    attributes: Attributes,
    inventory: Inventory,
    position: WorldPos,
    follower: PathFollower,
    equipped: Option<Weapon>,
    gate: InteractionGate,
    config: CharacterConfig,
}

/// Serializable summary of a character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterStatus {
    /// Entity id.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Age group.
    pub age_group: AgeGroup,
    /// Current position.
    pub position: WorldPos,
    /// Stats, vitals, speeds and flags.
    pub attributes: Attributes,
    /// Catalog id of the equipped weapon.
    pub equipped: Option<String>,
    /// Maximum interaction distance in cells.
    pub max_interact_distance: f32,
    /// Inventory weight.
    pub carried_weight: f32,
    /// Inventory capacity.
    pub capacity: f32,
}

impl Character {
    /// A fresh adult character at `position`.
    pub fn new(
        name: impl Into<String>,
        gender: Gender,
        position: WorldPos,
        config: CharacterConfig,
    ) -> Self {
        let attributes = Attributes::new(gender, &config);
        let inventory = Inventory::with_capacity_per_strength(
            attributes.stat(Stat::Strength),
            config.capacity_per_strength,
        );
        Self {
            id: EntityId::new(),
            name: name.into(),
            age_group: AgeGroup::default(),
            attributes,
            inventory,
            position,
            follower: PathFollower::new(config.arrival_threshold),
            equipped: None,
            gate: InteractionGate::from_config(&config),
            config,
        }
    }

    /// Entity id.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Age group.
    pub const fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    /// Change the age group.
    pub const fn set_age_group(&mut self, age_group: AgeGroup) {
        self.age_group = age_group;
    }

    /// All attributes.
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The inventory.
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable access to the inventory, for subscribing listeners and
    /// direct adds.
    pub const fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Current position.
    pub const fn position(&self) -> WorldPos {
        self.position
    }

    /// Teleport to `position`, abandoning any path.
    pub fn set_position(&mut self, position: WorldPos) {
        self.position = position;
        self.stop();
    }

    /// The equipped weapon.
    pub const fn equipped(&self) -> Option<&Weapon> {
        self.equipped.as_ref()
    }

    /// The path follower.
    pub const fn follower(&self) -> &PathFollower {
        &self.follower
    }

    // -- Interaction ---------------------------------------------------------

    /// Maximum interaction distance in cells.
    #[allow(clippy::cast_precision_loss)]
    pub fn max_interact_distance(&self) -> f32 {
        self.gate
            .max_distance(self.gender(), self.stat(Stat::Strength) as f32)
    }

    /// An interaction attempt against something at `target`.
    #[allow(clippy::cast_precision_loss)]
    pub fn interaction_request(&self, target: WorldPos) -> InteractionRequest {
        InteractionRequest {
            agent_position: self.position,
            target_position: target,
            gender: self.gender(),
            strength: self.stat(Stat::Strength) as f32,
        }
    }

    /// Check that `target` is within reach. Returns the grid distance.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OutOfRange`] if it is not.
    pub fn check_reach<M: GridMap + ?Sized>(&self, map: &M, target: WorldPos) -> Result<f32, AgentError> {
        self.gate.check(map, &self.interaction_request(target))
    }

    // -- Movement ------------------------------------------------------------

    /// Plan a path to `target` and start following it. Returns the number of
    /// waypoints.
    ///
    /// # Errors
    ///
    /// Returns the wrapped [`WorldError::PathUnreachable`](snowglobe_world::WorldError::PathUnreachable)
    /// if no path exists. The current path is left untouched in that case.
    pub fn move_to<M: GridMap + ?Sized>(&mut self, map: &M, target: WorldPos) -> Result<usize, AgentError> {
        let cells = find_path(map, map.world_to_cell(self.position), map.world_to_cell(target))?;
        let waypoints: Vec<WorldPos> = cells.into_iter().map(|c| map.cell_to_world(c)).collect();
        let count = waypoints.len();
        self.follower.set_path(waypoints);
        self.attributes.set_flag(StatusFlag::Moving, true);
        debug!(character = %self.name, target = %target, waypoints = count, "Path planned");
        Ok(count)
    }

    /// Advance along the current path at path speed.
    pub fn follow_path(&mut self, delta: f32) -> MoveStatus {
        let speed = self.speed(SpeedKind::Path);
        let status = self.follower.step(&mut self.position, speed, delta);
        if let MoveStatus::Arrived(pos) = status {
            self.attributes.set_flag(StatusFlag::Moving, false);
            debug!(character = %self.name, position = %pos, "Arrived");
        }
        status
    }

    /// Abandon the current path.
    pub fn stop(&mut self) {
        self.follower.clear();
        self.attributes.set_flag(StatusFlag::Moving, false);
    }

    // -- Items ---------------------------------------------------------------

    /// Put `quantity` units of `item` into the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Overweight`] if they do not fit.
    pub fn pick_up(&mut self, item: &ItemSpec, quantity: u32) -> Result<(), AgentError> {
        self.inventory.add_item(item, quantity)
    }

    /// Consume one unit of `item_id` from the inventory.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NotFound`] if the item is not held.
    pub fn consume(
        &mut self,
        item_id: &str,
        definition: &ConsumableDefinition,
    ) -> Result<ConsumeOutcome, AgentError> {
        self.inventory.remove(item_id, 1)?;
        let outcome = apply_consumable(definition, self);
        info!(character = %self.name, item = item_id, "Consumed item");
        Ok(outcome)
    }

    /// Equip a weapon held in the inventory, unequipping any previous one
    /// first. Returns the previously equipped weapon.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NotFound`] if the weapon is not in the
    /// inventory.
    pub fn equip(&mut self, weapon: Weapon) -> Result<Option<Weapon>, AgentError> {
        if !self.inventory.has(weapon.item_id(), 1) {
            return Err(AgentError::NotFound(weapon.item_id().to_owned()));
        }
        let previous = self.unequip().ok();
        weapon.bonuses().apply(self);
        info!(character = %self.name, weapon = weapon.item_id(), "Equipped weapon");
        self.equipped = Some(weapon);
        Ok(previous)
    }

    /// Unequip the current weapon, removing its bonuses.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NothingEquipped`] if no weapon is equipped.
    pub fn unequip(&mut self) -> Result<Weapon, AgentError> {
        let weapon = self.equipped.take().ok_or(AgentError::NothingEquipped)?;
        weapon.bonuses().remove(self);
        info!(character = %self.name, weapon = weapon.item_id(), "Unequipped weapon");
        Ok(weapon)
    }

    /// Attack once with the equipped weapon. Returns the damage dealt.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NothingEquipped`] if no weapon is equipped.
    pub fn use_weapon(&mut self) -> Result<i32, AgentError> {
        self.equipped
            .as_mut()
            .map(Weapon::use_once)
            .ok_or(AgentError::NothingEquipped)
    }

    /// Plant a held fruit in the current cell.
    ///
    /// On success one unit of the fruit leaves the inventory, a plant at
    /// stage 0 appears in the world, and survival skill rises by one.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NotPlantable`] or [`AgentError::SkillTooLow`]
    /// when the fruit cannot be planted, [`AgentError::NotFound`] when it is
    /// not held, and a wrapped world error if the plant cannot be spawned.
    pub fn plant_fruit(
        &mut self,
        item_id: &str,
        fruit: &FruitDefinition,
        plant: PlantDefinition,
        world: &mut World,
    ) -> Result<EntityId, AgentError> {
        check_can_plant(item_id, fruit, self.stat(Stat::SurvivalSkills))?;
        if !self.inventory.has(item_id, 1) {
            return Err(AgentError::NotFound(item_id.to_owned()));
        }
        let cell = world.grid().world_to_cell(self.position);
        let plant_id = world.spawn_plant(plant, cell)?;
        self.inventory.remove(item_id, 1)?;
        self.adjust_stat(Stat::SurvivalSkills, 1);
        info!(character = %self.name, item = item_id, plant = %plant_id, cell = %cell, "Planted fruit");
        Ok(plant_id)
    }

    // -- Lifecycle -----------------------------------------------------------

    /// Restore default attributes, empty the inventory and drop any weapon.
    pub fn reset(&mut self) {
        self.equipped = None;
        self.attributes = Attributes::new(self.gender(), &self.config);
        self.inventory.clear();
        self.inventory
            .set_capacity_from_strength(self.attributes.stat(Stat::Strength));
        self.follower.clear();
        info!(character = %self.name, "Character reset");
    }

    /// Whether health has run out.
    pub fn is_dead(&self) -> bool {
        self.vital(Vital::Health) <= 0
    }

    /// Serializable summary.
    pub fn status(&self) -> CharacterStatus {
        CharacterStatus {
            id: self.id,
            name: self.name.clone(),
            age_group: self.age_group,
            position: self.position,
            attributes: self.attributes.clone(),
            equipped: self.equipped.as_ref().map(|w| w.item_id().to_owned()),
            max_interact_distance: self.max_interact_distance(),
            carried_weight: self.inventory.current_weight(),
            capacity: self.inventory.capacity(),
        }
    }

    /// Inventory snapshot.
    pub fn inventory_snapshot(&self) -> InventorySnapshot {
        self.inventory.snapshot()
    }
}

impl CharacterAttributes for Character {
    fn gender(&self) -> Gender {
        self.attributes.gender()
    }

    fn stat(&self, stat: Stat) -> i32 {
        self.attributes.stat(stat)
    }

    fn set_stat(&mut self, stat: Stat, value: i32) {
        self.attributes.set_stat(stat, value);
        if stat == Stat::Strength {
            self.inventory.set_capacity_from_strength(value);
        }
    }

    fn vital(&self, vital: Vital) -> i32 {
        self.attributes.vital(vital)
    }

    fn vital_max(&self, vital: Vital) -> i32 {
        self.attributes.vital_max(vital)
    }

    fn set_vital(&mut self, vital: Vital, value: i32) {
        self.attributes.set_vital(vital, value);
    }

    fn speed(&self, kind: SpeedKind) -> f32 {
        self.attributes.speed(kind)
    }

    fn set_speed(&mut self, kind: SpeedKind, value: f32) {
        self.attributes.set_speed(kind, value);
    }

    fn flag(&self, flag: StatusFlag) -> bool {
        self.attributes.flag(flag)
    }

    fn set_flag(&mut self, flag: StatusFlag, on: bool) {
        self.attributes.set_flag(flag, on);
    }
}

impl Harvester for Character {
    fn has_tool(&self, tool: ToolKind) -> bool {
        self.inventory.has_tool(tool)
            || self
                .equipped
                .as_ref()
                .is_some_and(|w| w.definition().tool == Some(tool))
    }

    fn store(&mut self, item: &ItemSpec) -> bool {
        match self.inventory.add_item(item, 1) {
            Ok(()) => true,
            Err(e) => {
                debug!(character = %self.name, item = %item.id, error = %e, "Item left on the ground");
                false
            }
        }
    }
}
