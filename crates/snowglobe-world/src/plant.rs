//! Growable, harvestable plants.
//!
//! A [`Plant`] moves through growth stages `0..N`, where stage `N - 1` is
//! mature. It ages with every [`Plant::advance`] call and dies when its age
//! reaches its lifespan, when chopped, or when killed externally. Death is
//! terminal.
//!
//! Stage duration is `lifespan / N`, so shorter-lived plants mature faster.
//! Immortal plants (lifespan 0) use a fixed fallback duration.
//!
//! Harvesting knocks a mature plant back one stage. A second harvest right
//! after the first therefore finds the plant below maturity and yields
//! nothing until it regrows.
//!
//! Plants never touch the world directly. Products go to a [`Harvester`]
//! when it has room; everything else is returned in the outcome for the
//! caller to place on the ground at the plant's cell.

use serde::{Deserialize, Serialize};
use snowglobe_types::{
    DeathCause, EntityId, FruitDropMode, GridCell, ItemSpec, PlantKind, Rarity, ToolKind, Usage,
};
use tracing::{debug, info, warn};

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Stage duration in seconds for plants without a lifespan.
pub const DEFAULT_FALLBACK_STAGE_SECONDS: f32 = 10.0;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Turns a product reference from a plant definition into a concrete item.
///
/// References are item ids or resource paths whose file stem is the id.
pub trait Materializer {
    /// Produce the item named by `reference`, or `None` if it cannot be
    /// built. Implementations log their own failures.
    fn materialize(&self, reference: &str) -> Option<ItemSpec>;
}

/// The character on the receiving end of a harvest or chop.
pub trait Harvester {
    /// Whether the harvester carries a tool of the given class.
    fn has_tool(&self, tool: ToolKind) -> bool;

    /// Try to take `item` into the harvester's inventory. Returns `false`
    /// when it does not fit.
    fn store(&mut self, item: &ItemSpec) -> bool;
}

// ---------------------------------------------------------------------------
// PlantDefinition
// ---------------------------------------------------------------------------

/// Static description of a plant species, loaded from the item catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantDefinition {
    /// Catalog id of the species.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Growth form.
    pub kind: PlantKind,
    /// Number of growth stages (at least 1).
    pub growth_stages: u32,
    /// Seconds until natural death; 0 means immortal.
    pub lifespan_seconds: f32,
    /// Whether the plant bears fruit.
    pub has_fruit: bool,
    /// First stage at which fruit is ripe.
    pub fruit_mature_stage: u32,
    /// How ripe fruit leaves the plant.
    pub fruit_drop_mode: FruitDropMode,
    /// Reference to the fruit item.
    pub fruit_item: String,
    /// Fruit units produced per harvest.
    pub fruit_yield: u32,
    /// Extra products delivered on every harvest, in order.
    pub harvest_products: Vec<String>,
    /// Products delivered when the plant is chopped, in order.
    pub chop_products: Vec<String>,
    /// Tool a harvester must carry.
    pub tool_required: ToolKind,
    /// Maximum number of harvests; 0 means unlimited.
    pub harvest_limit: u32,
    /// Seconds between harvests.
    pub harvest_cooldown_seconds: f32,
    /// Cause recorded when the plant dies of old age.
    pub death_condition: DeathCause,
    /// Reference to the item left behind on death.
    pub remains: Option<String>,
    /// Weight of the plant as an item.
    pub weight: f32,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Primary use.
    pub usage: Usage,
}

impl Default for PlantDefinition {
    fn default() -> Self {
        Self {
            id: String::new(),
            display_name: String::new(),
            kind: PlantKind::Grass,
            growth_stages: 4,
            lifespan_seconds: 100.0,
            has_fruit: false,
            fruit_mature_stage: 0,
            fruit_drop_mode: FruitDropMode::Harvested,
            fruit_item: String::new(),
            fruit_yield: 1,
            harvest_products: Vec::new(),
            chop_products: Vec::new(),
            tool_required: ToolKind::None,
            harvest_limit: 1,
            harvest_cooldown_seconds: 0.0,
            death_condition: DeathCause::LifespanExhausted,
            remains: None,
            weight: 0.5,
            rarity: Rarity::Common,
            usage: Usage::Food,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// A plant's death, to be applied to the world by the owner of the plant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantDeath {
    /// The plant that died.
    pub plant: EntityId,
    /// Why it died.
    pub cause: DeathCause,
    /// Grid-aligned location where remains are placed.
    pub cell: GridCell,
    /// Reference to the remains item, if the species leaves any.
    pub remains: Option<String>,
}

/// What happened to a plant during one [`Plant::advance`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantTick {
    /// The plant moved up one growth stage.
    pub grew: bool,
    /// The plant drops fruit automatically and has ripe fruit.
    pub fruit_ripe: bool,
    /// The plant died of old age.
    pub death: Option<PlantDeath>,
}

/// Result of a harvest or chop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestOutcome {
    /// Identity of every product, in delivery order. Products that failed
    /// to materialize appear under their configured reference.
    pub products: Vec<String>,
    /// Products the harvester could not hold; place them at the plant's cell.
    pub ground: Vec<ItemSpec>,
    /// Set when the action killed the plant.
    pub death: Option<PlantDeath>,
}

impl HarvestOutcome {
    /// Whether nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Read-only summary of a plant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantInfo {
    /// Display name.
    pub name: String,
    /// Growth form.
    pub kind: PlantKind,
    /// Stage as `"current/total"`.
    pub stage: String,
    /// Age in seconds.
    pub age: f32,
    /// Lifespan in seconds.
    pub lifespan: f32,
    /// Whether the plant is dead.
    pub is_dead: bool,
    /// Whether the species bears fruit.
    pub has_fruit: bool,
    /// Whether a harvest would currently succeed (ignoring tools).
    pub can_harvest: bool,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Primary use.
    pub usage: Usage,
}

// ---------------------------------------------------------------------------
// Plant
// ---------------------------------------------------------------------------

/// A living plant placed on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    id: EntityId,
    definition: PlantDefinition,
    cell: GridCell,
    stage: u32,
    age: f32,
    growth_timer: f32,
    harvested_count: u32,
    cooldown_remaining: f32,
    fallback_stage_seconds: f32,
    death_cause: Option<DeathCause>,
}

impl Plant {
    /// Spawn a plant at stage 0 in `cell`.
    pub fn new(definition: PlantDefinition, cell: GridCell) -> Self {
        Self {
            id: EntityId::new(),
            definition,
            cell,
            stage: 0,
            age: 0.0,
            growth_timer: 0.0,
            harvested_count: 0,
            cooldown_remaining: 0.0,
            fallback_stage_seconds: DEFAULT_FALLBACK_STAGE_SECONDS,
            death_cause: None,
        }
    }

    /// Override the stage duration used when the lifespan is 0.
    #[must_use]
    pub const fn with_fallback_stage_seconds(mut self, seconds: f32) -> Self {
        self.fallback_stage_seconds = seconds;
        self
    }

    /// Entity id.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Species definition.
    pub const fn definition(&self) -> &PlantDefinition {
        &self.definition
    }

    /// Grid cell the plant occupies.
    pub const fn cell(&self) -> GridCell {
        self.cell
    }

    /// Current growth stage (0-based).
    pub const fn stage(&self) -> u32 {
        self.stage
    }

    /// Number of growth stages, never less than 1.
    pub fn stage_count(&self) -> u32 {
        self.definition.growth_stages.max(1)
    }

    /// Age in seconds.
    pub const fn age(&self) -> f32 {
        self.age
    }

    /// Times the plant has been harvested.
    pub const fn harvested_count(&self) -> u32 {
        self.harvested_count
    }

    /// Seconds until the next harvest is allowed.
    pub const fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    /// Whether the plant is dead.
    pub const fn is_dead(&self) -> bool {
        self.death_cause.is_some()
    }

    /// Why the plant died, if it has.
    pub const fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    /// Whether the plant is at its final stage.
    pub fn is_mature(&self) -> bool {
        self.stage == self.top_stage()
    }

    /// Seconds each growth stage lasts.
    pub fn stage_duration(&self) -> f32 {
        if self.definition.lifespan_seconds > 0.0 {
            self.definition.lifespan_seconds / stage_count_f32(self.stage_count())
        } else {
            self.fallback_stage_seconds
        }
    }

    fn top_stage(&self) -> u32 {
        self.stage_count().saturating_sub(1)
    }

    /// Advance the plant by `delta` seconds.
    ///
    /// Ages the plant, kills it when its lifespan is reached, otherwise
    /// grows it when a stage's worth of time has accumulated and counts the
    /// harvest cooldown down. Dead plants do not change.
    pub fn advance(&mut self, delta: f32) -> PlantTick {
        let mut tick = PlantTick::default();
        if self.is_dead() {
            return tick;
        }

        self.age += delta;
        let lifespan = self.definition.lifespan_seconds;
        if lifespan > 0.0 && self.age >= lifespan {
            tick.death = self.die(self.definition.death_condition);
            return tick;
        }

        if self.stage < self.top_stage() {
            self.growth_timer += delta;
            if self.growth_timer >= self.stage_duration() {
                tick.grew = self.grow();
                self.growth_timer = 0.0;
            }
        }

        tick.fruit_ripe = self.definition.has_fruit
            && self.definition.fruit_drop_mode == FruitDropMode::Automatic
            && self.stage >= self.definition.fruit_mature_stage;

        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - delta).max(0.0);
        }

        tick
    }

    /// Force one stage of growth. Returns `false` if the plant is dead or
    /// already mature.
    pub fn grow(&mut self) -> bool {
        if self.is_dead() || self.stage >= self.top_stage() {
            return false;
        }
        self.stage = self.stage.saturating_add(1);
        debug!(
            plant = %self.id,
            name = self.definition.display_name,
            stage = self.stage,
            "Plant grew"
        );
        true
    }

    /// Check every harvest precondition, in order.
    ///
    /// The tool check only applies when a harvester is supplied.
    ///
    /// # Errors
    ///
    /// Returns the first failing precondition.
    pub fn check_harvestable(&self, harvester: Option<&dyn Harvester>) -> Result<(), WorldError> {
        if self.is_dead() {
            return Err(WorldError::PlantDead);
        }
        if !self.is_mature() {
            return Err(WorldError::NotMature {
                stage: self.stage,
                stage_count: self.stage_count(),
            });
        }
        let limit = self.definition.harvest_limit;
        if limit != 0 && self.harvested_count >= limit {
            return Err(WorldError::HarvestLimitReached { limit });
        }
        if self.cooldown_remaining > 0.0 {
            return Err(WorldError::OnCooldown {
                remaining: self.cooldown_remaining,
            });
        }
        let tool = self.definition.tool_required;
        if tool != ToolKind::None && harvester.is_some_and(|h| !h.has_tool(tool)) {
            return Err(WorldError::MissingTool { tool });
        }
        Ok(())
    }

    /// Harvest the plant.
    ///
    /// Delivers fruit (for plants that drop fruit on harvest and have ripe
    /// fruit) and then each configured harvest product, counts the harvest,
    /// starts the cooldown and knocks the plant back one stage.
    ///
    /// # Errors
    ///
    /// Returns the first failing precondition (see
    /// [`check_harvestable`](Self::check_harvestable)); the plant is not
    /// modified.
    pub fn try_harvest(
        &mut self,
        mut harvester: Option<&mut dyn Harvester>,
        materializer: &dyn Materializer,
    ) -> Result<HarvestOutcome, WorldError> {
        self.check_harvestable(harvester.as_deref())?;

        let mut outcome = HarvestOutcome::default();
        let def = &self.definition;

        if def.has_fruit
            && def.fruit_drop_mode == FruitDropMode::Harvested
            && self.stage >= def.fruit_mature_stage
        {
            for _ in 0..def.fruit_yield {
                deliver(&def.fruit_item, harvester.as_deref_mut(), materializer, &mut outcome);
            }
        }
        for product in &def.harvest_products {
            deliver(product, harvester.as_deref_mut(), materializer, &mut outcome);
        }

        self.harvested_count = self.harvested_count.saturating_add(1);
        self.cooldown_remaining = self.definition.harvest_cooldown_seconds.max(0.0);
        self.stage = self.stage.saturating_sub(1);

        info!(
            plant = %self.id,
            name = self.definition.display_name,
            products = outcome.products.len(),
            on_ground = outcome.ground.len(),
            harvested_count = self.harvested_count,
            stage = self.stage,
            "Plant harvested"
        );
        Ok(outcome)
    }

    /// Harvest the plant, returning an empty outcome if any precondition
    /// fails.
    pub fn harvest(
        &mut self,
        harvester: Option<&mut dyn Harvester>,
        materializer: &dyn Materializer,
    ) -> HarvestOutcome {
        self.try_harvest(harvester, materializer).unwrap_or_else(|e| {
            debug!(plant = %self.id, reason = %e, "Harvest refused");
            HarvestOutcome::default()
        })
    }

    /// Chop the plant down.
    ///
    /// Only living trees can be chopped, and a supplied chopper must carry
    /// an axe. Delivers each chop product and then kills the plant.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::PlantDead`], [`WorldError::NotChoppable`] or
    /// [`WorldError::MissingTool`]; the plant is not modified.
    pub fn try_chop(
        &mut self,
        mut chopper: Option<&mut dyn Harvester>,
        materializer: &dyn Materializer,
    ) -> Result<HarvestOutcome, WorldError> {
        if self.is_dead() {
            return Err(WorldError::PlantDead);
        }
        if self.definition.kind != PlantKind::Tree {
            return Err(WorldError::NotChoppable {
                kind: self.definition.kind,
            });
        }
        if chopper.as_deref().is_some_and(|c| !c.has_tool(ToolKind::Axe)) {
            return Err(WorldError::MissingTool {
                tool: ToolKind::Axe,
            });
        }

        let mut outcome = HarvestOutcome::default();
        for product in &self.definition.chop_products {
            deliver(product, chopper.as_deref_mut(), materializer, &mut outcome);
        }
        outcome.death = self.die(DeathCause::Chopped);
        Ok(outcome)
    }

    /// Chop the plant down, returning an empty outcome if it cannot be
    /// chopped.
    pub fn chop(
        &mut self,
        chopper: Option<&mut dyn Harvester>,
        materializer: &dyn Materializer,
    ) -> HarvestOutcome {
        self.try_chop(chopper, materializer).unwrap_or_else(|e| {
            debug!(plant = %self.id, reason = %e, "Chop refused");
            HarvestOutcome::default()
        })
    }

    /// Kill the plant. Returns the death record the first time, `None` if
    /// it was already dead.
    pub fn kill(&mut self, cause: DeathCause) -> Option<PlantDeath> {
        self.die(cause)
    }

    fn die(&mut self, cause: DeathCause) -> Option<PlantDeath> {
        if self.is_dead() {
            return None;
        }
        self.death_cause = Some(cause);
        info!(
            plant = %self.id,
            name = self.definition.display_name,
            cause = %cause,
            age = self.age,
            "Plant died"
        );
        Some(PlantDeath {
            plant: self.id,
            cause,
            cell: self.cell,
            remains: self
                .definition
                .remains
                .clone()
                .filter(|r| !r.is_empty()),
        })
    }

    /// Summary for display and remote callers.
    pub fn info(&self) -> PlantInfo {
        PlantInfo {
            name: self.definition.display_name.clone(),
            kind: self.definition.kind,
            stage: format!("{}/{}", self.stage, self.stage_count()),
            age: self.age,
            lifespan: self.definition.lifespan_seconds,
            is_dead: self.is_dead(),
            has_fruit: self.definition.has_fruit,
            can_harvest: self.check_harvestable(None).is_ok(),
            rarity: self.definition.rarity,
            usage: self.definition.usage,
        }
    }
}

/// Materialize one product and hand it to the harvester, or to the ground
/// when there is no harvester or it is full.
fn deliver(
    reference: &str,
    harvester: Option<&mut (dyn Harvester + '_)>,
    materializer: &dyn Materializer,
    outcome: &mut HarvestOutcome,
) {
    let Some(item) = materializer.materialize(reference) else {
        warn!(reference, "Product failed to materialize");
        if !reference.is_empty() {
            outcome.products.push(reference.to_owned());
        }
        return;
    };
    outcome.products.push(item.id.clone());
    let stored = harvester.is_some_and(|h| h.store(&item));
    if !stored {
        debug!(item = item.id, "Harvester full, product placed on ground");
        outcome.ground.push(item);
    }
}

#[allow(clippy::cast_precision_loss)]
const fn stage_count_f32(count: u32) -> f32 {
    count as f32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use snowglobe_types::ItemCategory;

    use super::*;

    /// Materializes every reference except those listed as broken.
    struct TestCatalog {
        broken: Vec<&'static str>,
    }

    impl TestCatalog {
        fn new() -> Self {
            Self { broken: Vec::new() }
        }
    }

    impl Materializer for TestCatalog {
        fn materialize(&self, reference: &str) -> Option<ItemSpec> {
            if reference.is_empty() || self.broken.contains(&reference) {
                return None;
            }
            Some(ItemSpec::new(reference, 1.0, ItemCategory::Plant))
        }
    }

    /// Harvester with a fixed slot count and tool set.
    struct Basket {
        slots: usize,
        tools: Vec<ToolKind>,
        held: BTreeMap<String, u32>,
    }

    impl Basket {
        fn new(slots: usize) -> Self {
            Self {
                slots,
                tools: Vec::new(),
                held: BTreeMap::new(),
            }
        }

        fn total(&self) -> u32 {
            self.held.values().sum()
        }
    }

    impl Harvester for Basket {
        fn has_tool(&self, tool: ToolKind) -> bool {
            self.tools.contains(&tool)
        }

        fn store(&mut self, item: &ItemSpec) -> bool {
            let total = usize::try_from(self.total()).unwrap();
            if total >= self.slots {
                return false;
            }
            *self.held.entry(item.id.clone()).or_insert(0) += 1;
            true
        }
    }

    fn berry_bush() -> PlantDefinition {
        PlantDefinition {
            id: String::from("berry_bush"),
            display_name: String::from("Berry Bush"),
            growth_stages: 4,
            lifespan_seconds: 20.0,
            has_fruit: true,
            fruit_item: String::from("berry"),
            fruit_yield: 2,
            harvest_products: vec![String::from("leaf")],
            harvest_limit: 0,
            ..PlantDefinition::default()
        }
    }

    fn oak() -> PlantDefinition {
        PlantDefinition {
            id: String::from("oak"),
            display_name: String::from("Oak"),
            kind: PlantKind::Tree,
            lifespan_seconds: 0.0,
            chop_products: vec![String::from("log"), String::from("log")],
            remains: Some(String::from("stump")),
            ..PlantDefinition::default()
        }
    }

    fn matured(def: PlantDefinition) -> Plant {
        let mut plant = Plant::new(def, GridCell::new(1, 1));
        while plant.grow() {}
        plant
    }

    #[test]
    fn grows_one_stage_per_lifespan_fraction() {
        let mut plant = Plant::new(berry_bush(), GridCell::new(0, 0));
        assert!((plant.stage_duration() - 5.0).abs() < f32::EPSILON);

        let mut basket = Basket::new(10);
        let catalog = TestCatalog::new();

        assert!(plant.advance(5.0).grew);
        assert_eq!(plant.stage(), 1);
        assert!(plant.harvest(Some(&mut basket), &catalog).is_empty());

        plant.advance(5.0);
        assert_eq!(plant.stage(), 2);
        assert!(plant.harvest(Some(&mut basket), &catalog).is_empty());

        plant.advance(5.0);
        assert_eq!(plant.stage(), 3);
        assert!(plant.is_mature());
        assert_eq!(basket.total(), 0);
    }

    #[test]
    fn dies_when_age_reaches_lifespan() {
        let mut plant = Plant::new(berry_bush(), GridCell::new(2, 3));
        for _ in 0..3 {
            assert!(plant.advance(5.0).death.is_none());
        }
        let tick = plant.advance(5.0);
        let death = tick.death.unwrap();
        assert!(plant.is_dead());
        assert_eq!(death.cause, DeathCause::LifespanExhausted);
        assert_eq!(death.cell, GridCell::new(2, 3));
        assert!(!tick.grew);

        // Terminal: nothing changes afterwards.
        let after = plant.advance(5.0);
        assert_eq!(after, PlantTick::default());
        assert!(!plant.grow());
    }

    #[test]
    fn immortal_plant_uses_fallback_duration() {
        let mut plant = Plant::new(oak(), GridCell::new(0, 0));
        assert!((plant.stage_duration() - DEFAULT_FALLBACK_STAGE_SECONDS).abs() < f32::EPSILON);
        plant.advance(9.0);
        assert_eq!(plant.stage(), 0);
        plant.advance(1.0);
        assert_eq!(plant.stage(), 1);
        plant.advance(1000.0);
        assert!(!plant.is_dead());

        let quick = Plant::new(oak(), GridCell::new(0, 0)).with_fallback_stage_seconds(2.0);
        assert!((quick.stage_duration() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn harvest_delivers_fruit_then_products_and_regresses() {
        let mut plant = matured(berry_bush());
        let mut basket = Basket::new(10);
        let catalog = TestCatalog::new();

        let outcome = plant.harvest(Some(&mut basket), &catalog);
        assert_eq!(outcome.products, vec!["berry", "berry", "leaf"]);
        assert!(outcome.ground.is_empty());
        assert_eq!(basket.held.get("berry"), Some(&2));
        assert_eq!(plant.stage(), 2);
        assert_eq!(plant.harvested_count(), 1);

        // Below maturity now: the immediate second harvest is empty.
        let again = plant.harvest(Some(&mut basket), &catalog);
        assert!(again.is_empty());
        assert_eq!(plant.harvested_count(), 1);
    }

    #[test]
    fn full_harvester_spills_to_ground() {
        let mut plant = matured(berry_bush());
        let mut basket = Basket::new(1);
        let outcome = plant.harvest(Some(&mut basket), &TestCatalog::new());
        assert_eq!(outcome.products.len(), 3);
        assert_eq!(outcome.ground.len(), 2);
        assert_eq!(basket.total(), 1);
    }

    #[test]
    fn harvest_without_harvester_places_everything_on_ground() {
        let mut plant = matured(berry_bush());
        let outcome = plant.harvest(None, &TestCatalog::new());
        assert_eq!(outcome.products.len(), 3);
        assert_eq!(outcome.ground.len(), 3);
    }

    #[test]
    fn unmaterializable_products_pass_through_by_reference() {
        let mut plant = matured(berry_bush());
        let catalog = TestCatalog {
            broken: vec!["berry"],
        };
        let mut basket = Basket::new(10);
        let outcome = plant.harvest(Some(&mut basket), &catalog);
        assert_eq!(outcome.products, vec!["berry", "berry", "leaf"]);
        assert_eq!(basket.total(), 1);
    }

    #[test]
    fn harvest_limit_is_enforced() {
        let def = PlantDefinition {
            harvest_limit: 1,
            ..berry_bush()
        };
        let mut plant = matured(def);
        let catalog = TestCatalog::new();
        assert!(!plant.harvest(None, &catalog).is_empty());
        plant.grow();
        assert!(matches!(
            plant.check_harvestable(None),
            Err(WorldError::HarvestLimitReached { limit: 1 })
        ));
    }

    #[test]
    fn cooldown_blocks_until_elapsed() {
        let def = PlantDefinition {
            harvest_cooldown_seconds: 3.0,
            lifespan_seconds: 0.0,
            ..berry_bush()
        };
        let mut plant = matured(def);
        let catalog = TestCatalog::new();
        assert!(!plant.harvest(None, &catalog).is_empty());
        plant.grow();
        assert!(matches!(
            plant.check_harvestable(None),
            Err(WorldError::OnCooldown { .. })
        ));
        plant.advance(2.0);
        assert!(plant.check_harvestable(None).is_err());
        plant.advance(1.5);
        assert!(plant.cooldown_remaining().abs() < f32::EPSILON);
        assert!(plant.check_harvestable(None).is_ok());
    }

    #[test]
    fn required_tool_is_checked_only_for_present_harvesters() {
        let def = PlantDefinition {
            tool_required: ToolKind::Sickle,
            ..berry_bush()
        };
        let mut plant = matured(def);
        let catalog = TestCatalog::new();
        let mut bare_hands = Basket::new(10);
        let result = plant.try_harvest(Some(&mut bare_hands), &catalog);
        assert!(matches!(
            result,
            Err(WorldError::MissingTool {
                tool: ToolKind::Sickle
            })
        ));
        assert_eq!(plant.stage(), 3);

        let mut equipped = Basket::new(10);
        equipped.tools.push(ToolKind::Sickle);
        assert!(plant.try_harvest(Some(&mut equipped), &catalog).is_ok());
    }

    #[test]
    fn chop_non_tree_is_refused_and_plant_lives() {
        let mut plant = matured(berry_bush());
        let outcome = plant.chop(None, &TestCatalog::new());
        assert!(outcome.is_empty());
        assert!(outcome.death.is_none());
        assert!(!plant.is_dead());
    }

    #[test]
    fn chop_tree_yields_products_and_kills() {
        let mut plant = Plant::new(oak(), GridCell::new(4, 4));
        let mut lumberjack = Basket::new(10);
        lumberjack.tools.push(ToolKind::Axe);
        let outcome = plant.chop(Some(&mut lumberjack), &TestCatalog::new());
        assert_eq!(outcome.products, vec!["log", "log"]);
        assert!(plant.is_dead());
        let death = outcome.death.unwrap();
        assert_eq!(death.cause, DeathCause::Chopped);
        assert_eq!(death.remains.as_deref(), Some("stump"));
        assert_eq!(death.cell, GridCell::new(4, 4));

        // Dead trees cannot be chopped again.
        assert!(plant.chop(None, &TestCatalog::new()).is_empty());
    }

    #[test]
    fn chop_without_axe_is_refused() {
        let mut plant = Plant::new(oak(), GridCell::new(0, 0));
        let mut bare_hands = Basket::new(10);
        let outcome = plant.chop(Some(&mut bare_hands), &TestCatalog::new());
        assert!(outcome.is_empty());
        assert!(!plant.is_dead());
    }

    #[test]
    fn kill_only_reports_once() {
        let mut plant = Plant::new(oak(), GridCell::new(0, 0));
        assert!(plant.kill(DeathCause::Environment).is_some());
        assert!(plant.kill(DeathCause::SeasonEnd).is_none());
        assert_eq!(plant.death_cause(), Some(DeathCause::Environment));
    }

    #[test]
    fn automatic_drop_flags_ripe_fruit() {
        let def = PlantDefinition {
            fruit_drop_mode: FruitDropMode::Automatic,
            fruit_mature_stage: 2,
            lifespan_seconds: 0.0,
            ..berry_bush()
        };
        let mut plant = Plant::new(def, GridCell::new(0, 0));
        assert!(!plant.advance(10.0).fruit_ripe);
        assert!(plant.advance(10.0).fruit_ripe);

        // Automatic plants do not hand fruit out on harvest.
        while plant.grow() {}
        let outcome = plant.harvest(None, &TestCatalog::new());
        assert_eq!(outcome.products, vec!["leaf"]);
    }

    #[test]
    fn info_reports_stage_and_harvestability() {
        let plant = matured(berry_bush());
        let info = plant.info();
        assert_eq!(info.stage, "3/4");
        assert!(info.can_harvest);
        assert!(!info.is_dead);
        assert_eq!(info.name, "Berry Bush");
    }

    #[test]
    fn definition_fills_defaults_from_json() {
        let def: PlantDefinition =
            serde_json::from_str(r#"{"id": "fern", "kind": "grass", "growth_stages": 2}"#).unwrap();
        assert_eq!(def.growth_stages, 2);
        assert_eq!(def.fruit_yield, 1);
        assert_eq!(def.harvest_limit, 1);
        assert!((def.lifespan_seconds - 100.0).abs() < f32::EPSILON);
    }
}
