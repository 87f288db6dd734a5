//! Enumeration types for the Snow Globe simulation.
//!
//! Enums that appear in item and plant definition files serialize as
//! `snake_case` strings (`"weapon"`, `"axe"`, `"survival_skills"`), which is
//! the spelling used by the JSON catalog.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Category of an item held in an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Weapons and tools that can be equipped.
    Weapon,
    /// Plant matter (seedlings, cuttings, remains).
    Plant,
    /// Items consumed on use.
    Consumable,
    /// Consumables that may also be planted.
    Fruit,
    /// Anything the catalog cannot classify.
    #[default]
    Unknown,
}

impl core::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Weapon => "weapon",
            Self::Plant => "plant",
            Self::Consumable => "consumable",
            Self::Fruit => "fruit",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Tool class an item provides, checked by harvest and chop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// No tool needed.
    #[default]
    None,
    /// Cuts grasses and crops.
    Sickle,
    /// Fells trees.
    Axe,
    /// Works soil.
    Hoe,
}

// ---------------------------------------------------------------------------
// Plants
// ---------------------------------------------------------------------------

/// Broad growth form of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlantKind {
    /// Low grasses, herbs and crops.
    #[default]
    Grass,
    /// Woody trees; the only kind that can be chopped.
    Tree,
    /// Succulents.
    Cactus,
}

impl core::fmt::Display for PlantKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Grass => "grass",
            Self::Tree => "tree",
            Self::Cactus => "cactus",
        };
        f.write_str(name)
    }
}

/// How a fruiting plant releases its fruit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FruitDropMode {
    /// Fruit falls on its own once ripe.
    Automatic,
    /// Fruit is only released by harvesting.
    #[default]
    Harvested,
}

/// Why a plant died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Age reached the configured lifespan.
    #[default]
    LifespanExhausted,
    /// The growing season ended.
    SeasonEnd,
    /// Conditions (soil, humidity, temperature) became hostile.
    Environment,
    /// Felled by a character.
    Chopped,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::LifespanExhausted => "lifespan exhausted",
            Self::SeasonEnd => "season ended",
            Self::Environment => "hostile environment",
            Self::Chopped => "chopped",
        };
        f.write_str(name)
    }
}

/// Rarity tier shown in plant info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    /// Found everywhere.
    #[default]
    Common,
    /// Found in some places.
    Uncommon,
    /// Hard to find.
    Rare,
    /// Very hard to find.
    Epic,
    /// Unique.
    Legendary,
}

/// What a plant is mainly good for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Usage {
    /// Eaten.
    #[default]
    Food,
    /// Brewed into remedies.
    Medicine,
    /// Used as a building or crafting material.
    Material,
    /// Purely ornamental.
    Decoration,
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Gender of a character. Affects the interaction range factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Range factor 1.2 by default.
    #[default]
    Male,
    /// Range factor 1.0 by default.
    Female,
}

/// Life stage of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    /// Child.
    Child,
    /// Teenager.
    Teen,
    /// Adult.
    #[default]
    Adult,
    /// Elder.
    Elder,
}

/// A numeric base stat or skill of a character.
///
/// Base stats and skills share one namespace so that buffs, weapon bonuses
/// and item requirements can name either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    /// Intelligence.
    Intelligence,
    /// Strength; drives carrying capacity and interaction range.
    Strength,
    /// Agility.
    Agility,
    /// Charisma.
    Charisma,
    /// Endurance.
    Endurance,
    /// Luck.
    Luck,
    /// Perception.
    Perception,
    /// Wisdom.
    Wisdom,
    /// Mental strength skill.
    MentalStrength,
    /// Social skill.
    SocialSkills,
    /// Combat skill.
    CombatSkills,
    /// Crafting skill.
    CraftingSkills,
    /// Survival skill; also the farming requirement for planting fruit.
    SurvivalSkills,
    /// Stealth skill.
    StealthSkills,
    /// Cooking skill.
    Cooking,
}

impl Stat {
    /// Every stat, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Intelligence,
        Self::Strength,
        Self::Agility,
        Self::Charisma,
        Self::Endurance,
        Self::Luck,
        Self::Perception,
        Self::Wisdom,
        Self::MentalStrength,
        Self::SocialSkills,
        Self::CombatSkills,
        Self::CraftingSkills,
        Self::SurvivalSkills,
        Self::StealthSkills,
        Self::Cooking,
    ];
}

/// A bounded vital with a current value and a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vital {
    /// Hit points.
    Health,
    /// Satiation; restored by food.
    Hunger,
    /// Stamina.
    Energy,
    /// Hydration; restored by drink.
    Thirst,
}

impl Vital {
    /// Every vital, in declaration order.
    pub const ALL: [Self; 4] = [Self::Health, Self::Hunger, Self::Energy, Self::Thirst];
}

/// One of the movement speeds of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedKind {
    /// Free walking.
    Walk,
    /// Following a computed path.
    Path,
    /// Running.
    Run,
}

/// Boolean status flags on a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFlag {
    /// Needs food.
    Hungry,
    /// Needs water.
    Thirsty,
    /// Needs rest.
    Tired,
    /// Poisoned or ill.
    Sick,
    /// Wounded.
    Injured,
    /// Under stress.
    Stressed,
    /// Resting.
    Resting,
    /// Asleep.
    Sleeping,
    /// Fighting.
    InCombat,
    /// Currently following a path.
    Moving,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Kind of entity tracked by the world's spatial registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A growing plant.
    Plant,
    /// An item lying on the ground.
    Item,
    /// A character.
    Character,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Stat::SurvivalSkills).ok();
        assert_eq!(json.as_deref(), Some("\"survival_skills\""));
        let tool: Result<ToolKind, _> = serde_json::from_str("\"axe\"");
        assert_eq!(tool.ok(), Some(ToolKind::Axe));
    }

    #[test]
    fn display_names_are_lowercase() {
        assert_eq!(ItemCategory::Fruit.to_string(), "fruit");
        assert_eq!(PlantKind::Tree.to_string(), "tree");
        assert_eq!(DeathCause::Chopped.to_string(), "chopped");
    }

    #[test]
    fn stat_table_is_complete() {
        assert_eq!(Stat::ALL.len(), 15);
        assert!(Stat::ALL.contains(&Stat::Strength));
        assert_eq!(Vital::ALL.len(), 4);
    }
}
