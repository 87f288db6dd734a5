//! Plantable fruit.
//!
//! A fruit is a consumable that can also be put in the ground. Planting needs
//! enough survival skill; the plant it grows into is named by `plant`, a
//! catalog reference resolved by the caller.

use serde::{Deserialize, Serialize};
use snowglobe_types::Stat;

use crate::effects::ConsumableDefinition;
use crate::error::AgentError;

/// Parameters of a fruit item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FruitDefinition {
    /// Effects when eaten.
    #[serde(flatten)]
    pub consumable: ConsumableDefinition,
    /// Whether the fruit can be planted (default: true).
    pub is_plantable: bool,
    /// Catalog reference of the plant it grows into.
    pub plant: String,
    /// Nominal growth time in seconds (default: 60).
    pub growth_time: f32,
    /// Survival skill needed to plant it.
    pub required_farming_skill: i32,
}

impl Default for FruitDefinition {
    fn default() -> Self {
        Self {
            consumable: ConsumableDefinition::default(),
            is_plantable: true,
            plant: String::new(),
            growth_time: 60.0,
            required_farming_skill: 0,
        }
    }
}

/// Check whether a character with `survival_skill` may plant `fruit`.
///
/// # Errors
///
/// Returns [`AgentError::NotPlantable`] if the fruit cannot be planted or
/// names no plant, and [`AgentError::SkillTooLow`] if the skill falls short.
pub fn check_can_plant(
    item_id: &str,
    fruit: &FruitDefinition,
    survival_skill: i32,
) -> Result<(), AgentError> {
    if !fruit.is_plantable || fruit.plant.is_empty() {
        return Err(AgentError::NotPlantable(item_id.to_owned()));
    }
    if survival_skill < fruit.required_farming_skill {
        return Err(AgentError::SkillTooLow {
            stat: Stat::SurvivalSkills,
            required: fruit.required_farming_skill,
            actual: survival_skill,
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn apple() -> FruitDefinition {
        FruitDefinition {
            plant: String::from("apple_tree"),
            required_farming_skill: 2,
            ..FruitDefinition::default()
        }
    }

    #[test]
    fn skill_gate() {
        assert!(matches!(
            check_can_plant("apple", &apple(), 1),
            Err(AgentError::SkillTooLow { required: 2, actual: 1, .. })
        ));
        assert!(check_can_plant("apple", &apple(), 2).is_ok());
    }

    #[test]
    fn unplantable_fruit_is_rejected() {
        let mut fruit = apple();
        fruit.is_plantable = false;
        assert!(matches!(
            check_can_plant("apple", &fruit, 9),
            Err(AgentError::NotPlantable(_))
        ));
        assert!(check_can_plant("berry", &FruitDefinition::default(), 9).is_err());
    }

    #[test]
    fn flattened_consumable_fields() {
        let fruit: FruitDefinition = serde_json::from_str(
            r#"{"hunger_restore": 4, "plant": "res://items/apple_tree.json", "growth_time": 30.0}"#,
        )
        .unwrap();
        assert_eq!(fruit.consumable.hunger_restore, 4);
        assert_eq!(fruit.consumable.healing_amount, 50);
        assert!(fruit.is_plantable);
    }
}
