//! Weapons: damage, durability, and equip bonuses.
//!
//! A weapon's bonuses are a [`StatModifiers`] applied when it is equipped
//! and removed when it is unequipped. Durability drops by one per use and
//! stops at zero. A broken weapon is reported but keeps working.

use serde::{Deserialize, Serialize};
use snowglobe_types::ToolKind;
use tracing::{debug, warn};

use crate::effects::StatModifiers;

/// Durability lost per use.
pub const DURABILITY_PER_USE: u32 = 1;

/// Parameters of a weapon item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponDefinition {
    /// Physical damage (default: 10).
    pub damage: i32,
    /// Fire damage.
    pub fire_damage: i32,
    /// Ice damage.
    pub ice_damage: i32,
    /// Poison damage.
    pub poison_damage: i32,
    /// Maximum and starting durability (default: 100).
    pub max_durability: u32,
    /// Attacks per second (default: 1.0).
    pub attack_speed: f32,
    /// Critical hit chance (default: 0.05).
    pub critical_chance: f32,
    /// Critical damage multiplier (default: 1.5).
    pub critical_damage: f32,
    /// Weight of one unit (default: 1.0).
    pub weight: f32,
    /// Tool class the weapon doubles as.
    pub tool: Option<ToolKind>,
    /// Stat and speed bonuses while equipped.
    pub bonuses: StatModifiers,
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            damage: 10,
            fire_damage: 0,
            ice_damage: 0,
            poison_damage: 0,
            max_durability: 100,
            attack_speed: 1.0,
            critical_chance: 0.05,
            critical_damage: 1.5,
            weight: 1.0,
            tool: None,
            bonuses: StatModifiers::default(),
        }
    }
}

/// A weapon instance with its own durability.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    item_id: String,
    definition: WeaponDefinition,
    durability: u32,
}

impl Weapon {
    /// A weapon at full durability.
    pub fn new(item_id: impl Into<String>, definition: WeaponDefinition) -> Self {
        let durability = definition.max_durability;
        Self {
            item_id: item_id.into(),
            definition,
            durability,
        }
    }

    /// Catalog id of the weapon item.
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    /// The weapon's parameters.
    pub const fn definition(&self) -> &WeaponDefinition {
        &self.definition
    }

    /// Remaining durability.
    pub const fn durability(&self) -> u32 {
        self.durability
    }

    /// Bonuses applied while equipped.
    pub const fn bonuses(&self) -> &StatModifiers {
        &self.definition.bonuses
    }

    /// Sum of every damage type.
    pub const fn total_damage(&self) -> i32 {
        self.definition
            .damage
            .saturating_add(self.definition.fire_damage)
            .saturating_add(self.definition.ice_damage)
            .saturating_add(self.definition.poison_damage)
    }

    /// Whether durability has reached zero.
    pub const fn is_broken(&self) -> bool {
        self.durability == 0
    }

    /// Use the weapon once. Returns the damage dealt.
    pub fn use_once(&mut self) -> i32 {
        let was_broken = self.is_broken();
        self.durability = self.durability.saturating_sub(DURABILITY_PER_USE);
        if self.is_broken() && !was_broken {
            warn!(weapon = %self.item_id, "Weapon broke");
        }
        self.total_damage()
    }

    /// Restore durability, capped at the maximum.
    pub fn repair(&mut self, amount: u32) {
        self.durability = self
            .durability
            .saturating_add(amount)
            .min(self.definition.max_durability);
        debug!(weapon = %self.item_id, durability = self.durability, "Weapon repaired");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sword() -> Weapon {
        Weapon::new(
            "iron_sword",
            WeaponDefinition {
                damage: 12,
                fire_damage: 3,
                poison_damage: 1,
                max_durability: 2,
                ..WeaponDefinition::default()
            },
        )
    }

    #[test]
    fn total_damage_sums_all_types() {
        assert_eq!(sword().total_damage(), 16);
    }

    #[test]
    fn durability_floors_at_zero_without_lockout() {
        let mut weapon = sword();
        assert_eq!(weapon.use_once(), 16);
        assert!(!weapon.is_broken());
        weapon.use_once();
        assert!(weapon.is_broken());
        assert_eq!(weapon.use_once(), 16);
        assert_eq!(weapon.durability(), 0);
    }

    #[test]
    fn repair_is_capped() {
        let mut weapon = sword();
        weapon.use_once();
        weapon.use_once();
        weapon.repair(1);
        assert_eq!(weapon.durability(), 1);
        weapon.repair(50);
        assert_eq!(weapon.durability(), 2);
    }
}
