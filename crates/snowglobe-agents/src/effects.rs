//! Consumable effects and stat modifiers.
//!
//! Consumables apply immediate restoration (health, energy, hunger, thirst),
//! clear status flags, and optionally buff stats and speeds. Permanent buffs
//! stay forever. Temporary buffs come back as a [`BuffReversal`] which the
//! caller schedules and applies once the duration has elapsed, provided the
//! target still exists.
//!
//! All restoration is clamped to `0..=max` by [`CharacterAttributes`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use snowglobe_types::{SpeedKind, Stat, StatusFlag, Vital};
use tracing::debug;

use crate::attributes::CharacterAttributes;

// ---------------------------------------------------------------------------
// Stat modifiers
// ---------------------------------------------------------------------------

/// Additive deltas to stats and speeds.
///
/// Used for consumable buffs and weapon bonuses. Applying then removing the
/// same modifiers restores the original values exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatModifiers {
    /// Stat and skill deltas.
    pub stats: BTreeMap<Stat, i32>,
    /// Movement speed deltas.
    pub speeds: BTreeMap<SpeedKind, f32>,
}

impl StatModifiers {
    /// Whether every delta is zero.
    pub fn is_empty(&self) -> bool {
        self.stats.values().all(|&d| d == 0) && self.speeds.values().all(|&d| d == 0.0)
    }

    /// Add every delta to `target`.
    pub fn apply<A: CharacterAttributes + ?Sized>(&self, target: &mut A) {
        self.apply_scaled(target, 1);
    }

    /// Subtract every delta from `target`.
    pub fn remove<A: CharacterAttributes + ?Sized>(&self, target: &mut A) {
        self.apply_scaled(target, -1);
    }

    /// The equal and opposite modifiers.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            stats: self
                .stats
                .iter()
                .map(|(&s, &d)| (s, d.saturating_neg()))
                .collect(),
            speeds: self.speeds.iter().map(|(&k, &d)| (k, -d)).collect(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn apply_scaled<A: CharacterAttributes + ?Sized>(&self, target: &mut A, sign: i32) {
        for (&stat, &delta) in &self.stats {
            if delta != 0 {
                target.adjust_stat(stat, delta.saturating_mul(sign));
            }
        }
        for (&kind, &delta) in &self.speeds {
            if delta != 0.0 {
                target.adjust_speed(kind, delta * sign as f32);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Consumables
// ---------------------------------------------------------------------------

/// Parameters of a consumable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumableDefinition {
    /// Health restored (default: 50).
    pub healing_amount: i32,
    /// Energy restored.
    pub energy_amount: i32,
    /// Hunger restored; also clears the hungry flag.
    pub hunger_restore: i32,
    /// Thirst restored; also clears the thirsty flag.
    pub thirst_restore: i32,
    /// Seconds a temporary buff lasts. Zero means no temporary buff.
    pub buff_duration: f32,
    /// Whether the buffs are permanent.
    pub is_permanent_buff: bool,
    /// Stat and speed buffs.
    pub buffs: StatModifiers,
    /// Clears the sick flag.
    pub cure_poison: bool,
    /// Clears the sick flag.
    pub cure_sickness: bool,
    /// Clears the stressed flag.
    pub remove_stress: bool,
    /// Clears the injured flag.
    pub cure_injury: bool,
    /// Clears the tired flag.
    pub cure_tiredness: bool,
    /// Sets the resting flag.
    pub set_resting: bool,
    /// Clears the tired flag and fills energy.
    pub set_energized: bool,
    /// Weight of one unit (default: 0.1).
    pub weight: f32,
}

impl Default for ConsumableDefinition {
    fn default() -> Self {
        Self {
            healing_amount: 50,
            energy_amount: 0,
            hunger_restore: 0,
            thirst_restore: 0,
            buff_duration: 0.0,
            is_permanent_buff: false,
            buffs: StatModifiers::default(),
            cure_poison: false,
            cure_sickness: false,
            remove_stress: false,
            cure_injury: false,
            cure_tiredness: false,
            set_resting: false,
            set_energized: false,
            weight: 0.1,
        }
    }
}

/// A temporary buff waiting to be undone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuffReversal {
    /// The modifiers that were applied; removing them undoes the buff.
    pub modifiers: StatModifiers,
    /// Seconds until the reversal is due.
    pub duration: f32,
}

impl BuffReversal {
    /// Undo the buff on `target`.
    pub fn revert<A: CharacterAttributes + ?Sized>(&self, target: &mut A) {
        self.modifiers.remove(target);
        debug!("Temporary buff expired");
    }
}

/// What a consumable did to its target.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsumeOutcome {
    /// Change applied to each vital.
    pub restored: BTreeMap<Vital, i32>,
    /// Flags that were cleared.
    pub cleared: Vec<StatusFlag>,
    /// Flags that were set.
    pub set: Vec<StatusFlag>,
    /// Reversal to schedule for a temporary buff.
    pub reversal: Option<BuffReversal>,
}

/// Apply a consumable to `target`.
pub fn apply_consumable<A: CharacterAttributes + ?Sized>(
    definition: &ConsumableDefinition,
    target: &mut A,
) -> ConsumeOutcome {
    let mut outcome = ConsumeOutcome::default();

    for (vital, amount) in [
        (Vital::Health, definition.healing_amount),
        (Vital::Energy, definition.energy_amount),
        (Vital::Hunger, definition.hunger_restore),
        (Vital::Thirst, definition.thirst_restore),
    ] {
        if amount > 0 {
            let applied = target.restore_vital(vital, amount);
            outcome.restored.insert(vital, applied);
        }
    }
    if definition.hunger_restore > 0 {
        clear(target, StatusFlag::Hungry, &mut outcome);
    }
    if definition.thirst_restore > 0 {
        clear(target, StatusFlag::Thirsty, &mut outcome);
    }

    if definition.cure_poison || definition.cure_sickness {
        clear(target, StatusFlag::Sick, &mut outcome);
    }
    if definition.remove_stress {
        clear(target, StatusFlag::Stressed, &mut outcome);
    }
    if definition.cure_injury {
        clear(target, StatusFlag::Injured, &mut outcome);
    }
    if definition.cure_tiredness {
        clear(target, StatusFlag::Tired, &mut outcome);
    }
    if definition.set_resting {
        target.set_flag(StatusFlag::Resting, true);
        outcome.set.push(StatusFlag::Resting);
    }
    if definition.set_energized {
        clear(target, StatusFlag::Tired, &mut outcome);
        let max = target.vital_max(Vital::Energy);
        target.set_vital(Vital::Energy, max);
    }

    if definition.is_permanent_buff {
        definition.buffs.apply(target);
    } else if definition.buff_duration > 0.0 && !definition.buffs.is_empty() {
        definition.buffs.apply(target);
        outcome.reversal = Some(BuffReversal {
            modifiers: definition.buffs.clone(),
            duration: definition.buff_duration,
        });
    }

    outcome
}

fn clear<A: CharacterAttributes + ?Sized>(target: &mut A, flag: StatusFlag, outcome: &mut ConsumeOutcome) {
    if target.flag(flag) {
        target.set_flag(flag, false);
        outcome.cleared.push(flag);
    }
}
