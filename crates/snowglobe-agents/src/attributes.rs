//! Typed character attributes.
//!
//! Every character has the same fixed set of stats, vitals, speeds and
//! status flags, addressed by enum rather than by name. Item effects and
//! weapons are written against the [`CharacterAttributes`] trait so they work
//! on anything that exposes these attributes.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use snowglobe_types::{Gender, SpeedKind, Stat, StatusFlag, Vital};

use crate::config::CharacterConfig;

/// Read and write access to a character's attributes.
pub trait CharacterAttributes {
    /// Gender, which scales interaction range.
    fn gender(&self) -> Gender;

    /// Current value of a stat or skill.
    fn stat(&self, stat: Stat) -> i32;

    /// Overwrite a stat or skill.
    fn set_stat(&mut self, stat: Stat, value: i32);

    /// Current value of a vital.
    fn vital(&self, vital: Vital) -> i32;

    /// Maximum value of a vital.
    fn vital_max(&self, vital: Vital) -> i32;

    /// Overwrite a vital. Implementations clamp to `0..=max`.
    fn set_vital(&mut self, vital: Vital, value: i32);

    /// A movement speed.
    fn speed(&self, kind: SpeedKind) -> f32;

    /// Overwrite a movement speed.
    fn set_speed(&mut self, kind: SpeedKind, value: f32);

    /// Whether a status flag is set.
    fn flag(&self, flag: StatusFlag) -> bool;

    /// Set or clear a status flag.
    fn set_flag(&mut self, flag: StatusFlag, on: bool);

    /// Add `delta` to a stat.
    fn adjust_stat(&mut self, stat: Stat, delta: i32) {
        let value = self.stat(stat).saturating_add(delta);
        self.set_stat(stat, value);
    }

    /// Add `amount` to a vital, clamped to `0..=max`. Returns the change
    /// actually applied.
    fn restore_vital(&mut self, vital: Vital, amount: i32) -> i32 {
        let before = self.vital(vital);
        let target = before.saturating_add(amount).clamp(0, self.vital_max(vital).max(0));
        self.set_vital(vital, target);
        target.saturating_sub(before)
    }

    /// Add `delta` to a speed.
    fn adjust_speed(&mut self, kind: SpeedKind, delta: f32) {
        let value = self.speed(kind) + delta;
        self.set_speed(kind, value);
    }
}

/// Current and maximum value of one vital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VitalValue {
    /// Current value.
    pub current: i32,
    /// Maximum value.
    pub max: i32,
}

/// Plain attribute storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    /// Gender.
    pub gender: Gender,
    /// Base stats and skills.
    pub stats: BTreeMap<Stat, i32>,
    /// Vitals with their maxima.
    pub vitals: BTreeMap<Vital, VitalValue>,
    /// Movement speeds.
    pub speeds: BTreeMap<SpeedKind, f32>,
    /// Status flags that are set.
    pub flags: BTreeSet<StatusFlag>,
}

impl Attributes {
    /// Fresh attributes from configuration: every stat at `base_stat`,
    /// every vital full, no flags.
    pub fn new(gender: Gender, config: &CharacterConfig) -> Self {
        let stats = Stat::ALL.iter().map(|&s| (s, config.base_stat)).collect();
        let vitals = Vital::ALL
            .iter()
            .map(|&v| {
                let max = match v {
                    Vital::Health => config.max_health,
                    Vital::Hunger => config.max_hunger,
                    Vital::Energy => config.max_energy,
                    Vital::Thirst => config.max_thirst,
                };
                (v, VitalValue { current: max, max })
            })
            .collect();
        let speeds = BTreeMap::from([
            (SpeedKind::Walk, config.walk_speed),
            (SpeedKind::Path, config.path_speed),
            (SpeedKind::Run, config.run_speed),
        ]);
        Self {
            gender,
            stats,
            vitals,
            speeds,
            flags: BTreeSet::new(),
        }
    }
}

impl CharacterAttributes for Attributes {
    fn gender(&self) -> Gender {
        self.gender
    }

    fn stat(&self, stat: Stat) -> i32 {
        self.stats.get(&stat).copied().unwrap_or(0)
    }

    fn set_stat(&mut self, stat: Stat, value: i32) {
        self.stats.insert(stat, value);
    }

    fn vital(&self, vital: Vital) -> i32 {
        self.vitals.get(&vital).map_or(0, |v| v.current)
    }

    fn vital_max(&self, vital: Vital) -> i32 {
        self.vitals.get(&vital).map_or(0, |v| v.max)
    }

    fn set_vital(&mut self, vital: Vital, value: i32) {
        let entry = self.vitals.entry(vital).or_insert(VitalValue { current: 0, max: 0 });
        entry.current = value.clamp(0, entry.max.max(0));
    }

    fn speed(&self, kind: SpeedKind) -> f32 {
        self.speeds.get(&kind).copied().unwrap_or(0.0)
    }

    fn set_speed(&mut self, kind: SpeedKind, value: f32) {
        self.speeds.insert(kind, value);
    }

    fn flag(&self, flag: StatusFlag) -> bool {
        self.flags.contains(&flag)
    }

    fn set_flag(&mut self, flag: StatusFlag, on: bool) {
        if on {
            self.flags.insert(flag);
        } else {
            self.flags.remove(&flag);
        }
    }
}
