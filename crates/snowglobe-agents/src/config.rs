//! Configuration constants and defaults for characters.
//!
//! [`CharacterConfig`] bundles every tunable a new character is built from.
//! It deserializes from the `character` section of `snowglobe-config.yaml`;
//! any field left out takes its default.

use serde::Deserialize;

/// Tunables for character creation, movement, and interaction range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CharacterConfig {
    /// Free walking speed in world units per second (default: 256).
    pub walk_speed: f32,

    /// Speed while following a path (default: 256).
    pub path_speed: f32,

    /// Running speed (default: 400).
    pub run_speed: f32,

    /// Maximum and starting health (default: 100).
    pub max_health: i32,

    /// Maximum and starting hunger (default: 10).
    pub max_hunger: i32,

    /// Maximum and starting energy (default: 10).
    pub max_energy: i32,

    /// Maximum and starting thirst (default: 10).
    pub max_thirst: i32,

    /// Starting value of every base stat and skill (default: 1).
    pub base_stat: i32,

    /// Carrying capacity granted per point of strength (default: 10).
    pub capacity_per_strength: f32,

    /// Distance at which a path waypoint counts as reached (default: 10).
    pub arrival_threshold: f32,

    /// Interaction range factor for male characters (default: 1.2).
    pub male_range_factor: f32,

    /// Interaction range factor for female characters (default: 1.0).
    pub female_range_factor: f32,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            walk_speed: 256.0,
            path_speed: 256.0,
            run_speed: 400.0,
            max_health: 100,
            max_hunger: 10,
            max_energy: 10,
            max_thirst: 10,
            base_stat: 1,
            capacity_per_strength: 10.0,
            arrival_threshold: 10.0,
            male_range_factor: 1.2,
            female_range_factor: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = CharacterConfig::default();
        assert!((config.path_speed - 256.0).abs() < f32::EPSILON);
        assert!((config.run_speed - 400.0).abs() < f32::EPSILON);
        assert_eq!(config.max_health, 100);
        assert_eq!(config.max_hunger, 10);
        assert!((config.arrival_threshold - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: CharacterConfig =
            serde_json::from_str(r#"{"max_health": 80, "male_range_factor": 1.5}"#)
                .unwrap_or_default();
        assert_eq!(config.max_health, 80);
        assert!((config.male_range_factor - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.base_stat, 1);
    }
}
