//! Interaction range gating.
//!
//! A character may only act on an entity whose containing cell is within its
//! gate distance. The gate grows with the natural log of strength and is
//! scaled by a per-gender factor:
//!
//! ```text
//! max_distance = max(1.0, factor * ln(max(strength, 1)))
//! grid_distance = max(1.0, manhattan(cell(from), cell(to)))
//! ```
//!
//! With strength 1 every character reaches exactly one cell.

use snowglobe_types::{Gender, WorldPos};
use snowglobe_world::GridMap;

use crate::config::CharacterConfig;
use crate::error::AgentError;

/// Range factor applied to male characters.
pub const MALE_RANGE_FACTOR: f32 = 1.2;

/// Range factor applied to female characters.
pub const FEMALE_RANGE_FACTOR: f32 = 1.0;

/// Gate distance with the default gender factors.
pub fn max_interact_distance(gender: Gender, strength: f32) -> f32 {
    InteractionGate::default().max_distance(gender, strength)
}

/// Manhattan distance in cells between the cells containing two positions,
/// floored at 1.
#[allow(clippy::cast_precision_loss)]
pub fn grid_distance<M: GridMap + ?Sized>(map: &M, from: WorldPos, to: WorldPos) -> f32 {
    let cells = map.world_to_cell(from).manhattan(map.world_to_cell(to));
    (cells as f32).max(1.0)
}

/// Per-gender range factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionGate {
    male_factor: f32,
    female_factor: f32,
}

impl Default for InteractionGate {
    fn default() -> Self {
        Self {
            male_factor: MALE_RANGE_FACTOR,
            female_factor: FEMALE_RANGE_FACTOR,
        }
    }
}

impl InteractionGate {
    /// Gate using the factors from character configuration.
    pub const fn from_config(config: &CharacterConfig) -> Self {
        Self {
            male_factor: config.male_range_factor,
            female_factor: config.female_range_factor,
        }
    }

    /// Range factor for a gender.
    pub const fn factor(&self, gender: Gender) -> f32 {
        match gender {
            Gender::Male => self.male_factor,
            Gender::Female => self.female_factor,
        }
    }

    /// Maximum interaction distance in cells.
    pub fn max_distance(&self, gender: Gender, strength: f32) -> f32 {
        (self.factor(gender) * strength.max(1.0).ln()).max(1.0)
    }

    /// Check whether a request is within range.
    ///
    /// Returns the grid distance on success.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OutOfRange`] when the target is too far away.
    pub fn check<M: GridMap + ?Sized>(
        &self,
        map: &M,
        request: &InteractionRequest,
    ) -> Result<f32, AgentError> {
        let distance = grid_distance(map, request.agent_position, request.target_position);
        let max_distance = self.max_distance(request.gender, request.strength);
        if distance <= max_distance {
            Ok(distance)
        } else {
            Err(AgentError::OutOfRange {
                distance,
                max_distance,
            })
        }
    }

    /// Whether a request is within range.
    pub fn is_permitted<M: GridMap + ?Sized>(&self, map: &M, request: &InteractionRequest) -> bool {
        self.check(map, request).is_ok()
    }
}

/// A single interaction attempt. Computed per attempt, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionRequest {
    /// Where the acting character stands.
    pub agent_position: WorldPos,
    /// Where the target stands.
    pub target_position: WorldPos,
    /// The acting character's gender.
    pub gender: Gender,
    /// The acting character's strength.
    pub strength: f32,
}
