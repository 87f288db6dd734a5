//! Error types for the snowglobe-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Every variant is local and recoverable: a rejected add leaves the
//! inventory untouched, an out-of-range interaction simply does not happen.

use snowglobe_types::Stat;
use snowglobe_world::WorldError;

/// Errors that can occur during character operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Adding the items would push the inventory past its capacity.
    #[error("overweight: adding {added_weight} of {item} would exceed capacity (current: {current_weight}, capacity: {capacity})")]
    Overweight {
        /// The item being added.
        item: String,
        /// Weight of the attempted addition.
        added_weight: f32,
        /// Inventory weight before the attempt.
        current_weight: f32,
        /// Inventory capacity.
        capacity: f32,
    },

    /// The item is not in the inventory.
    #[error("item not found: {0}")]
    NotFound(String),

    /// Attempted to remove more of an item than is held.
    #[error("insufficient quantity: wanted {requested} of {item} but only have {available}")]
    InsufficientQuantity {
        /// The item being removed.
        item: String,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// A unit weight was negative or not a number.
    #[error("invalid unit weight {weight} for {item}")]
    InvalidWeight {
        /// The item being added.
        item: String,
        /// The rejected weight.
        weight: f32,
    },

    /// The target is farther away than the character can reach.
    #[error("target out of range: distance {distance} exceeds {max_distance}")]
    OutOfRange {
        /// Grid distance to the target.
        distance: f32,
        /// The character's maximum interaction distance.
        max_distance: f32,
    },

    /// The item cannot be planted.
    #[error("item is not plantable: {0}")]
    NotPlantable(String),

    /// A stat is below what an action requires.
    #[error("{stat:?} too low: need {required}, have {actual}")]
    SkillTooLow {
        /// The stat that was checked.
        stat: Stat,
        /// Required level.
        required: i32,
        /// Actual level.
        actual: i32,
    },

    /// Unequip was requested with nothing equipped.
    #[error("nothing equipped")]
    NothingEquipped,

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}
