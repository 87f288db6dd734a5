//! Shared type definitions for the Snow Globe simulation.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entity and callback identifiers
//! - [`enums`] -- Item, plant, character and world enumerations
//! - [`geometry`] -- Grid cells and continuous world positions
//! - [`item`] -- The materialized item handed to inventories and the ground

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod item;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AgeGroup, DeathCause, EntityKind, FruitDropMode, Gender, ItemCategory, PlantKind, Rarity,
    SpeedKind, Stat, StatusFlag, ToolKind, Usage, Vital,
};
pub use geometry::{GridCell, WorldPos};
pub use ids::{CallbackId, EntityId};
pub use item::ItemSpec;
