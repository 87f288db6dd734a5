//! Tile grid, pathfinding, plants, and the spatial registry for the Snow
//! Globe simulation.
//!
//! This crate models everything in the world that is not a character: the
//! terrain, the plants growing on it, items lying on the ground, and the
//! registry used to find entities by kind and distance.
//!
//! # Modules
//!
//! - [`error`] -- Error types for world operations.
//! - [`grid`] -- [`TileGrid`] terrain, walkability, and grid/world coordinate
//!   conversion behind the [`GridMap`] trait.
//! - [`pathfinding`] -- Deterministic 4-directional A* search.
//! - [`plant`] -- The plant growth/harvest/chop state machine and the
//!   [`Materializer`] and [`Harvester`] collaborator traits.
//! - [`registry`] -- Spawn-ordered registry of live entities with nearest
//!   queries.
//! - [`scheduler`] -- One-shot callbacks keyed to simulation time.
//! - [`world`] -- [`World`], the owner of plants and ground items.

pub mod error;
pub mod grid;
pub mod pathfinding;
pub mod plant;
pub mod registry;
pub mod scheduler;
pub mod world;

// Re-export primary types at crate root.
pub use error::{PathFailure, WorldError};
pub use grid::{CellInfo, GridMap, Tile, TileGrid};
pub use pathfinding::{find_path, find_world_path};
pub use plant::{
    HarvestOutcome, Harvester, Materializer, Plant, PlantDeath, PlantDefinition, PlantInfo,
    PlantTick,
};
pub use registry::{EntityRegistry, RegistryEntry};
pub use scheduler::{Scheduled, Scheduler};
pub use world::{AutoDropPolicy, GroundItem, HoldFruit, PlantReport, World};
