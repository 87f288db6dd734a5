//! Characters and everything they carry for the Snow Globe simulation.
//!
//! This crate holds the logic layer for characters: attributes, the
//! weight-limited inventory, path following, the interaction range gate, and
//! the effects of consumables, weapons and fruit. It sits between
//! `snowglobe-world` (terrain and plants) and `snowglobe-core` (the
//! simulation loop and command surface).
//!
//! # Modules
//!
//! - [`attributes`] -- Typed stats, vitals, speeds and flags ([`CharacterAttributes`])
//! - [`character`] -- The [`Character`] aggregate
//! - [`config`] -- Character tunables ([`CharacterConfig`])
//! - [`effects`] -- Consumable effects and reversible stat modifiers
//! - [`error`] -- Error types for all character operations ([`AgentError`])
//! - [`fruit`] -- Plantable fruit and the planting skill check
//! - [`interaction`] -- Interaction range gate
//! - [`inventory`] -- Weight-limited inventory with change listeners
//! - [`movement`] -- Waypoint path following
//! - [`weapon`] -- Weapon damage, durability and equip bonuses

pub mod attributes;
pub mod character;
pub mod config;
pub mod effects;
pub mod error;
pub mod fruit;
pub mod interaction;
pub mod inventory;
pub mod movement;
pub mod weapon;

// Re-export primary types at crate root for convenience.
pub use attributes::{Attributes, CharacterAttributes, VitalValue};
pub use character::{Character, CharacterStatus};
pub use config::CharacterConfig;
pub use effects::{
    BuffReversal, ConsumableDefinition, ConsumeOutcome, StatModifiers, apply_consumable,
};
pub use error::AgentError;
pub use fruit::{FruitDefinition, check_can_plant};
pub use interaction::{
    InteractionGate, InteractionRequest, grid_distance, max_interact_distance,
};
pub use inventory::{
    CAPACITY_PER_STRENGTH, Inventory, InventoryListener, InventoryRecord, InventorySnapshot,
};
pub use movement::{MoveStatus, PathFollower};
pub use weapon::{Weapon, WeaponDefinition};
