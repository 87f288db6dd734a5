//! Configuration, item catalog, tick cycle and orchestration for the Snow
//! Globe simulation.
//!
//! This crate ties the world and its characters together: it loads
//! configuration and item definitions, owns the [`SimulationState`], runs
//! the fixed-step tick cycle and exposes character and plant operations to
//! an external controller through the command dispatcher.
//!
//! # Modules
//!
//! - [`catalog`] -- Item definitions loaded from JSON; the world's item
//!   materializer.
//! - [`clock`] -- Simulation clock counting fixed-length ticks.
//! - [`command`] -- Instance registry and method dispatch for external
//!   controllers.
//! - [`config`] -- Configuration loading from `snowglobe-config.yaml` into
//!   strongly-typed structs.
//! - [`operator`] -- Pause, resume, speed and stop controls for a running
//!   loop.
//! - [`runner`] -- The async simulation loop.
//! - [`state`] -- [`SimulationState`] and the interactions characters can
//!   attempt.
//! - [`tick`] -- The per-tick phases: clock, plants, movement, callbacks.
//!
//! [`SimulationState`]: state::SimulationState

pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod operator;
pub mod runner;
pub mod state;
pub mod tick;

pub use catalog::{CatalogEntry, CatalogError, ItemCatalog, ItemKind};
pub use clock::{ClockError, SimClock};
pub use command::{CommandDispatcher, CommandError, CommandRequest, CommandResponse, Instance};
pub use config::{ConfigError, SimulationConfig};
pub use operator::{RunControl, SimulationEndReason};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use state::{InteractionOutcome, ScheduledEffect, SimulationError, SimulationState};
pub use tick::{TickError, TickSummary, run_tick};
