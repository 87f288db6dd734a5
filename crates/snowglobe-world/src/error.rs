//! Error types for the `snowglobe-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`]. Every variant
//! is recoverable: callers either branch on it or fall back to an empty
//! result.

use snowglobe_types::{EntityId, GridCell, PlantKind, ToolKind};

/// Why a path request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFailure {
    /// An endpoint lies outside the grid.
    OutOfBounds,
    /// An endpoint is not walkable.
    Solid,
    /// Both endpoints are valid but no route connects them.
    NoRoute,
}

impl core::fmt::Display for PathFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            Self::OutOfBounds => "endpoint out of bounds",
            Self::Solid => "endpoint not walkable",
            Self::NoRoute => "no route",
        };
        f.write_str(text)
    }
}

/// Errors that can occur during world operations.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The plant is not at its final growth stage.
    #[error("plant not mature: stage {stage} of {stage_count}")]
    NotMature {
        /// Current stage (0-based).
        stage: u32,
        /// Total number of stages.
        stage_count: u32,
    },

    /// The plant was harvested recently and is still cooling down.
    #[error("plant on cooldown: {remaining:.2}s remaining")]
    OnCooldown {
        /// Seconds until the next harvest is allowed.
        remaining: f32,
    },

    /// The plant has been harvested as many times as it allows.
    #[error("harvest limit reached: {limit}")]
    HarvestLimitReached {
        /// The configured limit.
        limit: u32,
    },

    /// The harvester or chopper lacks the required tool.
    #[error("missing required tool: {tool:?}")]
    MissingTool {
        /// The tool that was required.
        tool: ToolKind,
    },

    /// Only trees can be chopped.
    #[error("plant of kind {kind} cannot be chopped")]
    NotChoppable {
        /// The plant's kind.
        kind: PlantKind,
    },

    /// The plant is dead and accepts no further interaction.
    #[error("plant is dead")]
    PlantDead,

    /// No plant with this id is alive in the world.
    #[error("plant not found: {0}")]
    PlantNotFound(EntityId),

    /// No entity with this id is registered in the world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The cell lies outside the grid.
    #[error("cell {0} is out of bounds")]
    CellOutOfBounds(GridCell),

    /// No path connects the two cells.
    #[error("no path from {from} to {to}: {reason}")]
    PathUnreachable {
        /// Start cell.
        from: GridCell,
        /// Goal cell.
        to: GridCell,
        /// Which check failed.
        reason: PathFailure,
    },

    /// Grid construction received inconsistent dimensions or data.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// Explanation of what is wrong.
        reason: String,
    },
}
