//! The materialized form of an item.

use serde::{Deserialize, Serialize};

use crate::enums::{ItemCategory, ToolKind};

/// A concrete item produced from a catalog reference.
///
/// This is what harvesting, chopping and death remains hand to inventories
/// and to the ground. It carries only what the simulation core needs: the
/// identity that keys inventory stacks, the per-unit weight and the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    /// Identity used as the inventory stack key.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Weight of one unit.
    pub unit_weight: f32,
    /// Item category.
    pub category: ItemCategory,
    /// Tool class the item provides, if any.
    pub tool: Option<ToolKind>,
}

impl ItemSpec {
    /// A plain item with no tool class.
    pub fn new(id: impl Into<String>, unit_weight: f32, category: ItemCategory) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            unit_weight,
            category,
            tool: None,
        }
    }

    /// Attach a tool class.
    #[must_use]
    pub const fn with_tool(mut self, tool: ToolKind) -> Self {
        self.tool = Some(tool);
        self
    }
}
