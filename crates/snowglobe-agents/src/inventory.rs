//! Weight-limited inventory.
//!
//! An [`Inventory`] holds stacks of items keyed by identity. Its capacity is
//! derived from the owner's strength (10 weight units per point by default)
//! and every add is checked against it before anything changes: a rejected
//! add leaves the inventory exactly as it was.
//!
//! Listeners registered with [`Inventory::subscribe`] receive a fresh
//! [`InventorySnapshot`] after every successful add, remove, or clear.

use std::collections::BTreeMap;

use serde::Serialize;
use snowglobe_types::{ItemCategory, ItemSpec, ToolKind};
use tracing::debug;

use crate::error::AgentError;

/// Default carrying capacity per point of strength.
pub const CAPACITY_PER_STRENGTH: f32 = 10.0;

// ---------------------------------------------------------------------------
// Records and snapshots
// ---------------------------------------------------------------------------

/// One stack of a single item identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRecord {
    /// Item identity; the stack key.
    pub item_id: String,
    /// Units held. Always at least 1 while the record exists.
    pub quantity: u32,
    /// Weight of one unit.
    pub unit_weight: f32,
    /// `quantity * unit_weight`.
    pub total_weight: f32,
    /// Item category.
    pub category: ItemCategory,
    /// Tool class the item provides, if any.
    pub tool: Option<ToolKind>,
}

/// Read-only view of an inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySnapshot {
    /// Maximum total weight.
    pub capacity: f32,
    /// Total weight held.
    pub current_weight: f32,
    /// `current_weight / capacity * 100`, or 0 with no capacity.
    pub utilization_percent: f32,
    /// Number of distinct stacks.
    pub item_count: usize,
    /// Every stack, ordered by item identity.
    pub records: Vec<InventoryRecord>,
}

/// Receives inventory change notifications.
pub trait InventoryListener: Send {
    /// Called after every successful mutation with the new state.
    fn on_inventory_changed(&mut self, snapshot: &InventorySnapshot);
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// A capacity-limited collection of item stacks.
pub struct Inventory {
    capacity: f32,
    capacity_per_strength: f32,
    current_weight: f32,
    records: BTreeMap<String, InventoryRecord>,
    listeners: Vec<Box<dyn InventoryListener>>,
}

impl core::fmt::Debug for Inventory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Inventory")
            .field("capacity", &self.capacity)
            .field("current_weight", &self.current_weight)
            .field("records", &self.records)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Inventory {
    /// An empty inventory sized for `strength` at the default
    /// [`CAPACITY_PER_STRENGTH`].
    pub fn new(strength: i32) -> Self {
        Self::with_capacity_per_strength(strength, CAPACITY_PER_STRENGTH)
    }

    /// An empty inventory with a custom capacity-per-strength ratio.
    pub fn with_capacity_per_strength(strength: i32, capacity_per_strength: f32) -> Self {
        let mut inventory = Self {
            capacity: 0.0,
            capacity_per_strength,
            current_weight: 0.0,
            records: BTreeMap::new(),
            listeners: Vec::new(),
        };
        inventory.set_capacity_from_strength(strength);
        inventory
    }

    /// Recompute capacity from the owner's strength. Strength below zero
    /// counts as zero.
    ///
    /// Items already held are kept even if they now exceed the capacity;
    /// only further adds are refused.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_capacity_from_strength(&mut self, strength: i32) {
        self.capacity = self.capacity_per_strength * strength.max(0) as f32;
        debug!(strength, capacity = self.capacity, "Inventory capacity updated");
    }

    /// Maximum total weight.
    pub const fn capacity(&self) -> f32 {
        self.capacity
    }

    /// Total weight held.
    pub const fn current_weight(&self) -> f32 {
        self.current_weight
    }

    /// Whether `quantity` units of `unit_weight` would fit.
    pub fn can_add(&self, unit_weight: f32, quantity: u32) -> bool {
        self.current_weight + stack_weight(unit_weight, quantity) <= self.capacity
    }

    /// Add `quantity` units of an item.
    ///
    /// Stacks onto an existing record of the same identity (keeping that
    /// record's unit weight) or creates a new one.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Overweight`] if the items do not fit and
    /// [`AgentError::InvalidWeight`] for a negative or non-finite weight. In
    /// both cases nothing changes.
    pub fn add(
        &mut self,
        item_id: &str,
        unit_weight: f32,
        quantity: u32,
        category: ItemCategory,
    ) -> Result<(), AgentError> {
        self.add_record(item_id, unit_weight, quantity, category, None)
    }

    /// Add `quantity` units of a materialized item, keeping its tool class.
    ///
    /// # Errors
    ///
    /// Same as [`add`](Self::add).
    pub fn add_item(&mut self, item: &ItemSpec, quantity: u32) -> Result<(), AgentError> {
        self.add_record(&item.id, item.unit_weight, quantity, item.category, item.tool)
    }

    fn add_record(
        &mut self,
        item_id: &str,
        unit_weight: f32,
        quantity: u32,
        category: ItemCategory,
        tool: Option<ToolKind>,
    ) -> Result<(), AgentError> {
        if !unit_weight.is_finite() || unit_weight < 0.0 {
            return Err(AgentError::InvalidWeight {
                item: item_id.to_owned(),
                weight: unit_weight,
            });
        }
        let unit_weight = self
            .records
            .get(item_id)
            .map_or(unit_weight, |r| r.unit_weight);

        if !self.can_add(unit_weight, quantity) {
            debug!(
                item = item_id,
                quantity,
                current_weight = self.current_weight,
                capacity = self.capacity,
                "Inventory add rejected"
            );
            return Err(AgentError::Overweight {
                item: item_id.to_owned(),
                added_weight: stack_weight(unit_weight, quantity),
                current_weight: self.current_weight,
                capacity: self.capacity,
            });
        }

        let record = self
            .records
            .entry(item_id.to_owned())
            .or_insert_with(|| InventoryRecord {
                item_id: item_id.to_owned(),
                quantity: 0,
                unit_weight,
                total_weight: 0.0,
                category,
                tool,
            });
        record.quantity = record.quantity.saturating_add(quantity);
        record.total_weight = stack_weight(record.unit_weight, record.quantity);

        self.changed();
        Ok(())
    }

    /// Remove `quantity` units of an item. The record disappears when its
    /// quantity reaches zero.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NotFound`] if the item is absent and
    /// [`AgentError::InsufficientQuantity`] if fewer than `quantity` units
    /// are held. In both cases nothing changes.
    pub fn remove(&mut self, item_id: &str, quantity: u32) -> Result<(), AgentError> {
        let record = self
            .records
            .get_mut(item_id)
            .ok_or_else(|| AgentError::NotFound(item_id.to_owned()))?;

        let remaining = record.quantity.checked_sub(quantity).ok_or_else(|| {
            AgentError::InsufficientQuantity {
                item: item_id.to_owned(),
                requested: quantity,
                available: record.quantity,
            }
        })?;

        if remaining == 0 {
            self.records.remove(item_id);
        } else {
            record.quantity = remaining;
            record.total_weight = stack_weight(record.unit_weight, remaining);
        }

        self.changed();
        Ok(())
    }

    /// Whether at least `quantity` units of the item are held.
    pub fn has(&self, item_id: &str, quantity: u32) -> bool {
        self.quantity_of(item_id) >= quantity.max(1)
    }

    /// Units held of an item; 0 if absent.
    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.records.get(item_id).map_or(0, |r| r.quantity)
    }

    /// The stack for an item.
    pub fn record(&self, item_id: &str) -> Option<&InventoryRecord> {
        self.records.get(item_id)
    }

    /// Every stack, ordered by item identity.
    pub fn records(&self) -> impl Iterator<Item = &InventoryRecord> {
        self.records.values()
    }

    /// Whether any held item provides the given tool class.
    pub fn has_tool(&self, tool: ToolKind) -> bool {
        self.records.values().any(|r| r.tool == Some(tool))
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> InventorySnapshot {
        let utilization_percent = if self.capacity > 0.0 {
            self.current_weight / self.capacity * 100.0
        } else {
            0.0
        };
        InventorySnapshot {
            capacity: self.capacity,
            current_weight: self.current_weight,
            utilization_percent,
            item_count: self.records.len(),
            records: self.records.values().cloned().collect(),
        }
    }

    /// Drop every stack.
    pub fn clear(&mut self) {
        self.records.clear();
        self.changed();
    }

    /// Register a listener for change notifications.
    pub fn subscribe(&mut self, listener: Box<dyn InventoryListener>) {
        self.listeners.push(listener);
    }

    /// Recompute the total weight from the records and notify listeners.
    fn changed(&mut self) {
        self.current_weight = self.records.values().map(|r| r.total_weight).sum();
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener.on_inventory_changed(&snapshot);
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn stack_weight(unit_weight: f32, quantity: u32) -> f32 {
    unit_weight * quantity as f32
}
