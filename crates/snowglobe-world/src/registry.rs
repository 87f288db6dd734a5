//! Spatial registry of world entities.
//!
//! Entities are kept in spawn order. "Nearest" queries scan that order and
//! keep the first candidate at the minimum distance, so ties resolve to the
//! entity spawned first.

use snowglobe_types::{EntityId, EntityKind, WorldPos};

/// One registered entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegistryEntry {
    /// Entity id.
    pub id: EntityId,
    /// What kind of entity it is.
    pub kind: EntityKind,
    /// Current world position.
    pub position: WorldPos,
}

/// Live entities with their kinds and positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRegistry {
    entries: Vec<RegistryEntry>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register an entity. Re-registering an id moves it to the new
    /// position and kind without changing its spawn order.
    pub fn insert(&mut self, id: EntityId, kind: EntityKind, position: WorldPos) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.kind = kind;
            entry.position = position;
        } else {
            self.entries.push(RegistryEntry { id, kind, position });
        }
    }

    /// Remove an entity. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Update an entity's position. Returns `false` if it is not registered.
    pub fn set_position(&mut self, id: EntityId, position: WorldPos) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        entry.position = position;
        true
    }

    /// Look up an entity.
    pub fn get(&self, id: EntityId) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Whether the entity is registered.
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// All entities of `kind`, in spawn order.
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// The entity of `kind` closest to `from` in straight-line distance,
    /// skipping `exclude`. Ties go to the earliest spawned.
    pub fn find_nearest(
        &self,
        kind: EntityKind,
        from: WorldPos,
        exclude: Option<EntityId>,
    ) -> Option<&RegistryEntry> {
        self.find_nearest_by(kind, from, |entry| Some(entry.id) != exclude)
    }

    /// Like [`find_nearest`](Self::find_nearest), but only entries for which
    /// `accept` returns `true` are candidates.
    pub fn find_nearest_by<F>(
        &self,
        kind: EntityKind,
        from: WorldPos,
        mut accept: F,
    ) -> Option<&RegistryEntry>
    where
        F: FnMut(&RegistryEntry) -> bool,
    {
        let mut best: Option<(&RegistryEntry, f32)> = None;
        for entry in self.of_kind(kind) {
            if !accept(entry) {
                continue;
            }
            let distance = from.distance_to(entry.position);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((entry, distance));
            }
        }
        best.map(|(entry, _)| entry)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_prefers_closest_then_spawn_order() {
        let mut reg = EntityRegistry::new();
        let far = EntityId::new();
        let tie_a = EntityId::new();
        let tie_b = EntityId::new();
        reg.insert(far, EntityKind::Plant, WorldPos::new(100.0, 0.0));
        reg.insert(tie_a, EntityKind::Plant, WorldPos::new(0.0, 10.0));
        reg.insert(tie_b, EntityKind::Plant, WorldPos::new(10.0, 0.0));

        let nearest = reg.find_nearest(EntityKind::Plant, WorldPos::new(0.0, 0.0), None);
        assert_eq!(nearest.map(|e| e.id), Some(tie_a));

        let skipping = reg.find_nearest(EntityKind::Plant, WorldPos::new(0.0, 0.0), Some(tie_a));
        assert_eq!(skipping.map(|e| e.id), Some(tie_b));
    }

    #[test]
    fn nearest_filters_by_kind() {
        let mut reg = EntityRegistry::new();
        let item = EntityId::new();
        reg.insert(item, EntityKind::Item, WorldPos::new(1.0, 1.0));
        assert!(reg.find_nearest(EntityKind::Plant, WorldPos::default(), None).is_none());
        assert_eq!(
            reg.find_nearest(EntityKind::Item, WorldPos::default(), None).map(|e| e.id),
            Some(item)
        );
    }

    #[test]
    fn nearest_by_predicate_keeps_spawn_order_ties() {
        let mut reg = EntityRegistry::new();
        let near = EntityId::new();
        let tie_a = EntityId::new();
        let tie_b = EntityId::new();
        reg.insert(near, EntityKind::Plant, WorldPos::new(1.0, 0.0));
        reg.insert(tie_a, EntityKind::Plant, WorldPos::new(0.0, 20.0));
        reg.insert(tie_b, EntityKind::Plant, WorldPos::new(20.0, 0.0));

        let origin = WorldPos::new(0.0, 0.0);
        let found = reg.find_nearest_by(EntityKind::Plant, origin, |e| e.id != near);
        assert_eq!(found.map(|e| e.id), Some(tie_a));
        assert!(reg.find_nearest_by(EntityKind::Plant, origin, |_| false).is_none());
    }

    #[test]
    fn remove_and_move() {
        let mut reg = EntityRegistry::new();
        let id = EntityId::new();
        reg.insert(id, EntityKind::Character, WorldPos::new(0.0, 0.0));
        assert!(reg.set_position(id, WorldPos::new(5.0, 5.0)));
        assert_eq!(reg.get(id).map(|e| e.position), Some(WorldPos::new(5.0, 5.0)));
        assert!(reg.remove(id));
        assert!(!reg.remove(id));
        assert!(!reg.set_position(id, WorldPos::default()));
        assert!(reg.is_empty());
    }
}
