//! Authoritative placement storage.

use garden_planner_core::{Coord, Placement, PlacementId};

/// Registry that stores placed items and manages identifier allocation.
///
/// Identifiers grow monotonically, so entries stay sorted by id.
#[derive(Debug)]
pub(crate) struct PlacementRegistry {
    entries: Vec<Placement>,
    next_id: PlacementId,
}

impl PlacementRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: PlacementId::new(0),
        }
    }

    /// Stores a new item and returns the stored copy.
    pub(crate) fn insert(&mut self, item_type: String, position: Coord, size: u32) -> Placement {
        let placement = Placement {
            id: self.next_id,
            item_type,
            position,
            size,
        };
        self.next_id = PlacementId::new(self.next_id.get().wrapping_add(1));
        self.entries.push(placement.clone());
        placement
    }

    pub(crate) fn get(&self, id: PlacementId) -> Option<&Placement> {
        self.index_of(id).map(|index| &self.entries[index])
    }

    /// Moves the item to a new origin, returning its previous origin.
    pub(crate) fn relocate(&mut self, id: PlacementId, origin: Coord) -> Option<Coord> {
        let index = self.index_of(id)?;
        let entry = &mut self.entries[index];
        let previous = entry.position;
        entry.position = origin;
        Some(previous)
    }

    pub(crate) fn remove(&mut self, id: PlacementId) -> Option<Placement> {
        let index = self.index_of(id)?;
        Some(self.entries.remove(index))
    }

    /// Item whose footprint covers the cell.
    pub(crate) fn covering(&self, cell: Coord) -> Option<&Placement> {
        self.entries
            .iter()
            .find(|placement| placement.footprint().contains(cell))
    }

    pub(crate) fn as_slice(&self) -> &[Placement] {
        &self.entries
    }

    fn index_of(&self, id: PlacementId) -> Option<usize> {
        self.entries
            .binary_search_by_key(&id, |placement| placement.id)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = PlacementRegistry::new();
        assert!(registry.as_slice().is_empty());
        assert_eq!(registry.next_id.get(), 0);
    }

    #[test]
    fn identifiers_are_not_reused_after_removal() {
        let mut registry = PlacementRegistry::new();
        let first = registry.insert("carrot".to_owned(), Coord::new(0, 0), 1);
        let _ = registry.remove(first.id);
        let second = registry.insert("carrot".to_owned(), Coord::new(0, 0), 1);

        assert_ne!(first.id, second.id);
        assert!(registry.get(first.id).is_none());
        assert_eq!(registry.get(second.id), Some(&second));
    }

    #[test]
    fn relocate_reports_previous_origin() {
        let mut registry = PlacementRegistry::new();
        let placed = registry.insert("pumpkin".to_owned(), Coord::new(2, 2), 2);

        assert_eq!(
            registry.relocate(placed.id, Coord::new(4, 4)),
            Some(Coord::new(2, 2))
        );
        assert_eq!(
            registry.covering(Coord::new(5, 5)).map(|placement| placement.id),
            Some(placed.id)
        );
        assert!(registry.covering(Coord::new(2, 2)).is_none());
    }
}
