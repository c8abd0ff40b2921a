#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative garden state for the planner.
//!
//! The garden owns the unlocked cells and the placed items. It changes only
//! through [`apply`], which validates each [`Command`] and reports the outcome
//! as [`Event`] values; rejected commands leave the state untouched. Systems
//! read the state through the [`query`] module and never hold mutable access.

mod placements;

use garden_planner_core::{
    CellSet, Command, Coord, Event, GridSize, LockError, MoveError, PlacementError, PlacementId,
    RemovalError, UnlockError,
};
use garden_planner_system_placement::validate_placement;

use placements::PlacementRegistry;

/// Represents the authoritative garden state.
#[derive(Debug)]
pub struct Garden {
    grid: GridSize,
    unlocked: CellSet,
    placements: PlacementRegistry,
}

impl Garden {
    /// Creates an empty garden on the default 10×10 grid.
    #[must_use]
    pub fn new() -> Self {
        Self::with_grid(GridSize::default())
    }

    /// Creates an empty garden on a grid of the provided size.
    #[must_use]
    pub fn with_grid(grid: GridSize) -> Self {
        Self {
            grid,
            unlocked: CellSet::new(),
            placements: PlacementRegistry::new(),
        }
    }

    fn unlock(&mut self, cell: Coord) -> Result<(), UnlockError> {
        if !self.grid.contains(cell) {
            return Err(UnlockError::OutOfBounds);
        }
        if self.unlocked.contains(cell) {
            return Err(UnlockError::AlreadyUnlocked);
        }
        // the seed cell of an empty garden needs no neighbour
        if !self.unlocked.is_empty() && !self.unlocked.touches(cell) {
            return Err(UnlockError::NotAdjacent);
        }

        let _ = self.unlocked.insert(cell);
        Ok(())
    }

    fn lock(&mut self, cell: Coord) -> Result<(), LockError> {
        if !self.unlocked.contains(cell) {
            return Err(LockError::NotUnlocked);
        }
        if let Some(placement) = self.placements.covering(cell) {
            return Err(LockError::Occupied {
                placement: placement.id,
            });
        }

        let _ = self.unlocked.remove(cell);
        Ok(())
    }

    fn check_placement(
        &self,
        origin: Coord,
        size: u32,
        exclude: Option<PlacementId>,
    ) -> Result<(), PlacementError> {
        validate_placement(
            origin,
            size,
            self.grid,
            &self.unlocked,
            self.placements.as_slice(),
            exclude,
        )
    }
}

impl Default for Garden {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the garden, mutating state deterministically.
pub fn apply(garden: &mut Garden, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { size } => {
            *garden = Garden::with_grid(size);
            out_events.push(Event::GridConfigured { size });
        }
        Command::UnlockCell { cell } => match garden.unlock(cell) {
            Ok(()) => out_events.push(Event::CellUnlocked { cell }),
            Err(reason) => {
                log::debug!(
                    "unlock of ({}, {}) rejected: {reason}",
                    cell.row(),
                    cell.column()
                );
                out_events.push(Event::UnlockRejected { cell, reason });
            }
        },
        Command::LockCell { cell } => match garden.lock(cell) {
            Ok(()) => out_events.push(Event::CellLocked { cell }),
            Err(reason) => {
                log::debug!(
                    "lock of ({}, {}) rejected: {reason}",
                    cell.row(),
                    cell.column()
                );
                out_events.push(Event::LockRejected { cell, reason });
            }
        },
        Command::PlaceItem {
            item_type,
            origin,
            size,
        } => match garden.check_placement(origin, size, None) {
            Ok(()) => {
                let placement = garden.placements.insert(item_type, origin, size);
                out_events.push(Event::PlacementCreated { placement });
            }
            Err(reason) => {
                log::debug!("placement of {item_type} rejected: {reason}");
                out_events.push(Event::PlacementRejected {
                    origin,
                    size,
                    reason,
                });
            }
        },
        Command::MovePlacement { placement, origin } => {
            let Some(size) = garden.placements.get(placement).map(|entry| entry.size) else {
                out_events.push(Event::MoveRejected {
                    placement,
                    origin,
                    reason: MoveError::MissingPlacement,
                });
                return;
            };

            if let Err(reason) = garden.check_placement(origin, size, Some(placement)) {
                log::debug!("move of placement {} rejected: {reason}", placement.get());
                out_events.push(Event::MoveRejected {
                    placement,
                    origin,
                    reason: reason.into(),
                });
                return;
            }

            if let Some(from) = garden.placements.relocate(placement, origin) {
                out_events.push(Event::PlacementMoved {
                    placement,
                    from,
                    to: origin,
                });
            }
        }
        Command::RemovePlacement { placement } => match garden.placements.remove(placement) {
            Some(removed) => out_events.push(Event::PlacementRemoved {
                placement,
                footprint: removed.footprint(),
            }),
            None => out_events.push(Event::RemovalRejected {
                placement,
                reason: RemovalError::MissingPlacement,
            }),
        },
    }
}

/// Query functions that provide read-only access to the garden state.
pub mod query {
    use super::Garden;
    use garden_planner_core::{CellSet, Coord, GardenSnapshot, GridSize, Placement, PlacementId};

    /// Grid dimensions of the garden.
    #[must_use]
    pub fn grid(garden: &Garden) -> GridSize {
        garden.grid
    }

    /// Cells currently unlocked.
    #[must_use]
    pub fn unlocked_cells(garden: &Garden) -> &CellSet {
        &garden.unlocked
    }

    /// Reports whether the cell is unlocked.
    #[must_use]
    pub fn is_unlocked(garden: &Garden, cell: Coord) -> bool {
        garden.unlocked.contains(cell)
    }

    /// Placed items sorted by identifier.
    #[must_use]
    pub fn placements(garden: &Garden) -> &[Placement] {
        garden.placements.as_slice()
    }

    /// Looks up a placed item by identifier.
    #[must_use]
    pub fn placement(garden: &Garden, id: PlacementId) -> Option<&Placement> {
        garden.placements.get(id)
    }

    /// Placed item covering the cell, if any.
    #[must_use]
    pub fn placement_at(garden: &Garden, cell: Coord) -> Option<&Placement> {
        garden.placements.covering(cell)
    }

    /// Captures an immutable snapshot for the pure systems.
    #[must_use]
    pub fn snapshot(garden: &Garden) -> GardenSnapshot {
        GardenSnapshot {
            grid: garden.grid,
            unlocked: garden.unlocked.clone(),
            placements: garden.placements.as_slice().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_grid_resets_state() {
        let mut garden = Garden::new();
        let mut events = Vec::new();
        apply(
            &mut garden,
            Command::UnlockCell {
                cell: Coord::new(0, 0),
            },
            &mut events,
        );

        events.clear();
        let size = GridSize::new(6);
        apply(&mut garden, Command::ConfigureGrid { size }, &mut events);

        assert_eq!(events, vec![Event::GridConfigured { size }]);
        assert_eq!(query::grid(&garden), size);
        assert!(query::unlocked_cells(&garden).is_empty());
    }

    #[test]
    fn seed_cell_unlocks_without_neighbor() {
        let mut garden = Garden::new();
        assert_eq!(garden.unlock(Coord::new(7, 3)), Ok(()));
        assert_eq!(
            garden.unlock(Coord::new(0, 0)),
            Err(UnlockError::NotAdjacent)
        );
        assert_eq!(garden.unlock(Coord::new(7, 4)), Ok(()));
    }
}
