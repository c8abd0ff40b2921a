#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement system: footprint validity checks plus the planting and
//! drag-move gestures that turn validated previews into world commands.
//!
//! Nothing here mutates garden state. Every check runs against an immutable
//! [`GardenSnapshot`] and the gestures only emit [`Command`] values, which the
//! world validates once more when applying them.

use garden_planner_core::{
    CellSet, Command, Coord, Footprint, GardenSnapshot, GridSize, Placement, PlacementError,
    PlacementId,
};

/// Checks whether a `size × size` item may occupy the footprint anchored at `position`.
///
/// Checks run in order and stop at the first failure:
///
/// 1. the footprint must have at least one cell ([`PlacementError::InvalidSize`]);
/// 2. every cell must lie inside the grid ([`PlacementError::OutOfBounds`]);
/// 3. every cell must be unlocked ([`PlacementError::LockedCell`]);
/// 4. no cell may be covered by an existing placement other than `exclude`
///    ([`PlacementError::Overlap`]).
///
/// `exclude` names the item being moved so it does not collide with itself.
/// The function allocates nothing and is safe to call on every pointer move.
pub fn validate_placement(
    position: Coord,
    size: u32,
    grid: GridSize,
    unlocked: &CellSet,
    existing: &[Placement],
    exclude: Option<PlacementId>,
) -> Result<(), PlacementError> {
    if size == 0 {
        return Err(PlacementError::InvalidSize);
    }

    let footprint = Footprint::new(position, size);
    if !footprint.fits_within(grid) {
        return Err(PlacementError::OutOfBounds);
    }

    if !footprint.cells().all(|cell| unlocked.contains(cell)) {
        return Err(PlacementError::LockedCell);
    }

    let overlaps = existing
        .iter()
        .filter(|placement| Some(placement.id) != exclude)
        .any(|placement| placement.footprint().intersects(&footprint));
    if overlaps {
        return Err(PlacementError::Overlap);
    }

    Ok(())
}

/// Runs [`validate_placement`] against a full garden snapshot.
pub fn validate_in_snapshot(
    snapshot: &GardenSnapshot,
    position: Coord,
    size: u32,
    exclude: Option<PlacementId>,
) -> Result<(), PlacementError> {
    validate_placement(
        position,
        size,
        snapshot.grid,
        &snapshot.unlocked,
        &snapshot.placements,
        exclude,
    )
}

/// Declarative overlay describing a potential placement or drop location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Region of cells the item would occupy.
    ///
    /// A drag that would push the origin above or left of the grid clamps the
    /// offending axis to 0; such previews are always rejected with
    /// [`PlacementError::OutOfBounds`].
    pub footprint: Footprint,
    /// Indicates whether the previewed location is legal.
    pub placeable: bool,
    /// Reason the location is illegal, if any.
    pub rejection: Option<PlacementError>,
}

impl PlacementPreview {
    /// Validates the footprint against the snapshot and captures the verdict.
    #[must_use]
    pub fn evaluate(
        snapshot: &GardenSnapshot,
        origin: Coord,
        size: u32,
        exclude: Option<PlacementId>,
    ) -> Self {
        let rejection = validate_in_snapshot(snapshot, origin, size, exclude).err();
        Self {
            footprint: Footprint::new(origin, size),
            placeable: rejection.is_none(),
            rejection,
        }
    }

    /// Upper-left cell of the previewed footprint.
    #[must_use]
    pub const fn origin(&self) -> Coord {
        self.footprint.origin()
    }
}

/// Item kind and footprint chosen for planting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSelection {
    /// Game item kind.
    pub item_type: String,
    /// Edge length of the square footprint.
    pub size: u32,
}

impl ItemSelection {
    /// Creates a new selection descriptor.
    #[must_use]
    pub fn new(item_type: impl Into<String>, size: u32) -> Self {
        Self {
            item_type: item_type.into(),
            size,
        }
    }
}

/// Pointer snapshot distilled from adapter-provided frame input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerInput {
    /// Cell currently under the pointer.
    pub cursor_cell: Option<Coord>,
    /// Indicates whether the player confirmed the action on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player requested removal on this frame.
    pub remove_action: bool,
}

/// Planting system that translates a selected item and pointer input into commands.
#[derive(Clone, Debug, Default)]
pub struct Planter {
    selection: Option<ItemSelection>,
}

impl Planter {
    /// Creates a planter with nothing selected.
    #[must_use]
    pub const fn new() -> Self {
        Self { selection: None }
    }

    /// Chooses the item that subsequent confirmations will place.
    pub fn select(&mut self, selection: ItemSelection) {
        self.selection = Some(selection);
    }

    /// Clears the current selection.
    pub fn deselect(&mut self) {
        self.selection = None;
    }

    /// Currently selected item, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&ItemSelection> {
        self.selection.as_ref()
    }

    /// Evaluates the hovered cell and emits placement or removal commands.
    ///
    /// Returns the preview for the hovered location so adapters can draw the
    /// valid/invalid overlay.
    pub fn handle(
        &self,
        snapshot: &GardenSnapshot,
        input: PointerInput,
        out: &mut Vec<Command>,
    ) -> Option<PlacementPreview> {
        let cursor = input.cursor_cell?;

        if input.remove_action {
            if let Some(placement) = snapshot.placement_at(cursor) {
                out.push(Command::RemovePlacement {
                    placement: placement.id,
                });
            }
        }

        let selection = self.selection.as_ref()?;
        let preview = PlacementPreview::evaluate(snapshot, cursor, selection.size, None);

        if input.confirm_action && preview.placeable {
            out.push(Command::PlaceItem {
                item_type: selection.item_type.clone(),
                origin: cursor,
                size: selection.size,
            });
        }

        Some(preview)
    }
}

/// Drag gesture that relocates an existing item.
///
/// The item follows the pointer while keeping the grabbed cell under it.
/// Every hover re-validates the drop location against the current snapshot
/// with the dragged item excluded; release validates once more before the
/// move command is emitted.
#[derive(Clone, Debug, Default)]
pub struct DragMove {
    active: Option<ActiveDrag>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ActiveDrag {
    placement: PlacementId,
    start: Coord,
    size: u32,
    grab_row: u32,
    grab_column: u32,
}

impl DragMove {
    /// Creates an idle drag gesture.
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Starts dragging the item covering `cell`.
    ///
    /// Returns the identifier of the grabbed item, or `None` when the cell is empty.
    pub fn begin(&mut self, snapshot: &GardenSnapshot, cell: Coord) -> Option<PlacementId> {
        let placement = snapshot.placement_at(cell)?;
        self.active = Some(ActiveDrag {
            placement: placement.id,
            start: placement.position,
            size: placement.size,
            grab_row: cell.row() - placement.position.row(),
            grab_column: cell.column() - placement.position.column(),
        });
        Some(placement.id)
    }

    /// Identifier of the item being dragged, if any.
    #[must_use]
    pub fn dragged(&self) -> Option<PlacementId> {
        self.active.map(|drag| drag.placement)
    }

    /// Abandons the gesture without emitting a command.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Re-validates the drop location under the pointer.
    ///
    /// Returns `None` when no drag is active. If the dragged item disappeared
    /// from the snapshot the gesture ends.
    pub fn hover(&mut self, snapshot: &GardenSnapshot, cursor: Coord) -> Option<PlacementPreview> {
        let drag = self.active?;
        if snapshot.placement(drag.placement).is_none() {
            self.active = None;
            return None;
        }

        Some(drag.preview(snapshot, cursor))
    }

    /// Ends the gesture, emitting a move command when the drop location is legal.
    ///
    /// Dropping the item where it started is legal but emits nothing.
    pub fn release(
        &mut self,
        snapshot: &GardenSnapshot,
        cursor: Coord,
        out: &mut Vec<Command>,
    ) -> Option<PlacementPreview> {
        let drag = self.active.take()?;
        if snapshot.placement(drag.placement).is_none() {
            log::debug!("dragged placement {} vanished", drag.placement.get());
            return None;
        }

        let preview = drag.preview(snapshot, cursor);
        if preview.placeable && preview.origin() != drag.start {
            out.push(Command::MovePlacement {
                placement: drag.placement,
                origin: preview.origin(),
            });
        } else if let Some(reason) = preview.rejection {
            log::debug!(
                "drop of placement {} at ({}, {}) rejected: {reason}",
                drag.placement.get(),
                preview.origin().row(),
                preview.origin().column()
            );
        }

        Some(preview)
    }
}

impl ActiveDrag {
    fn preview(&self, snapshot: &GardenSnapshot, cursor: Coord) -> PlacementPreview {
        let row = cursor.row().checked_sub(self.grab_row);
        let column = cursor.column().checked_sub(self.grab_column);

        match row.zip(column) {
            Some((row, column)) => PlacementPreview::evaluate(
                snapshot,
                Coord::new(row, column),
                self.size,
                Some(self.placement),
            ),
            // origin above or left of the grid, clamped onto the edge
            None => PlacementPreview {
                footprint: Footprint::new(
                    Coord::new(row.unwrap_or(0), column.unwrap_or(0)),
                    self.size,
                ),
                placeable: false,
                rejection: Some(PlacementError::OutOfBounds),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_item_snapshot() -> GardenSnapshot {
        GardenSnapshot {
            grid: GridSize::default(),
            unlocked: GridSize::new(4).cells().collect(),
            placements: vec![Placement {
                id: PlacementId::new(1),
                item_type: "carrot".to_owned(),
                position: Coord::new(1, 1),
                size: 2,
            }],
        }
    }

    #[test]
    fn drag_keeps_grab_offset() {
        let snapshot = single_item_snapshot();
        let mut drag = DragMove::new();
        assert_eq!(
            drag.begin(&snapshot, Coord::new(2, 2)),
            Some(PlacementId::new(1))
        );

        let preview = drag
            .hover(&snapshot, Coord::new(3, 3))
            .expect("drag is active");
        assert_eq!(preview.origin(), Coord::new(2, 2));
        assert!(preview.placeable, "item may overlap its own old footprint");
    }

    #[test]
    fn drag_past_top_left_edge_is_out_of_bounds() {
        let snapshot = single_item_snapshot();
        let mut drag = DragMove::new();
        let _ = drag.begin(&snapshot, Coord::new(2, 2));

        let preview = drag
            .hover(&snapshot, Coord::new(0, 3))
            .expect("drag is active");
        assert!(!preview.placeable);
        assert_eq!(preview.rejection, Some(PlacementError::OutOfBounds));
        assert_eq!(
            preview.origin(),
            Coord::new(0, 2),
            "the row above the grid is clamped, the column keeps the grab offset"
        );
    }
}
