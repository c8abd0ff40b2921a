#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the garden planner.
//!
//! This crate defines the coordinate model and the message surface that
//! connects adapters, the authoritative garden state and the pure systems.
//! Adapters submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point and broadcasts
//! [`Event`] values. The expansion planner and the placement validator never
//! mutate anything: they receive [`CellSet`] and [`Placement`] snapshots and
//! return freshly derived data.

use std::collections::{btree_set, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the square grid used by the game.
pub const DEFAULT_GRID_SIDE: u32 = 10;

/// Square grid dimensions measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridSize {
    side: u32,
}

impl GridSize {
    /// Creates a grid with `side × side` cells.
    #[must_use]
    pub const fn new(side: u32) -> Self {
        Self { side }
    }

    /// Number of cells along each edge.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: Coord) -> bool {
        cell.row < self.side && cell.column < self.side
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.side as u64 * self.side as u64
    }

    /// Iterates every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> {
        let side = self.side;
        (0..side).flat_map(move |row| (0..side).map(move |column| Coord::new(row, column)))
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIDE)
    }
}

/// Location of a single grid cell expressed as row and column.
///
/// Ordering is row-major: rows compare first, then columns. The expansion
/// planner relies on this ordering for its deterministic tie-break. On the
/// wire a coordinate is the two-element array `[row, column]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Coord {
    row: u32,
    column: u32,
}

impl Coord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index, growing downwards.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index, growing to the right.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two coordinates.
    ///
    /// Saturates at `u32::MAX` for cells at opposite ends of the coordinate space.
    #[must_use]
    pub fn manhattan_distance(self, other: Coord) -> u32 {
        self.row
            .abs_diff(other.row)
            .saturating_add(self.column.abs_diff(other.column))
    }

    /// Reports whether `other` shares an edge with this cell.
    #[must_use]
    pub fn is_adjacent(self, other: Coord) -> bool {
        is_adjacent(self, other)
    }

    /// Enumerates the edge-sharing neighbours in up, right, down, left order.
    ///
    /// Neighbours with negative coordinates are skipped; the upper bound is
    /// left to the caller since it depends on the grid.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        let mut candidates = [None; 4];
        let mut count = 0;

        if let Some(row) = self.row.checked_sub(1) {
            candidates[count] = Some(Coord::new(row, self.column));
            count += 1;
        }

        if let Some(column) = self.column.checked_add(1) {
            candidates[count] = Some(Coord::new(self.row, column));
            count += 1;
        }

        if let Some(row) = self.row.checked_add(1) {
            candidates[count] = Some(Coord::new(row, self.column));
            count += 1;
        }

        if let Some(column) = self.column.checked_sub(1) {
            candidates[count] = Some(Coord::new(self.row, column));
            count += 1;
        }

        candidates.into_iter().take(count).flatten()
    }
}

impl From<(u32, u32)> for Coord {
    fn from((row, column): (u32, u32)) -> Self {
        Self::new(row, column)
    }
}

impl From<Coord> for (u32, u32) {
    fn from(cell: Coord) -> Self {
        (cell.row, cell.column)
    }
}

/// Returns `true` when the cells differ by exactly one step along exactly one axis.
///
/// Diagonal neighbours and identical cells are not adjacent.
#[must_use]
pub fn is_adjacent(a: Coord, b: Coord) -> bool {
    a.manhattan_distance(b) == 1
}

/// Enumerates the `size²` cells of a footprint anchored at `position`, row-major.
#[must_use]
pub fn footprint_cells(position: Coord, size: u32) -> Vec<Coord> {
    Footprint::new(position, size).cells().collect()
}

/// Maps grid coordinates to rendering coordinates.
///
/// The origin is the top-left corner of cell `(0, 0)`; every cell advances
/// by `cell_size + gap` along its axis.
#[must_use]
pub fn pixel_position(row: u32, column: u32, cell_size: f32, gap: f32) -> PixelPosition {
    let pitch = cell_size + gap;
    PixelPosition {
        top: row as f32 * pitch,
        left: column as f32 * pitch,
    }
}

/// Rendering offset of a cell's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelPosition {
    /// Distance from the top edge of the grid.
    pub top: f32,
    /// Distance from the left edge of the grid.
    pub left: f32,
}

/// Square region of cells anchored at its upper-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    origin: Coord,
    size: u32,
}

impl Footprint {
    /// Constructs a `size × size` footprint extending right and down from `origin`.
    #[must_use]
    pub const fn new(origin: Coord, size: u32) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the footprint.
    #[must_use]
    pub const fn origin(&self) -> Coord {
        self.origin
    }

    /// Edge length measured in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether every cell of the footprint lies inside the grid.
    ///
    /// Empty footprints never fit.
    #[must_use]
    pub fn fits_within(&self, grid: GridSize) -> bool {
        if self.size == 0 {
            return false;
        }

        let fits_axis = |start: u32| {
            start
                .checked_add(self.size)
                .map_or(false, |end| end <= grid.side())
        };

        fits_axis(self.origin.row) && fits_axis(self.origin.column)
    }

    /// Reports whether the footprint covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        let (row_start, row_end) = self.row_span();
        let (column_start, column_end) = self.column_span();
        let row = u64::from(cell.row);
        let column = u64::from(cell.column);
        row >= row_start && row < row_end && column >= column_start && column < column_end
    }

    /// Reports whether two footprints share at least one cell.
    #[must_use]
    pub fn intersects(&self, other: &Footprint) -> bool {
        let (row_start, row_end) = self.row_span();
        let (column_start, column_end) = self.column_span();
        let (other_row_start, other_row_end) = other.row_span();
        let (other_column_start, other_column_end) = other.column_span();

        row_start < other_row_end
            && other_row_start < row_end
            && column_start < other_column_end
            && other_column_start < column_end
    }

    /// Iterates the covered cells in row-major order without allocating.
    #[must_use]
    pub fn cells(&self) -> FootprintCells {
        FootprintCells {
            footprint: *self,
            index: 0,
        }
    }

    fn row_span(&self) -> (u64, u64) {
        let start = u64::from(self.origin.row);
        (start, start + u64::from(self.size))
    }

    fn column_span(&self) -> (u64, u64) {
        let start = u64::from(self.origin.column);
        (start, start + u64::from(self.size))
    }
}

/// Iterator over the cells covered by a [`Footprint`].
#[derive(Clone, Debug)]
pub struct FootprintCells {
    footprint: Footprint,
    index: u64,
}

impl Iterator for FootprintCells {
    type Item = Coord;

    fn next(&mut self) -> Option<Self::Item> {
        let size = u64::from(self.footprint.size);
        if self.index >= size * size {
            return None;
        }

        let row_offset = u32::try_from(self.index / size).ok()?;
        let column_offset = u32::try_from(self.index % size).ok()?;
        self.index += 1;

        let origin = self.footprint.origin;
        Some(Coord::new(
            origin.row.saturating_add(row_offset),
            origin.column.saturating_add(column_offset),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = u64::from(self.footprint.size);
        let remaining = (size * size).saturating_sub(self.index);
        let remaining = usize::try_from(remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Ordered set of grid cells, used for unlocked and candidate cells alike.
///
/// Iteration is row-major. On the wire the set is an array of `[row, column]`
/// pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellSet {
    cells: BTreeSet<Coord>,
}

impl CellSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the cell is a member of the set.
    #[must_use]
    pub fn contains(&self, cell: Coord) -> bool {
        self.cells.contains(&cell)
    }

    /// Adds the cell, returning `true` when it was not yet present.
    pub fn insert(&mut self, cell: Coord) -> bool {
        self.cells.insert(cell)
    }

    /// Removes the cell, returning `true` when it was present.
    pub fn remove(&mut self, cell: Coord) -> bool {
        self.cells.remove(&cell)
    }

    /// Number of cells in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the set holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates the cells in row-major order.
    pub fn iter(&self) -> btree_set::Iter<'_, Coord> {
        self.cells.iter()
    }

    /// Reports whether any member shares an edge with `cell`.
    #[must_use]
    pub fn touches(&self, cell: Coord) -> bool {
        cell.neighbors().any(|neighbor| self.contains(neighbor))
    }

    /// Counts the members sharing an edge with `cell`.
    #[must_use]
    pub fn adjacent_count(&self, cell: Coord) -> usize {
        cell.neighbors()
            .filter(|&neighbor| self.contains(neighbor))
            .count()
    }
}

impl FromIterator<Coord> for CellSet {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<Coord> for CellSet {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

impl<'a> IntoIterator for &'a CellSet {
    type Item = &'a Coord;
    type IntoIter = btree_set::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl IntoIterator for CellSet {
    type Item = Coord;
    type IntoIter = btree_set::IntoIter<Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Unique identifier assigned to a placed item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(u32);

impl PlacementId {
    /// Creates a new placement identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Item placed on the grid, occupying a square footprint of unlocked cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Identifier allocated when the item was placed.
    pub id: PlacementId,
    /// Game item kind, such as a plant or sprinkler name.
    pub item_type: String,
    /// Upper-left cell of the footprint.
    pub position: Coord,
    /// Edge length of the square footprint.
    pub size: u32,
}

impl Placement {
    /// Region of cells covered by the item.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        Footprint::new(self.position, self.size)
    }
}

/// Immutable snapshot of the garden state handed to the pure systems.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenSnapshot {
    /// Grid dimensions the snapshot was captured from.
    #[serde(default)]
    pub grid: GridSize,
    /// Cells that accept placements.
    #[serde(rename = "unlocked_cells")]
    pub unlocked: CellSet,
    /// Items currently placed, sorted by identifier.
    #[serde(default)]
    pub placements: Vec<Placement>,
}

impl GardenSnapshot {
    /// Looks up a placement by identifier.
    #[must_use]
    pub fn placement(&self, id: PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|placement| placement.id == id)
    }

    /// Returns the placement covering the provided cell, if any.
    #[must_use]
    pub fn placement_at(&self, cell: Coord) -> Option<&Placement> {
        self.placements
            .iter()
            .find(|placement| placement.footprint().contains(cell))
    }
}

/// Commands that express all permissible garden mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resets the garden to an empty grid of the provided size.
    ConfigureGrid {
        /// Dimensions of the new grid.
        size: GridSize,
    },
    /// Requests that a locked cell becomes unlocked.
    UnlockCell {
        /// Cell to unlock.
        cell: Coord,
    },
    /// Requests that an unlocked cell becomes locked again.
    LockCell {
        /// Cell to lock.
        cell: Coord,
    },
    /// Requests placement of a new item anchored at the provided origin.
    PlaceItem {
        /// Game item kind.
        item_type: String,
        /// Upper-left cell of the footprint.
        origin: Coord,
        /// Edge length of the square footprint.
        size: u32,
    },
    /// Requests that an existing item moves to a new origin.
    MovePlacement {
        /// Identifier of the item being moved.
        placement: PlacementId,
        /// New upper-left cell of the footprint.
        origin: Coord,
    },
    /// Requests removal of an existing item.
    RemovePlacement {
        /// Identifier of the item targeted for removal.
        placement: PlacementId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that the grid was reset to new dimensions.
    GridConfigured {
        /// Dimensions of the new grid.
        size: GridSize,
    },
    /// Confirms that a cell joined the unlocked set.
    CellUnlocked {
        /// Cell that was unlocked.
        cell: Coord,
    },
    /// Confirms that a cell left the unlocked set.
    CellLocked {
        /// Cell that was locked.
        cell: Coord,
    },
    /// Reports that an unlock request was rejected.
    UnlockRejected {
        /// Cell named in the request.
        cell: Coord,
        /// Specific reason the unlock failed.
        reason: UnlockError,
    },
    /// Reports that a lock request was rejected.
    LockRejected {
        /// Cell named in the request.
        cell: Coord,
        /// Specific reason the lock failed.
        reason: LockError,
    },
    /// Confirms that a new item was placed.
    PlacementCreated {
        /// The stored placement, including its freshly allocated identifier.
        placement: Placement,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Origin provided in the request.
        origin: Coord,
        /// Footprint size provided in the request.
        size: u32,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that an item moved to a new origin.
    PlacementMoved {
        /// Identifier of the moved item.
        placement: PlacementId,
        /// Origin before the move.
        from: Coord,
        /// Origin after the move.
        to: Coord,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Identifier named in the request.
        placement: PlacementId,
        /// Origin provided in the request.
        origin: Coord,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// Confirms that an item was removed.
    PlacementRemoved {
        /// Identifier of the removed item.
        placement: PlacementId,
        /// Region of cells previously occupied by the item.
        footprint: Footprint,
    },
    /// Reports that a removal request was rejected.
    RemovalRejected {
        /// Identifier named in the request.
        placement: PlacementId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
}

impl Event {
    /// Reports whether the event changed the unlocked set.
    ///
    /// Expansion plans computed before such an event are stale.
    #[must_use]
    pub const fn changes_unlocked_cells(&self) -> bool {
        matches!(
            self,
            Self::GridConfigured { .. } | Self::CellUnlocked { .. } | Self::CellLocked { .. }
        )
    }
}

/// Reasons a placement is not legal at the requested position.
///
/// These are ordinary return values produced on every hover of a drag
/// gesture, not exceptional conditions.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The footprint has no cells.
    #[error("footprint size must be at least one cell")]
    InvalidSize,
    /// Part of the footprint lies outside the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// Part of the footprint covers a locked cell.
    #[error("footprint covers a locked cell")]
    LockedCell,
    /// Part of the footprint covers another placed item.
    #[error("footprint overlaps another item")]
    Overlap,
}

/// Reasons an unlock request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnlockError {
    /// The cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The cell is already unlocked.
    #[error("cell is already unlocked")]
    AlreadyUnlocked,
    /// The cell shares no edge with an unlocked cell.
    #[error("cell is not adjacent to an unlocked cell")]
    NotAdjacent,
}

/// Reasons a lock request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockError {
    /// The cell is not unlocked.
    #[error("cell is not unlocked")]
    NotUnlocked,
    /// An item still covers the cell.
    #[error("cell is covered by placement {}", placement.get())]
    Occupied {
        /// Item covering the cell.
        placement: PlacementId,
    },
}

/// Reasons a move request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveError {
    /// No item with the provided identifier exists.
    #[error("placement does not exist")]
    MissingPlacement,
    /// The destination is not a legal placement.
    #[error(transparent)]
    Invalid(#[from] PlacementError),
}

/// Reasons a removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No item with the provided identifier exists.
    #[error("placement does not exist")]
    MissingPlacement,
}

/// Precondition failures reported by the expansion planner.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum ExpansionError {
    /// No candidate cells were supplied.
    #[error("no cells to expand to")]
    EmptyCandidateSet,
    /// No unlocked cells were supplied, so there is nothing to expand from.
    #[error("select at least one unlocked cell first")]
    EmptyUnlockedSet,
    /// A supplied cell lies outside the grid.
    #[error("cell ({}, {}) lies outside the grid", cell.row(), cell.column())]
    CellOutOfBounds {
        /// Offending cell.
        cell: Coord,
    },
}

/// One recommended unlock produced by the expansion planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpansionStep {
    /// Cell to unlock next.
    pub cell: Coord,
    /// One-based position in the recommended sequence.
    pub order: u32,
    /// Metric increase caused by unlocking the cell.
    pub gain: i64,
    /// Metric value after unlocking the cell.
    pub cumulative_potential: i64,
}

/// Ordered unlock recommendation returned by the expansion planner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionPlan {
    /// Recommended unlocks in order.
    pub steps: Vec<ExpansionStep>,
    /// Number of recommended unlocks.
    pub total_steps: usize,
    /// Metric value after the final step.
    pub final_potential: i64,
    /// Candidates that could not be reached through adjacency.
    pub unreachable: CellSet,
}

impl ExpansionPlan {
    /// First recommended unlock, if any.
    #[must_use]
    pub fn next_step(&self) -> Option<&ExpansionStep> {
        self.steps.first()
    }

    /// Reports whether the plan recommends no unlocks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Wire request accepted by the expansion optimizer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionRequest {
    /// Cells already unlocked.
    pub unlocked_cells: Vec<Coord>,
    /// Locked cells nominated as unlock candidates.
    pub locked_cells: Vec<Coord>,
}

impl ExpansionRequest {
    /// Converts the request into unlocked and candidate sets, rejecting off-grid cells.
    pub fn into_cell_sets(self, grid: GridSize) -> Result<(CellSet, CellSet), ExpansionError> {
        let check = |cell: Coord| {
            if grid.contains(cell) {
                Ok(cell)
            } else {
                Err(ExpansionError::CellOutOfBounds { cell })
            }
        };

        let unlocked = self
            .unlocked_cells
            .into_iter()
            .map(check)
            .collect::<Result<CellSet, _>>()?;
        let candidates = self
            .locked_cells
            .into_iter()
            .map(check)
            .collect::<Result<CellSet, _>>()?;
        Ok((unlocked, candidates))
    }
}

/// Wire form of a single expansion step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionResponseStep {
    /// Cell to unlock next.
    pub cell: Coord,
    /// One-based position in the sequence.
    pub order: u32,
    /// Spawn potential gained by the unlock.
    pub gloomgourd_gain: i64,
    /// Spawn potential after the unlock.
    pub gloomgourd_potential: i64,
}

/// Wire response produced by the expansion optimizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionResponse {
    /// Recommended unlocks in order.
    pub steps: Vec<ExpansionResponseStep>,
    /// Number of recommended unlocks.
    pub total_steps: usize,
    /// Spawn potential after the final step.
    pub final_gloomgourd_count: i64,
}

impl From<&ExpansionPlan> for ExpansionResponse {
    fn from(plan: &ExpansionPlan) -> Self {
        Self {
            steps: plan
                .steps
                .iter()
                .map(|step| ExpansionResponseStep {
                    cell: step.cell,
                    order: step.order,
                    gloomgourd_gain: step.gain,
                    gloomgourd_potential: step.cumulative_potential,
                })
                .collect(),
            total_steps: plan.total_steps,
            final_gloomgourd_count: plan.final_potential,
        }
    }
}
