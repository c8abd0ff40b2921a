//! JSON-in, JSON-out implementations of the subcommands.

use anyhow::{Context, Result};
use garden_planner_core::{
    pixel_position, CellSet, Coord, ExpansionRequest, ExpansionResponse, GardenSnapshot, GridSize,
    PixelPosition, Placement, PlacementError, PlacementId,
};
use garden_planner_system_expansion::optimize_expansion;
use garden_planner_system_placement::validate_in_snapshot;
use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;

/// Garden state accepted by `validate`; the grid falls back to the configured one.
#[derive(Debug, Deserialize)]
struct StateFile {
    #[serde(default)]
    grid_side: Option<u32>,
    unlocked_cells: CellSet,
    #[serde(default)]
    placements: Vec<Placement>,
}

/// Verdict printed by `validate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct ValidationReport {
    pub(crate) valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<PlacementError>,
}

/// Plans an unlock order for the JSON request.
pub(crate) fn optimize(request: &str, config: &PlannerConfig) -> Result<ExpansionResponse> {
    let request: ExpansionRequest =
        serde_json::from_str(request).context("failed to parse expansion request json")?;
    let (unlocked, candidates) = request.into_cell_sets(config.grid)?;

    let metric = config.build_metric();
    log::info!(
        "planning {} candidate(s) from {} unlocked cell(s) with {:?}",
        candidates.len(),
        unlocked.len(),
        config.metric
    );
    let plan = optimize_expansion(&unlocked, &candidates, &metric)?;

    if !plan.unreachable.is_empty() {
        let cells = plan
            .unreachable
            .iter()
            .map(|cell| format!("({}, {})", cell.row(), cell.column()))
            .collect::<Vec<_>>()
            .join(", ");
        log::warn!("candidates unreachable from the unlocked region: {cells}");
    }

    Ok(ExpansionResponse::from(&plan))
}

/// Checks whether an item fits at `at` within the JSON garden state.
pub(crate) fn validate(
    state: &str,
    config: &PlannerConfig,
    at: Coord,
    size: u32,
    exclude: Option<u32>,
) -> Result<ValidationReport> {
    let state: StateFile =
        serde_json::from_str(state).context("failed to parse garden state json")?;
    let grid = state.grid_side.map_or(config.grid, GridSize::new);

    let mut placements = state.placements;
    placements.sort_by_key(|placement| placement.id);
    let snapshot = GardenSnapshot {
        grid,
        unlocked: state.unlocked_cells,
        placements,
    };

    let reason = validate_in_snapshot(&snapshot, at, size, exclude.map(PlacementId::new)).err();
    if let Some(reason) = reason {
        log::info!(
            "size {size} at ({}, {}) rejected: {reason}",
            at.row(),
            at.column()
        );
    }

    Ok(ValidationReport {
        valid: reason.is_none(),
        reason,
    })
}

/// Rendering offset of the cell under the configured layout.
pub(crate) fn position(at: Coord, config: &PlannerConfig) -> PixelPosition {
    pixel_position(at.row(), at.column(), config.cell_size, config.gap)
}
