#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Expansion-order planner that recommends which locked cells to unlock next.
//!
//! The planner is greedy: at every step it unlocks the adjacency-eligible
//! candidate with the largest marginal gain of a [`PotentialMetric`], breaking
//! ties by the lowest row-major coordinate. Every prefix of the returned plan
//! is therefore a locally optimal expansion, which matches how players follow
//! the plan one unlock at a time.
//!
//! The plan is *not* guaranteed to maximise the total area under the
//! cumulative-potential curve across all prefixes. Solving that exactly is an
//! exponential search over orderings; the greedy choice is a deliberate
//! trade-off and should only be replaced after weighing that cost.

use std::collections::{BTreeMap, BTreeSet};

use garden_planner_core::{CellSet, Coord, ExpansionError, ExpansionPlan, ExpansionStep};

pub use metrics::{
    BuiltinMetric, CellCountMetric, FnMetric, MetricKind, PotentialMetric, SpawnSiteMetric,
};
pub use tracker::PlanTracker;

mod metrics;
mod tracker;

/// Computes a greedy unlock order for `candidates`, growing from `unlocked`.
///
/// Candidates that are already unlocked are ignored. Candidates that cannot
/// be reached through a chain of edge-adjacent candidates are reported in
/// [`ExpansionPlan::unreachable`] and never appear as steps.
///
/// # Errors
///
/// Returns [`ExpansionError::EmptyCandidateSet`] when no candidate remains and
/// [`ExpansionError::EmptyUnlockedSet`] when there is nothing to expand from.
pub fn optimize_expansion<M>(
    unlocked: &CellSet,
    candidates: &CellSet,
    metric: &M,
) -> Result<ExpansionPlan, ExpansionError>
where
    M: PotentialMetric + ?Sized,
{
    let mut scratch = ExpansionScratch::new();
    optimize_expansion_with_scratch(unlocked, candidates, metric, &mut scratch)
}

/// Same as [`optimize_expansion`] but reuses caller-owned scratch buffers.
///
/// The scratch is reset on entry; afterwards [`ExpansionScratch::stats`]
/// reports how many gain evaluations the run reused.
pub fn optimize_expansion_with_scratch<M>(
    unlocked: &CellSet,
    candidates: &CellSet,
    metric: &M,
    scratch: &mut ExpansionScratch,
) -> Result<ExpansionPlan, ExpansionError>
where
    M: PotentialMetric + ?Sized,
{
    if candidates.is_empty() {
        return Err(ExpansionError::EmptyCandidateSet);
    }
    if unlocked.is_empty() {
        return Err(ExpansionError::EmptyUnlockedSet);
    }

    let mut remaining: CellSet = candidates
        .iter()
        .copied()
        .filter(|&cell| !unlocked.contains(cell))
        .collect();
    if remaining.len() != candidates.len() {
        log::debug!(
            "ignoring {} candidate(s) that are already unlocked",
            candidates.len() - remaining.len()
        );
    }
    if remaining.is_empty() {
        return Err(ExpansionError::EmptyCandidateSet);
    }

    scratch.reset();
    scratch.frontier.extend(
        remaining
            .iter()
            .copied()
            .filter(|&cell| unlocked.touches(cell)),
    );

    let mut current = unlocked.clone();
    let mut cumulative = metric.potential(&current);
    let mut steps = Vec::with_capacity(remaining.len());
    let mut order: u32 = 1;

    while !remaining.is_empty() {
        let Some((cell, gain)) = scratch.select_best(&current, metric) else {
            log::debug!(
                "{} candidate(s) unreachable from the unlocked region",
                remaining.len()
            );
            break;
        };

        let _ = remaining.remove(cell);
        let _ = current.insert(cell);
        let _ = scratch.frontier.remove(&cell);
        cumulative += gain;

        steps.push(ExpansionStep {
            cell,
            order,
            gain,
            cumulative_potential: cumulative,
        });
        log::debug!(
            "step {order}: unlock ({}, {}) gain {gain} potential {cumulative}",
            cell.row(),
            cell.column()
        );
        order += 1;

        scratch.invalidate_around(cell, metric.influence_radius());
        scratch.frontier.extend(
            cell.neighbors()
                .filter(|&neighbor| remaining.contains(neighbor)),
        );
    }

    log::debug!(
        "expansion plan ready: {} step(s), final potential {cumulative}, {} gain(s) reused",
        steps.len(),
        scratch.stats.hits
    );

    Ok(ExpansionPlan {
        total_steps: steps.len(),
        steps,
        final_potential: cumulative,
        unreachable: remaining,
    })
}

/// Counters describing how effectively the gain cache was reused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Gains served from the cache.
    pub hits: u64,
    /// Gains computed through the metric.
    pub misses: u64,
}

/// Reusable buffers for the planner: the eligible frontier and memoized gains.
///
/// Owned by the caller and passed into
/// [`optimize_expansion_with_scratch`]; there is no process-wide cache, so
/// tests can always start from a fresh instance.
#[derive(Debug, Default)]
pub struct ExpansionScratch {
    frontier: BTreeSet<Coord>,
    gains: BTreeMap<Coord, i64>,
    stats: CacheStats,
}

impl ExpansionScratch {
    /// Creates empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache counters for the most recent planner run.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    fn reset(&mut self) {
        self.frontier.clear();
        self.gains.clear();
        self.stats = CacheStats::default();
    }

    /// Picks the frontier cell with the largest gain; ties keep the first, lowest cell.
    fn select_best<M>(&mut self, current: &CellSet, metric: &M) -> Option<(Coord, i64)>
    where
        M: PotentialMetric + ?Sized,
    {
        let mut best: Option<(Coord, i64)> = None;

        for &cell in &self.frontier {
            let gain = match self.gains.get(&cell) {
                Some(&gain) => {
                    self.stats.hits += 1;
                    gain
                }
                None => {
                    self.stats.misses += 1;
                    let gain = metric.gain(current, cell);
                    let _ = self.gains.insert(cell, gain);
                    gain
                }
            };

            let replace = match best {
                None => true,
                Some((_, best_gain)) => gain > best_gain,
            };
            if replace {
                best = Some((cell, gain));
            }
        }

        best
    }

    fn invalidate_around(&mut self, unlocked: Coord, radius: Option<u32>) {
        match radius {
            None => self.gains.clear(),
            Some(radius) => {
                let before = self.gains.len();
                self.gains
                    .retain(|&cell, _| cell.manhattan_distance(unlocked) > radius);
                log::trace!(
                    "invalidated {} cached gain(s) around ({}, {})",
                    before - self.gains.len(),
                    unlocked.row(),
                    unlocked.column()
                );
            }
        }
    }
}
