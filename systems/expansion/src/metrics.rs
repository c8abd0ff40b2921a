//! Potential metrics scoring a set of unlocked cells.

use garden_planner_core::{CellSet, Coord};
use serde::{Deserialize, Serialize};

/// Scoring function over a configuration of unlocked cells.
///
/// Implementations must be pure. The greedy planner assumes the metric is
/// monotone non-decreasing as cells are added; a metric that can shrink still
/// produces a deterministic plan, but its cumulative potential may then fall
/// between steps.
pub trait PotentialMetric {
    /// Scores the provided configuration.
    fn potential(&self, unlocked: &CellSet) -> i64;

    /// Score increase caused by additionally unlocking `cell`.
    ///
    /// The default clones the set and scores it twice. Metrics with local
    /// structure should override this with an incremental computation.
    fn gain(&self, unlocked: &CellSet, cell: Coord) -> i64 {
        let mut next = unlocked.clone();
        let _ = next.insert(cell);
        self.potential(&next) - self.potential(unlocked)
    }

    /// Manhattan radius around a newly unlocked cell outside of which gains are unaffected.
    ///
    /// `None` means any unlock may change any gain, which disables gain reuse
    /// between planner steps.
    fn influence_radius(&self) -> Option<u32> {
        None
    }
}

impl<M: PotentialMetric + ?Sized> PotentialMetric for &M {
    fn potential(&self, unlocked: &CellSet) -> i64 {
        (**self).potential(unlocked)
    }

    fn gain(&self, unlocked: &CellSet, cell: Coord) -> i64 {
        (**self).gain(unlocked, cell)
    }

    fn influence_radius(&self) -> Option<u32> {
        (**self).influence_radius()
    }
}

impl<M: PotentialMetric + ?Sized> PotentialMetric for Box<M> {
    fn potential(&self, unlocked: &CellSet) -> i64 {
        (**self).potential(unlocked)
    }

    fn gain(&self, unlocked: &CellSet, cell: Coord) -> i64 {
        (**self).gain(unlocked, cell)
    }

    fn influence_radius(&self) -> Option<u32> {
        (**self).influence_radius()
    }
}

/// Linear proxy metric: the number of unlocked cells.
///
/// The true spawn rule of the game is hidden, so this is the reference
/// assumption: every unlocked cell contributes the same potential.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellCountMetric;

impl PotentialMetric for CellCountMetric {
    fn potential(&self, unlocked: &CellSet) -> i64 {
        i64::try_from(unlocked.len()).unwrap_or(i64::MAX)
    }

    fn gain(&self, unlocked: &CellSet, cell: Coord) -> i64 {
        if unlocked.contains(cell) {
            0
        } else {
            1
        }
    }

    fn influence_radius(&self) -> Option<u32> {
        Some(0)
    }
}

/// Counts spawn sites: unlocked cells with at least `min_neighbors` unlocked edge neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnSiteMetric {
    min_neighbors: u8,
}

impl SpawnSiteMetric {
    /// Default neighbour threshold for a cell to count as a spawn site.
    pub const DEFAULT_MIN_NEIGHBORS: u8 = 2;

    /// Creates a metric with the provided neighbour threshold.
    #[must_use]
    pub const fn new(min_neighbors: u8) -> Self {
        Self { min_neighbors }
    }

    /// Neighbour threshold for a cell to count as a spawn site.
    #[must_use]
    pub const fn min_neighbors(&self) -> u8 {
        self.min_neighbors
    }

    fn threshold(&self) -> usize {
        usize::from(self.min_neighbors)
    }
}

impl Default for SpawnSiteMetric {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_NEIGHBORS)
    }
}

impl PotentialMetric for SpawnSiteMetric {
    fn potential(&self, unlocked: &CellSet) -> i64 {
        let sites = unlocked
            .iter()
            .filter(|&&cell| unlocked.adjacent_count(cell) >= self.threshold())
            .count();
        i64::try_from(sites).unwrap_or(i64::MAX)
    }

    fn gain(&self, unlocked: &CellSet, cell: Coord) -> i64 {
        if unlocked.contains(cell) {
            return 0;
        }

        let mut gain = 0;
        if unlocked.adjacent_count(cell) >= self.threshold() {
            gain += 1;
        }

        // neighbours sitting one short of the threshold become sites
        gain += cell
            .neighbors()
            .filter(|&neighbor| unlocked.contains(neighbor))
            .filter(|&neighbor| unlocked.adjacent_count(neighbor) + 1 == self.threshold())
            .count() as i64;

        gain
    }

    fn influence_radius(&self) -> Option<u32> {
        Some(2)
    }
}

/// Adapts a plain scoring closure into a [`PotentialMetric`].
#[derive(Clone, Copy, Debug)]
pub struct FnMetric<F> {
    score: F,
    influence_radius: Option<u32>,
}

impl<F> FnMetric<F>
where
    F: Fn(&CellSet) -> i64,
{
    /// Wraps a closure with unknown locality; gains are recomputed every step.
    #[must_use]
    pub fn new(score: F) -> Self {
        Self {
            score,
            influence_radius: None,
        }
    }

    /// Wraps a closure whose gains only change within `radius` of a new unlock.
    #[must_use]
    pub fn with_influence_radius(score: F, radius: u32) -> Self {
        Self {
            score,
            influence_radius: Some(radius),
        }
    }
}

impl<F> PotentialMetric for FnMetric<F>
where
    F: Fn(&CellSet) -> i64,
{
    fn potential(&self, unlocked: &CellSet) -> i64 {
        (self.score)(unlocked)
    }

    fn influence_radius(&self) -> Option<u32> {
        self.influence_radius
    }
}

/// Built-in metrics selectable from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    /// [`CellCountMetric`].
    #[default]
    CellCount,
    /// [`SpawnSiteMetric`].
    SpawnSites,
}

impl MetricKind {
    /// Instantiates the metric, using `spawn_min_neighbors` for spawn-site scoring.
    #[must_use]
    pub const fn build(self, spawn_min_neighbors: u8) -> BuiltinMetric {
        match self {
            Self::CellCount => BuiltinMetric::CellCount(CellCountMetric),
            Self::SpawnSites => BuiltinMetric::SpawnSites(SpawnSiteMetric::new(spawn_min_neighbors)),
        }
    }
}

/// Concrete built-in metric chosen at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinMetric {
    /// Linear cell-count proxy.
    CellCount(CellCountMetric),
    /// Adjacency-dependent spawn-site count.
    SpawnSites(SpawnSiteMetric),
}

impl PotentialMetric for BuiltinMetric {
    fn potential(&self, unlocked: &CellSet) -> i64 {
        match self {
            Self::CellCount(metric) => metric.potential(unlocked),
            Self::SpawnSites(metric) => metric.potential(unlocked),
        }
    }

    fn gain(&self, unlocked: &CellSet, cell: Coord) -> i64 {
        match self {
            Self::CellCount(metric) => metric.gain(unlocked, cell),
            Self::SpawnSites(metric) => metric.gain(unlocked, cell),
        }
    }

    fn influence_radius(&self) -> Option<u32> {
        match self {
            Self::CellCount(metric) => metric.influence_radius(),
            Self::SpawnSites(metric) => metric.influence_radius(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCountMetric, FnMetric, PotentialMetric, SpawnSiteMetric};
    use garden_planner_core::{CellSet, Coord, GridSize};

    fn cells(coords: &[(u32, u32)]) -> CellSet {
        coords.iter().copied().map(Coord::from).collect()
    }

    #[test]
    fn cell_count_gain_is_one_for_new_cells() {
        let unlocked = cells(&[(0, 0)]);
        assert_eq!(CellCountMetric.potential(&unlocked), 1);
        assert_eq!(CellCountMetric.gain(&unlocked, Coord::new(0, 1)), 1);
        assert_eq!(CellCountMetric.gain(&unlocked, Coord::new(0, 0)), 0);
    }

    #[test]
    fn spawn_sites_require_threshold_neighbors() {
        let metric = SpawnSiteMetric::new(2);
        let l_shape = cells(&[(0, 0), (0, 1), (1, 0)]);
        assert_eq!(metric.potential(&l_shape), 1, "only the corner has two neighbours");

        let square = cells(&[(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert_eq!(metric.potential(&square), 4);
    }

    #[test]
    fn spawn_site_gain_matches_full_recomputation() {
        let metric = SpawnSiteMetric::new(2);
        let reference = FnMetric::new(|set: &CellSet| metric.potential(set));
        let unlocked = cells(&[(2, 2), (2, 3), (3, 2), (4, 2), (4, 3), (1, 4)]);

        for cell in GridSize::new(6).cells() {
            if unlocked.contains(cell) {
                continue;
            }
            assert_eq!(
                metric.gain(&unlocked, cell),
                reference.gain(&unlocked, cell),
                "incremental gain diverged at {cell:?}"
            );
        }
    }

    #[test]
    fn zero_threshold_counts_every_cell() {
        let metric = SpawnSiteMetric::new(0);
        let unlocked = cells(&[(5, 5)]);
        assert_eq!(metric.potential(&unlocked), 1);
        assert_eq!(metric.gain(&unlocked, Coord::new(5, 6)), 1);
    }
}
