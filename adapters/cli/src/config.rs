//! Planner configuration loaded from a versioned TOML file.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use garden_planner_core::{GridSize, DEFAULT_GRID_SIDE};
use garden_planner_system_expansion::{BuiltinMetric, MetricKind, SpawnSiteMetric};

const SUPPORTED_CONFIG_VERSION: u32 = 1;
const DEFAULT_CELL_SIZE: f32 = 48.0;
const DEFAULT_GAP: f32 = 4.0;

/// Resolved settings shared by every subcommand.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlannerConfig {
    /// Grid all coordinates are checked against.
    pub(crate) grid: GridSize,
    /// Metric scoring expansion plans.
    pub(crate) metric: MetricKind,
    /// Neighbour threshold used by the spawn-site metric.
    pub(crate) spawn_min_neighbors: u8,
    /// Edge length of a rendered cell in pixels.
    pub(crate) cell_size: f32,
    /// Spacing between rendered cells in pixels.
    pub(crate) gap: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::new(DEFAULT_GRID_SIDE),
            metric: MetricKind::default(),
            spawn_min_neighbors: SpawnSiteMetric::DEFAULT_MIN_NEIGHBORS,
            cell_size: DEFAULT_CELL_SIZE,
            gap: DEFAULT_GAP,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigOverrides {
    pub(crate) grid_side: Option<u32>,
    pub(crate) metric: Option<MetricKind>,
    pub(crate) spawn_min_neighbors: Option<u8>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    grid_side: Option<u32>,
    metric: Option<MetricKind>,
    spawn_min_neighbors: Option<u8>,
    cell_size: Option<f32>,
    gap: Option<f32>,
}

impl PlannerConfig {
    /// Loads the file when a path is given, then applies the overrides.
    pub(crate) fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::default(),
        };
        base.with_overrides(overrides)
    }

    /// Loads the configuration stored at the provided path.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read planner config at {}", path.display()))?;
        let config = parse_config(&contents)
            .with_context(|| format!("invalid planner config at {}", path.display()))?;
        log::debug!("loaded planner config from {}", path.display());
        Ok(config)
    }

    fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(side) = overrides.grid_side {
            self.grid = GridSize::new(side);
        }
        if let Some(metric) = overrides.metric {
            self.metric = metric;
        }
        if let Some(threshold) = overrides.spawn_min_neighbors {
            self.spawn_min_neighbors = threshold;
        }
        self.validate()?;
        Ok(self)
    }

    /// Instantiates the configured metric.
    pub(crate) fn build_metric(&self) -> BuiltinMetric {
        self.metric.build(self.spawn_min_neighbors)
    }

    fn validate(&self) -> Result<()> {
        if self.grid.side() == 0 {
            bail!("grid_side must be at least 1");
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            bail!("cell_size must be a positive number, got {}", self.cell_size);
        }
        if !(self.gap.is_finite() && self.gap >= 0.0) {
            bail!("gap must be a non-negative number, got {}", self.gap);
        }
        Ok(())
    }
}

fn parse_config(contents: &str) -> Result<PlannerConfig> {
    let file: ConfigFile =
        toml::from_str(contents).context("failed to parse planner config toml contents")?;
    if file.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported planner config version {}; expected {}",
            file.version,
            SUPPORTED_CONFIG_VERSION
        );
    }

    let defaults = PlannerConfig::default();
    let config = PlannerConfig {
        grid: file.grid_side.map_or(defaults.grid, GridSize::new),
        metric: file.metric.unwrap_or(defaults.metric),
        spawn_min_neighbors: file
            .spawn_min_neighbors
            .unwrap_or(defaults.spawn_min_neighbors),
        cell_size: file.cell_size.unwrap_or(defaults.cell_size),
        gap: file.gap.unwrap_or(defaults.gap),
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = parse_config("version = 1").expect("minimal config should parse");
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn parses_every_field() {
        let config = parse_config(
            r#"
            version = 1
            grid_side = 12
            metric = "spawn-sites"
            spawn_min_neighbors = 3
            cell_size = 32.0
            gap = 0.0
            "#,
        )
        .expect("full config should parse");

        assert_eq!(config.grid, GridSize::new(12));
        assert_eq!(config.metric, MetricKind::SpawnSites);
        assert_eq!(config.spawn_min_neighbors, 3);
        assert_eq!(config.cell_size, 32.0);
        assert_eq!(config.gap, 0.0);
    }

    #[test]
    fn rejects_unsupported_version() {
        let result = parse_config("version = 2");
        assert!(result.is_err(), "version 2 should be rejected");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = parse_config("version = 1\ngrid_width = 4");
        assert!(result.is_err(), "unknown keys should be rejected");
    }

    #[test]
    fn rejects_empty_grid() {
        let result = parse_config("version = 1\ngrid_side = 0");
        assert!(result.is_err(), "zero-sized grids should be rejected");
    }

    #[test]
    fn overrides_take_precedence() {
        let config = parse_config("version = 1\ngrid_side = 8\nmetric = \"spawn-sites\"")
            .expect("config should parse")
            .with_overrides(ConfigOverrides {
                grid_side: Some(6),
                metric: Some(MetricKind::CellCount),
                spawn_min_neighbors: None,
            })
            .expect("overrides should be accepted");

        assert_eq!(config.grid, GridSize::new(6));
        assert_eq!(config.metric, MetricKind::CellCount);
        assert_eq!(
            config.spawn_min_neighbors,
            SpawnSiteMetric::DEFAULT_MIN_NEIGHBORS
        );
    }

    #[test]
    fn zero_grid_override_is_rejected() {
        let result = PlannerConfig::default().with_overrides(ConfigOverrides {
            grid_side: Some(0),
            ..ConfigOverrides::default()
        });
        assert!(result.is_err(), "zero-sized grid override should be rejected");
    }
}
