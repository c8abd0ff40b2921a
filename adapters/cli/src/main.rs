#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter exposing the garden planner over JSON.

mod commands;
mod config;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use garden_planner_core::Coord;
use garden_planner_system_expansion::MetricKind;
use serde::Serialize;

use config::{ConfigOverrides, PlannerConfig};

/// Plans garden expansions and validates item placements.
#[derive(Debug, Parser)]
#[command(name = "garden-planner", version, about)]
struct CliArgs {
    /// Increases log verbosity (`-v` for debug, `-vv` for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Planner configuration file in TOML format.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Side length of the square grid, overriding the configuration.
    #[arg(long, value_name = "CELLS", global = true)]
    grid_side: Option<u32>,
    /// Pretty-prints the JSON output.
    #[arg(long, global = true)]
    pretty: bool,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Recommends the order in which locked cells should be unlocked.
    Optimize {
        /// JSON request file; reads standard input when omitted or `-`.
        #[arg(value_name = "REQUEST")]
        request: Option<PathBuf>,
        /// Metric used to score unlocked cells.
        #[arg(long, value_enum)]
        metric: Option<MetricArg>,
        /// Unlocked neighbours a cell needs to count as a spawn site.
        #[arg(long, value_name = "COUNT")]
        spawn_min_neighbors: Option<u8>,
    },
    /// Checks whether an item may be placed at a cell.
    Validate {
        /// JSON garden state file; reads standard input when omitted or `-`.
        #[arg(long, value_name = "PATH")]
        state: Option<PathBuf>,
        /// Upper-left cell of the footprint.
        #[arg(long, value_name = "ROW,COLUMN", value_parser = parse_cell)]
        at: Coord,
        /// Edge length of the square footprint.
        #[arg(long, default_value_t = 1)]
        size: u32,
        /// Identifier of the item being moved, ignored for overlap.
        #[arg(long, value_name = "ID")]
        exclude: Option<u32>,
    },
    /// Prints the rendering offset of a cell.
    Position {
        /// Cell to locate.
        #[arg(long, value_name = "ROW,COLUMN", value_parser = parse_cell)]
        at: Coord,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MetricArg {
    CellCount,
    SpawnSites,
}

impl From<MetricArg> for MetricKind {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::CellCount => Self::CellCount,
            MetricArg::SpawnSites => Self::SpawnSites,
        }
    }
}

/// Entry point for the garden planner command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let mut overrides = ConfigOverrides {
        grid_side: args.grid_side,
        ..ConfigOverrides::default()
    };
    if let CliCommand::Optimize {
        metric,
        spawn_min_neighbors,
        ..
    } = &args.command
    {
        overrides.metric = metric.map(MetricKind::from);
        overrides.spawn_min_neighbors = *spawn_min_neighbors;
    }
    let config = PlannerConfig::resolve(args.config.as_deref(), overrides)?;
    log::debug!("resolved configuration: {config:?}");

    match args.command {
        CliCommand::Optimize { request, .. } => {
            let request = read_input(request.as_deref())?;
            let response = commands::optimize(&request, &config)?;
            print_json(&response, args.pretty)
        }
        CliCommand::Validate {
            state,
            at,
            size,
            exclude,
        } => {
            let state = read_input(state.as_deref())?;
            let report = commands::validate(&state, &config, at, size, exclude)?;
            print_json(&report, args.pretty)
        }
        CliCommand::Position { at } => print_json(&commands::position(at, &config), args.pretty),
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        _ => {
            let mut buffer = String::new();
            let _ = io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read standard input")?;
            Ok(buffer)
        }
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("failed to serialize output json")?;
    println!("{rendered}");
    Ok(())
}

fn parse_cell(value: &str) -> Result<Coord, String> {
    let (row, column) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COLUMN but got `{value}`"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    Ok(Coord::new(row, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn parse_cell_accepts_spaces() {
        assert_eq!(parse_cell("3, 7"), Ok(Coord::new(3, 7)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("-1,2").is_err());
    }

    #[test]
    fn optimize_flags_parse() {
        let args = CliArgs::try_parse_from([
            "garden-planner",
            "-v",
            "optimize",
            "--metric",
            "spawn-sites",
            "--grid-side",
            "8",
            "request.json",
        ])
        .expect("arguments should parse");

        assert_eq!(args.verbose, 1);
        assert_eq!(args.grid_side, Some(8));
        match args.command {
            CliCommand::Optimize {
                request, metric, ..
            } => {
                assert_eq!(request, Some(PathBuf::from("request.json")));
                assert_eq!(metric, Some(MetricArg::SpawnSites));
            }
            other => panic!("unexpected subcommand: {other:?}"),
        }
    }
}
