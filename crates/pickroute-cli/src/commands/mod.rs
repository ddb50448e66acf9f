// Module exports for CLI subcommands
//
// Each module handles a specific CLI subcommand. The main.rs dispatches to
// these handlers, keeping the entry point focused on parsing and coordination.

pub mod grid;
pub mod path;
pub mod route;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use pickroute_lib::{
    load_facility, resolve_facility_path, Facility, Point, RouteStrategy, RoutingConfig,
};

/// Routing overrides shared by the `route` and `path` subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct RoutingArgs {
    /// Sequencing strategy: `grid` (walls respected, 2-opt) or `nearest`
    /// (straight lines).
    #[arg(long)]
    pub strategy: Option<RouteStrategy>,
    /// Ring radius, in cells, used to move blocked endpoints onto open cells.
    #[arg(long)]
    pub snap_radius: Option<u32>,
    /// Minimum 2-opt gain, in plane units, for a reversal to be applied.
    #[arg(long)]
    pub tolerance: Option<f64>,
}

impl RoutingArgs {
    /// Layer the command-line overrides over the facility's routing config.
    pub fn apply(&self, base: RoutingConfig) -> RoutingConfig {
        RoutingConfig {
            strategy: self.strategy.unwrap_or(base.strategy),
            snap_radius: self.snap_radius.unwrap_or(base.snap_radius),
            improvement_tolerance: self.tolerance.unwrap_or(base.improvement_tolerance),
            ..base
        }
    }
}

/// Resolve and load the facility bundle.
pub fn load(explicit: Option<&Path>) -> Result<Facility> {
    let path = resolve_facility_path(explicit).context("failed to resolve the facility file")?;
    debug!(path = %path.display(), "loading facility");
    load_facility(&path)
        .with_context(|| format!("failed to load facility from {}", path.display()))
}

/// Parse an `X,Y` plane coordinate.
pub fn parse_point(value: &str) -> std::result::Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| format!("invalid coordinate '{}' in '{value}'", part.trim()))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}
