//! Path command handler for single point-to-point walks.

use std::path::Path;

use anyhow::{Context, Result};

use pickroute_cli::output::{render_path, OutputFormat, PathReport};
use pickroute_cli::terminal::ColorPalette;
use pickroute_lib::{find_path_dijkstra, Point, SearchOptions};

use super::RoutingArgs;

/// Handle the path subcommand.
pub fn handle_path_command(
    facility_path: Option<&Path>,
    format: OutputFormat,
    from: Point,
    to: Point,
    routing: &RoutingArgs,
) -> Result<()> {
    let facility = super::load(facility_path)?;
    let config = routing.apply(facility.routing);
    let options = SearchOptions {
        snap_radius: config.snap_radius,
    };

    let path = find_path_dijkstra(&facility.grid, from, to, &options);
    let report = PathReport::new(from, to, &path, &facility.calibration);
    let rendered = render_path(&report, format, &ColorPalette::detect())
        .context("failed to serialize path")?;
    print!("{rendered}");
    Ok(())
}
