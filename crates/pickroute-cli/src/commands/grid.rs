//! Grid command handler for inspecting the occupancy grid.

use std::path::Path;

use anyhow::{Context, Result};

use pickroute_cli::output::{render_grid_report, GridReport, OutputFormat};
use pickroute_cli::terminal::ColorPalette;

/// Handle the grid subcommand.
pub fn handle_grid_command(facility_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let facility = super::load(facility_path)?;
    let report = GridReport::new(&facility);
    let rendered = render_grid_report(&report, format, &ColorPalette::detect())
        .context("failed to serialize grid")?;
    print!("{rendered}");
    Ok(())
}
