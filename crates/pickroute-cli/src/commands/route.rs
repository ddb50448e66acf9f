//! Route command handler for sequencing pick tours.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use pickroute_cli::output::{render_route, OutputFormat};
use pickroute_cli::terminal::ColorPalette;
use pickroute_lib::{plan_route, Facility, Point, RouteRequest, RouteSummary, SiteId, StartPoint};

use super::RoutingArgs;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Start on an existing site.
    pub start_site: Option<SiteId>,
    /// Freeform start coordinate.
    pub start: Option<Point>,
    /// Sites to visit, in request order.
    pub targets: Vec<SiteId>,
    pub routing: RoutingArgs,
}

impl RouteCommandArgs {
    /// Start point: `--start-site`, then `--start`, then the facility's own.
    pub fn resolve_start(&self, facility: &Facility) -> Result<Option<StartPoint>> {
        if let Some(id) = self.start_site {
            let start = StartPoint::from_site(&facility.sites, id)
                .with_context(|| format!("cannot start at site {id}"))?;
            return Ok(Some(start));
        }
        Ok(self.start.map(StartPoint::at).or(facility.start))
    }

    /// Convert CLI args to a library RouteRequest.
    pub fn to_request(&self, facility: &Facility) -> Result<RouteRequest> {
        let start = self.resolve_start(facility)?;
        Ok(RouteRequest::new(start, self.targets.iter().copied())
            .with_calibration(facility.calibration)
            .with_config(self.routing.apply(facility.routing)))
    }
}

/// Handle the route subcommand.
pub fn handle_route_command(
    facility_path: Option<&Path>,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let facility = super::load(facility_path)?;

    for id in &args.targets {
        if facility.site(*id).is_none() {
            warn!(id, "ignoring unknown target site");
        }
    }

    let request = args.to_request(&facility)?;
    if request.start.is_none() {
        warn!("no start point given and the facility has none; route is empty");
    }

    let route = plan_route(&facility.grid, &facility.sites, &request);
    let summary = RouteSummary::from_route(&route, &facility.sites, request.start.as_ref());
    let rendered = render_route(&route, &summary, format, &ColorPalette::detect())
        .context("failed to serialize route")?;
    print!("{rendered}");
    Ok(())
}
