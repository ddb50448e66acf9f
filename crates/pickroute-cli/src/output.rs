//! Output formatting for routes, paths and grids.
//!
//! Text renderers return strings so the command handlers decide where they go
//! and tests can inspect them without capturing stdout.

use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;

use pickroute_lib::output::{format_eta, format_meters};
use pickroute_lib::{
    render_grid, Calibration, Facility, GridPath, Point, Route, RouteRenderMode, RouteSummary,
};

use crate::terminal::{group_thousands, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text with optional colors.
    #[default]
    Text,
    /// Markdown list for tickets and chat.
    Rich,
    /// Single line of stop names.
    Compact,
    /// Machine-readable JSON.
    Json,
}

/// Render a planned route in the requested format.
pub fn render_route(
    route: &Route,
    summary: &RouteSummary,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_route_text(summary, palette),
        OutputFormat::Rich => summary.render(RouteRenderMode::RichText),
        OutputFormat::Compact => summary.render(RouteRenderMode::Compact),
        OutputFormat::Json => serde_json::to_string_pretty(route)? + "\n",
    })
}

/// Tagged stop list with per-leg distances and totals.
pub fn render_route_text(summary: &RouteSummary, palette: &ColorPalette) -> String {
    let p = palette;
    let mut buffer = String::new();
    let _ = writeln!(
        buffer,
        "Route from {} ({} stops; strategy: {}):",
        summary.start,
        summary.stops.len(),
        summary.strategy
    );
    let _ = writeln!(
        buffer,
        "{}STRT{} {}{}{}",
        p.tag_start, p.reset, p.site, summary.start, p.reset
    );
    for stop in &summary.stops {
        let _ = writeln!(
            buffer,
            "{}PICK{} {:>2}. {}{}{} {}#{}{} {}({:.1} px){} {}{}{} {}{}{}",
            p.tag_pick,
            p.reset,
            stop.index,
            p.site,
            stop.name,
            p.reset,
            p.muted,
            stop.id,
            p.reset,
            p.muted,
            stop.distance_raster,
            p.reset,
            p.meters,
            format_meters(stop.distance_meters),
            p.reset,
            p.time,
            format_eta(stop.eta_seconds),
            p.reset
        );
    }
    for id in &summary.omitted {
        let _ = writeln!(
            buffer,
            "{}SKIP{} {}#{} unreachable{}",
            p.tag_skip, p.reset, p.error, id, p.reset
        );
    }

    let _ = writeln!(
        buffer,
        "\nTotal distance: {} ({:.1} px)",
        format_meters(summary.total_meters),
        summary.total_raster
    );
    let _ = writeln!(buffer, "Walking time: {}", format_eta(summary.total_seconds));
    if summary.uncalibrated {
        let _ = writeln!(
            buffer,
            "{}Scale not calibrated: physical distances and times are unknown.{}",
            p.warning, p.reset
        );
    }
    buffer
}

/// JSON payload for the `path` subcommand.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathReport {
    pub from: Point,
    pub to: Point,
    pub reachable: bool,
    pub points: Vec<Point>,
    /// `None` when the endpoints are not connected.
    pub length_raster: Option<f64>,
    pub length_meters: Option<f64>,
    pub eta_seconds: Option<f64>,
}

impl PathReport {
    pub fn new(from: Point, to: Point, path: &GridPath, calibration: &Calibration) -> Self {
        let reachable = path.is_reachable();
        let reading = calibration.measure(path.length);
        Self {
            from,
            to,
            reachable,
            points: path.points.clone(),
            length_raster: reachable.then_some(path.length),
            length_meters: reading.meters.filter(|_| reachable),
            eta_seconds: reading.seconds.filter(|_| reachable),
        }
    }
}

pub fn render_path(
    report: &PathReport,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)? + "\n");
    }

    let p = palette;
    let mut buffer = String::new();
    let Some(length) = report.length_raster else {
        let _ = writeln!(
            buffer,
            "{}No walkable path from {} to {}.{}",
            p.error, report.from, report.to, p.reset
        );
        return Ok(buffer);
    };

    let _ = writeln!(
        buffer,
        "Path from {} to {} ({} waypoints):",
        report.from,
        report.to,
        report.points.len()
    );
    for point in &report.points {
        let _ = writeln!(buffer, "  {}{}{}", p.muted, point, p.reset);
    }
    let _ = writeln!(
        buffer,
        "Length: {:.1} px, {}{}{}, {}{}{}",
        length,
        p.meters,
        format_meters(report.length_meters),
        p.reset,
        p.time,
        format_eta(report.eta_seconds),
        p.reset
    );
    Ok(buffer)
}

/// JSON payload for the `grid` subcommand.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridReport {
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f64,
    pub walls: usize,
    pub zones: usize,
    pub sites: usize,
    pub pixels_per_meter: Option<f64>,
    pub map: Vec<String>,
}

impl GridReport {
    pub fn new(facility: &Facility) -> Self {
        let grid = &facility.grid;
        let map = render_grid(grid, &facility.sites, facility.start.as_ref())
            .lines()
            .map(str::to_string)
            .collect();
        Self {
            cols: grid.cols(),
            rows: grid.rows(),
            cell_size: grid.cell_size(),
            walls: grid.wall_count(),
            zones: grid.zone_count(),
            sites: facility.sites.len(),
            pixels_per_meter: facility.calibration.scale(),
            map,
        }
    }
}

pub fn render_grid_report(
    report: &GridReport,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)? + "\n");
    }

    let p = palette;
    let mut buffer = String::new();
    let cells = (report.cols * report.rows) as u64;
    let _ = writeln!(
        buffer,
        "Grid {} x {} ({} cells of {} px)",
        report.cols,
        report.rows,
        group_thousands(cells),
        report.cell_size
    );
    let _ = writeln!(
        buffer,
        "Walls: {}  Zones: {}  Sites: {}",
        report.walls, report.zones, report.sites
    );
    match report.pixels_per_meter {
        Some(ppm) => {
            let _ = writeln!(buffer, "Scale: {ppm} px/m");
        }
        None => {
            let _ = writeln!(buffer, "{}Scale: not calibrated{}", p.warning, p.reset);
        }
    }
    buffer.push('\n');
    for line in &report.map {
        for symbol in line.chars() {
            buffer.push_str(&p.paint(p.cell(symbol), symbol));
        }
        buffer.push('\n');
    }
    Ok(buffer)
}

/// Print the footer with elapsed time.
pub fn print_footer(elapsed: std::time::Duration, palette: &ColorPalette) {
    let elapsed_ms = elapsed.as_millis();
    let time_str = if elapsed_ms < 1000 {
        format!("{}ms", elapsed_ms)
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    };
    println!("\n{}Completed in {}{}", palette.muted, time_str, palette.reset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickroute_lib::{plan_route, OccupancyGrid, RouteRequest, Site, StartPoint};

    fn facility() -> Facility {
        let mut facility = Facility::new(OccupancyGrid::with_dimensions(6, 4, 10.0).unwrap());
        facility.sites = vec![
            Site::new(1, 25.0, 5.0).with_label("A-01"),
            Site::new(2, 55.0, 35.0),
        ];
        facility.start = Some(StartPoint::at(Point::new(5.0, 5.0)));
        facility
    }

    #[test]
    fn text_route_lists_tagged_stops() {
        let facility = facility();
        let request = RouteRequest::new(facility.start, [2, 1]);
        let route = plan_route(&facility.grid, &facility.sites, &request);
        let summary = RouteSummary::from_route(&route, &facility.sites, facility.start.as_ref());

        let text = render_route_text(&summary, &ColorPalette::plain());
        assert!(text.contains("PICK  1. A-01 #1 (20.0 px) unknown unknown"));
        assert!(text.contains("Walking time: unknown"));
        assert!(text.contains("not calibrated"));
    }

    #[test]
    fn unreachable_path_has_no_length() {
        let path = GridPath::unreachable();
        let report = PathReport::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            &path,
            &Calibration::with_scale(2.0),
        );
        assert_eq!(report.length_raster, None);
        assert_eq!(report.length_meters, None);
        let text = render_path(&report, OutputFormat::Text, &ColorPalette::plain()).unwrap();
        assert!(text.starts_with("No walkable path"));
    }

    #[test]
    fn grid_report_counts_and_map() {
        let mut facility = facility();
        facility
            .grid
            .set_blocked(pickroute_lib::Cell::new(3, 0), pickroute_lib::CellKind::Wall, true);
        let report = GridReport::new(&facility);
        assert_eq!(report.walls, 1);
        assert_eq!(report.map[0], "@.S#..");

        let text = render_grid_report(&report, OutputFormat::Text, &ColorPalette::plain()).unwrap();
        assert!(text.contains("Grid 6 x 4 (24 cells of 10 px)"));
        assert!(text.contains("Scale: not calibrated"));
    }
}
