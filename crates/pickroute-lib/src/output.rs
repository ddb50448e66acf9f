use std::fmt::Write;

use serde::Serialize;

use crate::grid::{Cell, CellKind, OccupancyGrid, Point};
use crate::routing::{Route, RouteStrategy};
use crate::site::{find_site, Site, SiteId, StartPoint};

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Numbered stops with per-leg distances and totals.
    PlainText,
    /// Markdown list suitable for pasting into a ticket or chat.
    RichText,
    /// Single line of site names joined by arrows.
    Compact,
}

/// Stop within a summarized route.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStop {
    pub index: usize,
    pub id: SiteId,
    pub name: String,
    pub distance_raster: f64,
    pub distance_meters: Option<f64>,
    pub eta_seconds: Option<f64>,
}

/// Structured representation of a route that renderers and serializers share.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub strategy: RouteStrategy,
    pub start: String,
    pub stops: Vec<SummaryStop>,
    pub total_raster: f64,
    pub total_meters: Option<f64>,
    pub total_seconds: Option<f64>,
    pub uncalibrated: bool,
    pub omitted: Vec<SiteId>,
}

impl RouteSummary {
    /// Summarize a route, naming the start after its site when it has one.
    pub fn from_route(route: &Route, sites: &[Site], start: Option<&StartPoint>) -> Self {
        let start = match start {
            Some(StartPoint {
                site_id: Some(id), ..
            }) => find_site(sites, *id)
                .map(Site::display_name)
                .unwrap_or_else(|| format!("Site {id}")),
            Some(point) => format!("{}", point.position()),
            None => "<none>".to_string(),
        };

        let stops = route
            .order
            .iter()
            .zip(&route.steps)
            .enumerate()
            .map(|(index, (site, step))| SummaryStop {
                index: index + 1,
                id: site.id,
                name: site.display_name(),
                distance_raster: step.distance_raster,
                distance_meters: step.distance_meters,
                eta_seconds: step.eta_seconds,
            })
            .collect();

        Self {
            strategy: route.strategy,
            start,
            stops,
            total_raster: route.total_raster,
            total_meters: route.total_meters,
            total_seconds: route.total_seconds,
            uncalibrated: route.uncalibrated,
            omitted: route.omitted.clone(),
        }
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
            RouteRenderMode::Compact => self.render_compact(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route from {} ({} stops, strategy: {})",
            self.start,
            self.stops.len(),
            self.strategy
        );
        for stop in &self.stops {
            let _ = writeln!(
                buffer,
                "{:>3}: {} ({}) {:.1} px, {}, {}",
                stop.index,
                stop.name,
                stop.id,
                stop.distance_raster,
                format_meters(stop.distance_meters),
                format_eta(stop.eta_seconds)
            );
        }
        let _ = writeln!(
            buffer,
            "Total: {:.1} px, {}, {}",
            self.total_raster,
            format_meters(self.total_meters),
            format_eta(self.total_seconds)
        );
        if self.uncalibrated {
            let _ = writeln!(buffer, "Scale not calibrated; physical values unknown");
        }
        if !self.omitted.is_empty() {
            let _ = writeln!(buffer, "Unreachable: {}", join_ids(&self.omitted));
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "**Route** from _{}_ ({} stops, strategy: `{}`)",
            self.start,
            self.stops.len(),
            self.strategy
        );
        for stop in &self.stops {
            let _ = writeln!(
                buffer,
                "* {:>2}. **{}** (`{}`) {}, {}",
                stop.index,
                stop.name,
                stop.id,
                format_meters(stop.distance_meters),
                format_eta(stop.eta_seconds)
            );
        }
        let _ = writeln!(
            buffer,
            "**Total:** {}, {}",
            format_meters(self.total_meters),
            format_eta(self.total_seconds)
        );
        if !self.omitted.is_empty() {
            let _ = writeln!(buffer, "_Unreachable:_ {}", join_ids(&self.omitted));
        }
        buffer
    }

    fn render_compact(&self) -> String {
        let mut parts = vec![self.start.clone()];
        parts.extend(self.stops.iter().map(|stop| stop.name.clone()));
        let mut line = parts.join(" -> ");
        if !self.omitted.is_empty() {
            let _ = write!(line, " (unreachable: {})", join_ids(&self.omitted));
        }
        line.push('\n');
        line
    }
}

/// Distance in meters, or "unknown" without a calibration.
pub fn format_meters(meters: Option<f64>) -> String {
    match meters {
        Some(value) => format!("{value:.1} m"),
        None => "unknown".to_string(),
    }
}

/// Walking time as `Xm YYs` (or `Ys` below a minute), or "unknown".
pub fn format_eta(seconds: Option<f64>) -> String {
    match seconds {
        Some(value) if value.is_finite() => {
            let total = value.round().max(0.0) as u64;
            let (minutes, secs) = (total / 60, total % 60);
            if minutes > 0 {
                format!("{minutes}m {secs:02}s")
            } else {
                format!("{secs}s")
            }
        }
        _ => "unknown".to_string(),
    }
}

fn join_ids(ids: &[SiteId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// ASCII map of the grid, one character per cell, rows top to bottom.
///
/// `#` wall, `~` zone, `.` open, `S` a cell holding a site, `@` the start.
pub fn render_grid(grid: &OccupancyGrid, sites: &[Site], start: Option<&StartPoint>) -> String {
    let mut rows: Vec<Vec<char>> = (0..grid.rows())
        .map(|row| {
            (0..grid.cols())
                .map(|col| match grid.kind_at(Cell::new(col as i32, row as i32)) {
                    Some(CellKind::Wall) => '#',
                    Some(CellKind::Zone) => '~',
                    None => '.',
                })
                .collect()
        })
        .collect();

    let mut mark = |point: Point, symbol: char| {
        let cell = grid.to_cell(point);
        rows[cell.row as usize][cell.col as usize] = symbol;
    };
    for site in sites {
        mark(site.position(), 'S');
    }
    if let Some(start) = start {
        mark(start.position(), '@');
    }

    let mut buffer = String::with_capacity(grid.rows() * (grid.cols() + 1));
    for row in rows {
        buffer.extend(row);
        buffer.push('\n');
    }
    buffer
}
