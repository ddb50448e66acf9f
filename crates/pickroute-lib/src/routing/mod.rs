//! Tour planning for pick walks through the facility.
//!
//! This module provides:
//! - [`RouteStrategy`] - Supported sequencing strategies (nearest, grid)
//! - [`RoutingConfig`] - Tunables for path search and tour improvement
//! - [`RouteRequest`] - Start point, target sites and calibration
//! - [`Route`] - Ordered stops, per-leg paths and totals
//! - [`plan_route`] - Main entry point for computing routes
//!
//! # Strategy Pattern
//!
//! Sequencing goes through the [`TourPlanner`] trait. The straight-line
//! nearest-neighbour planner and the grid planner (memoized grid paths,
//! nearest-neighbour construction and 2-opt) are interchangeable and chosen
//! from [`RoutingConfig::strategy`] on every computation.
//!
//! # Example
//!
//! ```ignore
//! use pickroute_lib::{load_facility, plan_route, RouteRequest};
//!
//! let facility = load_facility("facility.json")?;
//! let request = RouteRequest::new(facility.start, [3, 7, 12])
//!     .with_calibration(facility.calibration);
//! let route = plan_route(&facility.grid, &facility.sites, &request);
//! println!("{} stops, {:.0}px", route.stop_count(), route.total_raster);
//! ```

mod oracle;
mod planner;
mod tour;

pub use oracle::{DistanceOracle, GridOracle, StraightLineOracle};
pub use planner::{select_planner, GridPlanner, NearestNeighborPlanner, TourPlan, TourPlanner};
pub use tour::{nearest_neighbor, tour_length, two_opt, Construction, TwoOptSettings};

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calibration::Calibration;
use crate::grid::{OccupancyGrid, Point};
use crate::path::{GridPath, DEFAULT_SNAP_RADIUS};
use crate::site::{find_site, Site, SiteId, StartPoint};

/// Default tolerance below which a 2-opt gain is treated as noise.
pub const DEFAULT_IMPROVEMENT_TOLERANCE: f64 = 1e-6;

/// Default cap on 2-opt reversals per computation.
pub const DEFAULT_MAX_IMPROVEMENTS: usize = 1000;

/// Supported tour sequencing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    /// Greedy order over straight-line distances.
    Nearest,
    /// Grid shortest paths with greedy construction and 2-opt.
    #[default]
    Grid,
}

impl fmt::Display for RouteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteStrategy::Nearest => "nearest",
            RouteStrategy::Grid => "grid",
        };
        f.write_str(value)
    }
}

impl FromStr for RouteStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(RouteStrategy::Nearest),
            "grid" | "dijkstra" => Ok(RouteStrategy::Grid),
            other => Err(format!("unknown routing strategy '{other}'")),
        }
    }
}

/// Tunables for route computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    pub strategy: RouteStrategy,
    /// Ring radius used to snap blocked endpoints to open cells.
    pub snap_radius: u32,
    /// Minimum 2-opt gain in plane units.
    pub improvement_tolerance: f64,
    pub max_improvements: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strategy: RouteStrategy::default(),
            snap_radius: DEFAULT_SNAP_RADIUS,
            improvement_tolerance: DEFAULT_IMPROVEMENT_TOLERANCE,
            max_improvements: DEFAULT_MAX_IMPROVEMENTS,
        }
    }
}

/// High-level route planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: Option<StartPoint>,
    /// Requested site ids in caller order. Unknown ids are dropped and
    /// duplicates collapse to their first occurrence.
    pub targets: Vec<SiteId>,
    pub calibration: Calibration,
    pub config: RoutingConfig,
}

impl RouteRequest {
    pub fn new(start: Option<StartPoint>, targets: impl IntoIterator<Item = SiteId>) -> Self {
        Self {
            start,
            targets: targets.into_iter().collect(),
            calibration: Calibration::default(),
            config: RoutingConfig::default(),
        }
    }

    /// Convenience constructor for a freeform start point.
    pub fn from_point(start: Point, targets: impl IntoIterator<Item = SiteId>) -> Self {
        Self::new(Some(StartPoint::at(start)), targets)
    }

    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    pub fn with_config(mut self, config: RoutingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: RouteStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }
}

/// One leg of a planned route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStep {
    /// Origin site, `None` for the leg leaving the start point.
    pub from_id: Option<SiteId>,
    pub to_id: SiteId,
    pub distance_raster: f64,
    pub distance_meters: Option<f64>,
    pub eta_seconds: Option<f64>,
    pub path: GridPath,
}

/// Planned walking tour.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub strategy: RouteStrategy,
    pub order: Vec<Site>,
    pub steps: Vec<RouteStep>,
    pub total_raster: f64,
    pub total_meters: Option<f64>,
    pub total_seconds: Option<f64>,
    /// `true` when no calibration scale is set; physical fields are `None`.
    pub uncalibrated: bool,
    /// Requested sites that could not be reached and are not part of `order`.
    pub omitted: Vec<SiteId>,
}

impl Route {
    /// Route with no stops (no start point or no resolvable targets).
    pub fn empty(strategy: RouteStrategy, calibration: &Calibration) -> Self {
        let totals = calibration.measure(0.0);
        Self {
            strategy,
            order: Vec::new(),
            steps: Vec::new(),
            total_raster: 0.0,
            total_meters: totals.meters,
            total_seconds: totals.seconds,
            uncalibrated: !calibration.is_calibrated(),
            omitted: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn stop_count(&self) -> usize {
        self.order.len()
    }

    /// Site ids in visiting order.
    pub fn order_ids(&self) -> Vec<SiteId> {
        self.order.iter().map(|site| site.id).collect()
    }

    /// Every waypoint of the tour, legs joined without repeating shared ends.
    pub fn polyline(&self) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();
        for step in &self.steps {
            for &point in &step.path.points {
                if points.last() != Some(&point) {
                    points.push(point);
                }
            }
        }
        points
    }
}

/// Resolve requested ids against the site snapshot, dropping unknown ids and
/// repeats while keeping request order.
fn resolve_targets<'a>(sites: &'a [Site], requested: &[SiteId]) -> Vec<&'a Site> {
    let mut seen = HashSet::new();
    requested
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| find_site(sites, *id))
        .collect()
}

/// Compute a walking tour for the request.
///
/// This is the main entry point for route planning. It:
/// 1. Resolves target ids against the site list
/// 2. Selects the planner strategy from the request config
/// 3. Orders the targets and collects per-leg paths
/// 4. Converts leg and total distances through the calibration
///
/// All degenerate inputs and unreachable targets are reported in the returned
/// [`Route`]; this function does not fail.
pub fn plan_route(grid: &OccupancyGrid, sites: &[Site], request: &RouteRequest) -> Route {
    let strategy = request.config.strategy;
    let Some(start) = request.start else {
        return Route::empty(strategy, &request.calibration);
    };

    let targets = resolve_targets(sites, &request.targets);
    if targets.is_empty() {
        return Route::empty(strategy, &request.calibration);
    }

    let planner = select_planner(&request.config);
    let positions: Vec<Point> = targets.iter().map(|site| site.position()).collect();
    let plan = planner.plan(grid, start.position(), &positions);

    let omitted: Vec<SiteId> = plan.unreachable.iter().map(|&i| targets[i].id).collect();
    if !omitted.is_empty() {
        warn!(?omitted, "omitting unreachable sites from route");
    }

    let calibration = &request.calibration;
    let mut steps = Vec::with_capacity(plan.order.len());
    let mut from_id = start.site_id;
    let mut total_raster = 0.0;
    for (&index, path) in plan.order.iter().zip(plan.legs) {
        let site = targets[index];
        let reading = calibration.measure(path.length);
        total_raster += path.length;
        steps.push(RouteStep {
            from_id,
            to_id: site.id,
            distance_raster: path.length,
            distance_meters: reading.meters,
            eta_seconds: reading.seconds,
            path,
        });
        from_id = Some(site.id);
    }

    let totals = calibration.measure(total_raster);
    Route {
        strategy: planner.strategy(),
        order: plan.order.iter().map(|&i| targets[i].clone()).collect(),
        steps,
        total_raster,
        total_meters: totals.meters,
        total_seconds: totals.seconds,
        uncalibrated: !calibration.is_calibrated(),
        omitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites() -> Vec<Site> {
        vec![
            Site::new(1, 15.0, 5.0),
            Site::new(2, 35.0, 5.0),
            Site::new(3, 25.0, 25.0),
        ]
    }

    #[test]
    fn strategy_parses_names_and_legacy_alias() {
        assert_eq!("nearest".parse::<RouteStrategy>(), Ok(RouteStrategy::Nearest));
        assert_eq!("Grid".parse::<RouteStrategy>(), Ok(RouteStrategy::Grid));
        assert_eq!("dijkstra".parse::<RouteStrategy>(), Ok(RouteStrategy::Grid));
        assert!("bfs".parse::<RouteStrategy>().is_err());
    }

    #[test]
    fn config_deserializes_partial_documents() {
        let config: RoutingConfig =
            serde_json::from_str(r#"{"strategy": "nearest", "snapRadius": 2}"#).unwrap();
        assert_eq!(config.strategy, RouteStrategy::Nearest);
        assert_eq!(config.snap_radius, 2);
        assert_eq!(config.improvement_tolerance, DEFAULT_IMPROVEMENT_TOLERANCE);
    }

    #[test]
    fn missing_start_yields_empty_route() {
        let grid = OccupancyGrid::with_dimensions(5, 5, 10.0).unwrap();
        let route = plan_route(&grid, &sites(), &RouteRequest::new(None, [1, 2]));
        assert!(route.is_empty());
        assert!(route.steps.is_empty());
        assert_eq!(route.total_raster, 0.0);
        assert!(route.uncalibrated);
    }

    #[test]
    fn unknown_and_duplicate_targets_are_dropped() {
        let grid = OccupancyGrid::with_dimensions(5, 5, 10.0).unwrap();
        let request = RouteRequest::from_point(Point::new(5.0, 5.0), [2, 99, 2, 1]);
        let route = plan_route(&grid, &sites(), &request);
        assert_eq!(route.stop_count(), 2);
        assert_eq!(route.order_ids(), vec![1, 2]);
        assert!(route.omitted.is_empty());
    }

    #[test]
    fn steps_chain_from_start_site() {
        let grid = OccupancyGrid::with_dimensions(5, 5, 10.0).unwrap();
        let all = sites();
        let start = StartPoint::from_site(&all, 1).unwrap();
        let route = plan_route(&grid, &all, &RouteRequest::new(Some(start), [2, 3]));

        assert_eq!(route.steps[0].from_id, Some(1));
        assert_eq!(route.steps[1].from_id, Some(route.steps[0].to_id));
        let summed: f64 = route.steps.iter().map(|s| s.distance_raster).sum();
        assert!((summed - route.total_raster).abs() < 1e-9);
    }

    #[test]
    fn polyline_joins_legs() {
        let grid = OccupancyGrid::with_dimensions(5, 5, 10.0).unwrap();
        let request = RouteRequest::from_point(Point::new(5.0, 5.0), [1, 2]);
        let route = plan_route(&grid, &sites(), &request);
        let line = route.polyline();
        assert_eq!(line.first(), Some(&Point::new(5.0, 5.0)));
        assert_eq!(line.last(), Some(&Point::new(35.0, 5.0)));
        assert!(line.windows(2).all(|pair| pair[0] != pair[1]));
    }
}
