//! Tour planning strategies implementing the Strategy pattern.
//!
//! This module provides the `TourPlanner` trait and its two implementations:
//! a straight-line nearest-neighbour planner and the grid planner that runs
//! nearest-neighbour construction followed by 2-opt over grid paths.
//! `select_planner` picks one from a [`RoutingConfig`].

use tracing::debug;

use crate::grid::{OccupancyGrid, Point};
use crate::path::{GridPath, SearchOptions};

use super::oracle::{DistanceOracle, GridOracle, StraightLineOracle};
use super::tour::{nearest_neighbor, tour_length, two_opt, TwoOptSettings, START_NODE};
use super::{RouteStrategy, RoutingConfig};

/// Visiting order and legs produced by a planner.
///
/// Indices refer to the `targets` slice handed to [`TourPlanner::plan`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourPlan {
    pub order: Vec<usize>,
    /// One leg per entry in `order`; leg `n` ends at `order[n]`.
    pub legs: Vec<GridPath>,
    pub unreachable: Vec<usize>,
}

/// Trait for tour planning strategies.
pub trait TourPlanner {
    /// The strategy identifier for this planner.
    fn strategy(&self) -> RouteStrategy;

    /// Order `targets` into an open tour from `start`.
    fn plan(&self, grid: &OccupancyGrid, start: Point, targets: &[Point]) -> TourPlan;
}

/// Greedy planner over straight-line distances; walls are ignored.
#[derive(Debug, Clone, Default)]
pub struct NearestNeighborPlanner;

impl TourPlanner for NearestNeighborPlanner {
    fn strategy(&self) -> RouteStrategy {
        RouteStrategy::Nearest
    }

    fn plan(&self, _grid: &OccupancyGrid, start: Point, targets: &[Point]) -> TourPlan {
        let mut oracle = StraightLineOracle::new(node_list(start, targets));
        let construction = nearest_neighbor(&mut oracle);
        materialize(&mut oracle, construction.order, construction.unreachable)
    }
}

/// Grid-aware planner: memoized shortest paths, nearest-neighbour
/// construction, then 2-opt improvement.
#[derive(Debug, Clone)]
pub struct GridPlanner {
    search: SearchOptions,
    two_opt: TwoOptSettings,
}

impl GridPlanner {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            search: SearchOptions {
                snap_radius: config.snap_radius,
            },
            two_opt: TwoOptSettings {
                tolerance: config.improvement_tolerance,
                max_improvements: config.max_improvements,
            },
        }
    }
}

impl Default for GridPlanner {
    fn default() -> Self {
        Self::new(&RoutingConfig::default())
    }
}

impl TourPlanner for GridPlanner {
    fn strategy(&self) -> RouteStrategy {
        RouteStrategy::Grid
    }

    fn plan(&self, grid: &OccupancyGrid, start: Point, targets: &[Point]) -> TourPlan {
        let mut oracle = GridOracle::new(grid, node_list(start, targets), self.search);
        let mut construction = nearest_neighbor(&mut oracle);

        let initial = tour_length(&mut oracle, &construction.order);
        let reversals = two_opt(&mut oracle, &mut construction.order, &self.two_opt);
        let improved = tour_length(&mut oracle, &construction.order);
        debug!(
            targets = targets.len(),
            reversals,
            initial,
            improved,
            solves = oracle.solves(),
            "grid tour planned"
        );

        materialize(&mut oracle, construction.order, construction.unreachable)
    }
}

/// Select the planner configured for a request.
pub fn select_planner(config: &RoutingConfig) -> Box<dyn TourPlanner> {
    match config.strategy {
        RouteStrategy::Nearest => Box::new(NearestNeighborPlanner),
        RouteStrategy::Grid => Box::new(GridPlanner::new(config)),
    }
}

fn node_list(start: Point, targets: &[Point]) -> Vec<Point> {
    std::iter::once(start).chain(targets.iter().copied()).collect()
}

/// Convert oracle node indices back to target indices and collect legs.
fn materialize<D: DistanceOracle>(
    oracle: &mut D,
    order: Vec<usize>,
    unreachable: Vec<usize>,
) -> TourPlan {
    let mut legs = Vec::with_capacity(order.len());
    let mut previous = START_NODE;
    for &node in &order {
        legs.push(oracle.path(previous, node));
        previous = node;
    }
    TourPlan {
        order: order.into_iter().map(|node| node - 1).collect(),
        legs,
        unreachable: unreachable.into_iter().map(|node| node - 1).collect(),
    }
}
