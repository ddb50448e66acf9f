use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::debug;

use crate::grid::{Cell, OccupancyGrid, Point};

/// Default Chebyshev radius used when snapping a blocked endpoint to open space.
pub const DEFAULT_SNAP_RADIUS: u32 = 6;

/// Cross products at or below this magnitude count as collinear.
const COLLINEAR_EPSILON: f64 = 1e-6;

/// Options applied during a single path search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Maximum ring radius searched when an endpoint falls on a blocked cell.
    pub snap_radius: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            snap_radius: DEFAULT_SNAP_RADIUS,
        }
    }
}

/// Walkable path between two plane points.
///
/// An unreachable pair is represented by an empty point list and an infinite
/// length; check [`GridPath::is_reachable`] before using the length in sums.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridPath {
    pub points: Vec<Point>,
    pub length: f64,
}

impl GridPath {
    /// Sentinel for endpoints that cannot be connected.
    pub fn unreachable() -> Self {
        Self {
            points: Vec::new(),
            length: f64::INFINITY,
        }
    }

    /// Build a path from waypoints, measuring its Euclidean length.
    pub fn from_points(points: Vec<Point>) -> Self {
        let length = polyline_length(&points);
        Self { points, length }
    }

    pub fn is_reachable(&self) -> bool {
        self.length.is_finite() && !self.points.is_empty()
    }

    /// Same path walked in the opposite direction.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            points,
            length: self.length,
        }
    }
}

/// Find the shortest walkable path between two plane points using default
/// search options.
pub fn find_path(grid: &OccupancyGrid, from: Point, to: Point) -> GridPath {
    find_path_dijkstra(grid, from, to, &SearchOptions::default())
}

/// Run Dijkstra's algorithm over the 8-connected grid graph.
///
/// Endpoints are mapped to cells and snapped to the nearest open cell when
/// blocked. The search stops as soon as the goal cell is settled. The returned
/// path runs between cell centers with collinear waypoints removed, and its
/// length is re-measured in plane units over those waypoints.
pub fn find_path_dijkstra(
    grid: &OccupancyGrid,
    from: Point,
    to: Point,
    options: &SearchOptions,
) -> GridPath {
    let Some(start) = grid.nearest_open_cell(grid.to_cell(from), options.snap_radius) else {
        debug!(%from, "start endpoint has no open cell within snap radius");
        return GridPath::unreachable();
    };
    let Some(goal) = grid.nearest_open_cell(grid.to_cell(to), options.snap_radius) else {
        debug!(%to, "goal endpoint has no open cell within snap radius");
        return GridPath::unreachable();
    };

    if start == goal {
        return GridPath {
            points: vec![grid.cell_center(start)],
            length: 0.0,
        };
    }

    let Some(cells) = search_cells(grid, start, goal) else {
        debug!(?start, ?goal, "goal cell is not connected to start cell");
        return GridPath::unreachable();
    };

    let centers: Vec<Point> = cells.iter().map(|&cell| grid.cell_center(cell)).collect();
    GridPath::from_points(simplify_collinear(&centers))
}

/// Dijkstra over cells, returning the cell sequence from `start` to `goal`.
fn search_cells(grid: &OccupancyGrid, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    let start_index = grid.index_of(start)?;
    let goal_index = grid.index_of(goal)?;
    let total = grid.cols() * grid.rows();

    let mut distances = vec![f64::INFINITY; total];
    let mut parents: Vec<Option<usize>> = vec![None; total];
    let mut settled = vec![false; total];
    let mut queue = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut expanded = 0usize;

    distances[start_index] = 0.0;
    queue.push(QueueEntry::new(start_index, 0.0, sequence));

    while let Some(entry) = queue.pop() {
        if settled[entry.node] {
            continue;
        }
        settled[entry.node] = true;
        expanded += 1;

        if entry.node == goal_index {
            debug!(expanded, cost = entry.cost.0, "grid search reached goal");
            return Some(reconstruct_path(grid, &parents, start_index, goal_index));
        }

        let current = grid.cell_at(entry.node);
        for (next, step) in grid.neighbors(current) {
            let Some(next_index) = grid.index_of(next) else {
                continue;
            };
            if settled[next_index] {
                continue;
            }
            let next_cost = entry.cost.0 + step;
            if next_cost < distances[next_index] {
                distances[next_index] = next_cost;
                parents[next_index] = Some(entry.node);
                sequence += 1;
                queue.push(QueueEntry::new(next_index, next_cost, sequence));
            }
        }
    }

    debug!(expanded, "grid search exhausted frontier");
    None
}

fn reconstruct_path(
    grid: &OccupancyGrid,
    parents: &[Option<usize>],
    start: usize,
    goal: usize,
) -> Vec<Cell> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(grid.cell_at(node));
        if node == start {
            break;
        }
        current = parents[node];
    }
    path.reverse();
    path
}

/// Drop interior points that lie on the line through their neighbours.
pub fn simplify_collinear(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut simplified = Vec::with_capacity(points.len());
    simplified.push(points[0]);
    for window in points.windows(3) {
        let (a, b, c) = (window[0], window[1], window[2]);
        let cross = (b.y - a.y) * (c.x - b.x) - (b.x - a.x) * (c.y - b.y);
        if cross.abs() > COLLINEAR_EPSILON {
            simplified.push(b);
        }
    }
    simplified.push(points[points.len() - 1]);
    simplified
}

/// Sum of Euclidean segment lengths.
pub fn polyline_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum()
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: usize,
    cost: FloatOrd,
    sequence: u64,
}

impl QueueEntry {
    fn new(node: usize, cost: f64, sequence: u64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            sequence,
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then by
        // discovery order.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_pops_lowest_cost_then_earliest_discovery() {
        let mut queue = BinaryHeap::new();
        queue.push(QueueEntry::new(7, 2.0, 0));
        queue.push(QueueEntry::new(3, 1.0, 2));
        queue.push(QueueEntry::new(9, 1.0, 1));

        let order: Vec<usize> = std::iter::from_fn(|| queue.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![9, 3, 7]);
    }

    #[test]
    fn simplify_keeps_corners_only() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        assert_eq!(
            simplify_collinear(&points),
            vec![
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(2.0, 2.0)
            ]
        );
    }

    #[test]
    fn reversed_path_keeps_length() {
        let path = GridPath::from_points(vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]);
        let back = path.reversed();
        assert_eq!(back.points[0], Point::new(3.0, 4.0));
        assert!((back.length - 5.0).abs() < 1e-12);
    }

    #[test]
    fn unreachable_sentinel_is_not_reachable() {
        let path = GridPath::unreachable();
        assert!(!path.is_reachable());
        assert!(path.length.is_infinite());
    }
}
