//! Pairwise distance sources used while sequencing a tour.
//!
//! Nodes are addressed by index: `0` is the tour start and `1..` are the
//! targets in request order.

use std::collections::HashMap;

use crate::grid::{OccupancyGrid, Point};
use crate::path::{find_path_dijkstra, GridPath, SearchOptions};

/// Distance and path lookup between tour nodes.
pub trait DistanceOracle {
    /// Number of nodes, including the start.
    fn node_count(&self) -> usize;

    /// Walkable path from node `from` to node `to`.
    fn path(&mut self, from: usize, to: usize) -> GridPath;

    /// Length of the path between two nodes; `+∞` when unreachable.
    fn distance(&mut self, from: usize, to: usize) -> f64 {
        self.path(from, to).length
    }
}

/// Grid-backed oracle that memoizes every solved pair for the lifetime of one
/// route computation.
///
/// Grid paths are symmetric, so each unordered pair is solved once, stored
/// from the lower to the higher node index and reversed on demand.
pub struct GridOracle<'a> {
    grid: &'a OccupancyGrid,
    nodes: Vec<Point>,
    options: SearchOptions,
    cache: HashMap<(usize, usize), GridPath>,
    solves: usize,
}

impl<'a> GridOracle<'a> {
    pub fn new(grid: &'a OccupancyGrid, nodes: Vec<Point>, options: SearchOptions) -> Self {
        Self {
            grid,
            nodes,
            options,
            cache: HashMap::new(),
            solves: 0,
        }
    }

    /// Number of solver runs so far (cache misses).
    pub fn solves(&self) -> usize {
        self.solves
    }

    fn solve(&mut self, from: usize, to: usize) -> &GridPath {
        let key = (from.min(to), from.max(to));
        if !self.cache.contains_key(&key) {
            self.solves += 1;
            let (from_point, to_point) = (self.nodes[key.0], self.nodes[key.1]);
            let path = find_path_dijkstra(self.grid, from_point, to_point, &self.options);
            self.cache.insert(key, path);
        }
        &self.cache[&key]
    }
}

impl DistanceOracle for GridOracle<'_> {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn path(&mut self, from: usize, to: usize) -> GridPath {
        let path = self.solve(from, to);
        if from <= to {
            path.clone()
        } else {
            path.reversed()
        }
    }

    fn distance(&mut self, from: usize, to: usize) -> f64 {
        self.solve(from, to).length
    }
}

/// Straight-line oracle that ignores the occupancy grid.
pub struct StraightLineOracle {
    nodes: Vec<Point>,
}

impl StraightLineOracle {
    pub fn new(nodes: Vec<Point>) -> Self {
        Self { nodes }
    }
}

impl DistanceOracle for StraightLineOracle {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn path(&mut self, from: usize, to: usize) -> GridPath {
        let (a, b) = (self.nodes[from], self.nodes[to]);
        if a == b {
            GridPath::from_points(vec![a])
        } else {
            GridPath::from_points(vec![a, b])
        }
    }

    fn distance(&mut self, from: usize, to: usize) -> f64 {
        self.nodes[from].distance_to(&self.nodes[to])
    }
}
