//! Rasterized occupancy grid for the facility floor plan.
//!
//! The grid discretizes the plane into square cells of `cell_size` plane
//! units. Cells are either open or blocked; blocked cells carry one or both of
//! two editorial categories ([`CellKind::Wall`] and [`CellKind::Zone`]) which
//! behave identically for pathfinding. Membership is stored as packed
//! `row * cols + col` keys; the `"col_row"` string form only appears in
//! [`GridSnapshot`].

use std::collections::BTreeSet;
use std::f64::consts::SQRT_2;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Lower bound applied to derived column and row counts.
pub const MIN_GRID_EXTENT: usize = 4;

/// Default cell size in plane units (pixels of the floor plan image).
pub const DEFAULT_CELL_SIZE: f64 = 20.0;

/// Offsets of the 8-connected neighbourhood, column-major like the editor
/// brush so discovery order stays stable.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Continuous coordinate on the facility plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Integer grid address. Signed so that callers may express out-of-range
/// cells, which every mutating operation ignores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Serialization key used by persisted snapshots (`"col_row"`).
    pub fn key(&self) -> String {
        format!("{}_{}", self.col, self.row)
    }

    /// Parse a `"col_row"` key. Returns `None` for malformed input.
    pub fn parse_key(key: &str) -> Option<Cell> {
        let (col, row) = key.trim().split_once('_')?;
        Some(Cell {
            col: col.parse().ok()?,
            row: row.parse().ok()?,
        })
    }

    fn offset(&self, dc: i32, dr: i32) -> Cell {
        Cell {
            col: self.col + dc,
            row: self.row + dr,
        }
    }
}

/// Editorial category of a blocked cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Wall,
    Zone,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellKind::Wall => "wall",
            CellKind::Zone => "zone",
        })
    }
}

/// Binary obstacle map plus plane/cell coordinate transforms.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    cell_size: f64,
    cols: usize,
    rows: usize,
    walls: BTreeSet<usize>,
    zones: BTreeSet<usize>,
}

impl OccupancyGrid {
    /// Build an empty grid covering a `width` x `height` plane.
    ///
    /// Column and row counts are `max(4, floor(extent / cell_size))`.
    pub fn new(width: f64, height: f64, cell_size: f64) -> Result<Self> {
        validate_cell_size(cell_size)?;
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(Error::invalid_grid(format!(
                "extents must be finite and non-negative (got {width} x {height})"
            )));
        }
        let cols = derive_extent(width, cell_size);
        let rows = derive_extent(height, cell_size);
        Self::with_dimensions(cols, rows, cell_size)
    }

    /// Build an empty grid with explicit column/row counts.
    pub fn with_dimensions(cols: usize, rows: usize, cell_size: f64) -> Result<Self> {
        validate_cell_size(cell_size)?;
        if cols == 0 || rows == 0 {
            return Err(Error::invalid_grid(format!(
                "grid must have at least one column and row (got {cols} x {rows})"
            )));
        }
        if cols.checked_mul(rows).is_none() {
            return Err(Error::invalid_grid(format!(
                "grid of {cols} x {rows} cells is too large"
            )));
        }
        Ok(Self {
            cell_size,
            cols,
            rows,
            walls: BTreeSet::new(),
            zones: BTreeSet::new(),
        })
    }

    /// Initialize the grid for a plane of the given size.
    ///
    /// When `persisted` was saved with the same cell size its extents and
    /// blocked cells are restored; otherwise the grid starts empty.
    pub fn initialize(
        width: f64,
        height: f64,
        cell_size: f64,
        persisted: Option<&GridSnapshot>,
    ) -> Result<Self> {
        let fresh = Self::new(width, height, cell_size)?;
        match persisted {
            Some(snapshot) if snapshot.cell_size == cell_size => Self::from_snapshot(snapshot),
            Some(snapshot) => {
                warn!(
                    persisted = snapshot.cell_size,
                    requested = cell_size,
                    "discarding persisted grid with a different cell size"
                );
                Ok(fresh)
            }
            None => Ok(fresh),
        }
    }

    /// Restore a grid from its persisted snapshot.
    ///
    /// Keys outside the grid are dropped; malformed keys are skipped with a
    /// warning. A legacy `blocked` list is read as walls when neither `walls`
    /// nor `zones` is present.
    pub fn from_snapshot(snapshot: &GridSnapshot) -> Result<Self> {
        let mut grid = Self::with_dimensions(snapshot.cols, snapshot.rows, snapshot.cell_size)?;

        let (walls, zones) = match (&snapshot.walls, &snapshot.zones) {
            (None, None) => (snapshot.blocked.as_deref(), None),
            (walls, zones) => (walls.as_deref(), zones.as_deref()),
        };

        for (keys, kind) in [(walls, CellKind::Wall), (zones, CellKind::Zone)] {
            for key in keys.unwrap_or_default() {
                match Cell::parse_key(key) {
                    Some(cell) => grid.set_blocked(cell, kind, true),
                    None => warn!(key = %key, %kind, "skipping malformed cell key"),
                }
            }
        }

        Ok(grid)
    }

    /// Capture the grid in its persisted form.
    pub fn to_snapshot(&self) -> GridSnapshot {
        let keys = |set: &BTreeSet<usize>| -> Vec<String> {
            set.iter().map(|&index| self.unpack(index).key()).collect()
        };
        GridSnapshot {
            cell_size: self.cell_size,
            cols: self.cols,
            rows: self.rows,
            walls: Some(keys(&self.walls)),
            zones: Some(keys(&self.zones)),
            blocked: None,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Plane extent covered by the grid as `(width, height)`.
    pub fn extent(&self) -> (f64, f64) {
        (
            self.cols as f64 * self.cell_size,
            self.rows as f64 * self.cell_size,
        )
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0
            && cell.row >= 0
            && (cell.col as usize) < self.cols
            && (cell.row as usize) < self.rows
    }

    fn pack(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| cell.row as usize * self.cols + cell.col as usize)
    }

    fn unpack(&self, index: usize) -> Cell {
        Cell {
            col: (index % self.cols) as i32,
            row: (index / self.cols) as i32,
        }
    }

    /// Dense index of an in-range cell, used by the path solver.
    pub(crate) fn index_of(&self, cell: Cell) -> Option<usize> {
        self.pack(cell)
    }

    pub(crate) fn cell_at(&self, index: usize) -> Cell {
        self.unpack(index)
    }

    fn layer_mut(&mut self, kind: CellKind) -> &mut BTreeSet<usize> {
        match kind {
            CellKind::Wall => &mut self.walls,
            CellKind::Zone => &mut self.zones,
        }
    }

    /// Mark or clear `cell` in the `kind` layer. Out-of-range cells are ignored.
    pub fn set_blocked(&mut self, cell: Cell, kind: CellKind, value: bool) {
        let Some(index) = self.pack(cell) else {
            return;
        };
        let layer = self.layer_mut(kind);
        if value {
            layer.insert(index);
        } else {
            layer.remove(&index);
        }
    }

    /// True when the cell is a wall or a zone. Out-of-range cells are not blocked.
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.pack(cell)
            .is_some_and(|index| self.walls.contains(&index) || self.zones.contains(&index))
    }

    /// Category of a blocked cell; walls take precedence over zones.
    pub fn kind_at(&self, cell: Cell) -> Option<CellKind> {
        let index = self.pack(cell)?;
        if self.walls.contains(&index) {
            Some(CellKind::Wall)
        } else if self.zones.contains(&index) {
            Some(CellKind::Zone)
        } else {
            None
        }
    }

    /// Remove every cell of one category.
    pub fn clear(&mut self, kind: CellKind) {
        self.layer_mut(kind).clear();
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Number of distinct blocked cells (walls and zones may overlap).
    pub fn blocked_count(&self) -> usize {
        self.walls.union(&self.zones).count()
    }

    /// Map a plane point to its cell, clamping into the grid.
    pub fn to_cell(&self, point: Point) -> Cell {
        let clamp = |value: f64, extent: usize| -> i32 {
            (value / self.cell_size)
                .floor()
                .clamp(0.0, (extent - 1) as f64) as i32
        };
        Cell {
            col: clamp(point.x, self.cols),
            row: clamp(point.y, self.rows),
        }
    }

    /// Plane coordinate of the center of `cell`.
    pub fn cell_center(&self, cell: Cell) -> Point {
        Point {
            x: (f64::from(cell.col) + 0.5) * self.cell_size,
            y: (f64::from(cell.row) + 0.5) * self.cell_size,
        }
    }

    /// Open in-range cells adjacent to `cell` with their grid-unit step cost.
    pub fn neighbors(&self, cell: Cell) -> Vec<(Cell, f64)> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(dc, dr)| {
                let cost = if dc != 0 && dr != 0 { SQRT_2 } else { 1.0 };
                (cell.offset(dc, dr), cost)
            })
            .filter(|(next, _)| self.in_bounds(*next) && !self.is_blocked(*next))
            .collect()
    }

    /// Closest open cell within a Chebyshev radius of `cell`.
    ///
    /// Returns `cell` itself when it is open. Otherwise each ring of radius
    /// `1..=max_radius` is scanned row-major and the first open in-range cell
    /// wins. `None` means nothing open lies within the radius. Rings beyond
    /// the farthest grid corner are never visited, and only the in-range part
    /// of each ring is scanned.
    pub fn nearest_open_cell(&self, cell: Cell, max_radius: u32) -> Option<Cell> {
        if self.in_bounds(cell) && !self.is_blocked(cell) {
            return Some(cell);
        }
        let radius_limit = self.reach_from(cell).min(i64::from(max_radius));
        let (cols, rows) = (self.cols as i64, self.rows as i64);
        let (col, row) = (i64::from(cell.col), i64::from(cell.row));

        for radius in 1..=radius_limit {
            let top = (row - radius).max(0);
            let bottom = (row + radius).min(rows - 1);
            let left = (col - radius).max(0);
            let right = (col + radius).min(cols - 1);
            for r in top..=bottom {
                let found = if (r - row).abs() == radius {
                    (left..=right).find(|&c| self.is_open_at(c, r))
                } else {
                    [col - radius, col + radius]
                        .into_iter()
                        .find(|&c| (0..cols).contains(&c) && self.is_open_at(c, r))
                };
                if let Some(c) = found {
                    return Some(Cell::new(c as i32, r as i32));
                }
            }
        }
        None
    }

    fn is_open_at(&self, col: i64, row: i64) -> bool {
        !self.is_blocked(Cell::new(col as i32, row as i32))
    }

    /// Chebyshev distance from `cell` to the farthest in-range cell.
    fn reach_from(&self, cell: Cell) -> i64 {
        let (col, row) = (i64::from(cell.col), i64::from(cell.row));
        let (last_col, last_row) = (self.cols as i64 - 1, self.rows as i64 - 1);
        col.abs()
            .max((last_col - col).abs())
            .max(row.abs())
            .max((last_row - row).abs())
    }

    /// Paint a Bresenham line between the cells of `from` and `to`, covering
    /// every cell within `radius` cells (square kernel) of the line.
    pub fn brush_line(&mut self, from: Point, to: Point, radius: u32, kind: CellKind, value: bool) {
        let a = self.to_cell(from);
        let b = self.to_cell(to);
        let reach = u32::try_from(self.cols.max(self.rows)).unwrap_or(u32::MAX);
        let radius = i32::try_from(radius.min(reach)).unwrap_or(i32::MAX);
        let (last_col, last_row) = (self.cols as i32 - 1, self.rows as i32 - 1);

        let (mut col, mut row) = (a.col, a.row);
        let dc = (b.col - a.col).abs();
        let dr = (b.row - a.row).abs();
        let step_col = if a.col < b.col { 1 } else { -1 };
        let step_row = if a.row < b.row { 1 } else { -1 };
        let mut err = dc - dr;

        loop {
            let rows = row.saturating_sub(radius).max(0)..=row.saturating_add(radius).min(last_row);
            for r in rows {
                let (left, right) = (
                    col.saturating_sub(radius).max(0),
                    col.saturating_add(radius).min(last_col),
                );
                for c in left..=right {
                    self.set_blocked(Cell::new(c, r), kind, value);
                }
            }
            if col == b.col && row == b.row {
                break;
            }
            let e2 = 2 * err;
            if e2 > -dr {
                err -= dr;
                col += step_col;
            }
            if e2 < dc {
                err += dc;
                row += step_row;
            }
        }
    }

    /// Mark or clear the axis-aligned cell rectangle spanned by two points.
    pub fn fill_rect(&mut self, a: Point, b: Point, kind: CellKind, value: bool) {
        let a = self.to_cell(a);
        let b = self.to_cell(b);
        for row in a.row.min(b.row)..=a.row.max(b.row) {
            for col in a.col.min(b.col)..=a.col.max(b.col) {
                self.set_blocked(Cell::new(col, row), kind, value);
            }
        }
    }
}

fn validate_cell_size(cell_size: f64) -> Result<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_grid(format!(
            "cell size must be a positive finite number (got {cell_size})"
        )))
    }
}

fn derive_extent(extent: f64, cell_size: f64) -> usize {
    ((extent / cell_size).floor() as usize).max(MIN_GRID_EXTENT)
}

/// Persisted form of an [`OccupancyGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    #[serde(alias = "cell")]
    pub cell_size: f64,
    pub cols: usize,
    pub rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
    /// Legacy single-layer list, read as walls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<Vec<String>>,
}
