//! Pick-tour planning library entry points.
//!
//! This crate exposes the occupancy grid that models a facility floor plan,
//! shortest walkable paths over it, tour sequencing across storage sites and
//! the conversion of plane distances into meters and walking time.
//! Higher-level consumers (the CLI, editors) should only depend on the items
//! exported here instead of reimplementing behavior.

pub mod calibration;
pub mod error;
pub mod facility;
pub mod grid;
pub mod output;
pub mod path;
pub mod routing;
pub mod session;
pub mod site;

pub use calibration::{Calibration, Measurement, DEFAULT_SPEED_KMH};
pub use error::{Error, Result};
pub use facility::{
    default_facility_path, load_facility, resolve_facility_path, save_facility, Facility,
    FacilityDocument,
};
pub use grid::{Cell, CellKind, GridSnapshot, OccupancyGrid, Point};
pub use output::{render_grid, RouteRenderMode, RouteSummary};
pub use path::{find_path, find_path_dijkstra, GridPath, SearchOptions};
pub use routing::{
    plan_route, Route, RouteRequest, RouteStep, RouteStrategy, RoutingConfig,
};
pub use session::RouteSession;
pub use site::{Site, SiteId, StartPoint};
