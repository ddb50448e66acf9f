//! Common test utilities and fixture helpers.

use std::path::PathBuf;

use pickroute_lib::{load_facility, Facility, OccupancyGrid};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// The 12x8 warehouse fixture: a rack wall at column 5 with a gap at the
/// bottom, a zone cell at (9, 1) and site 6 walled in at the bottom right.
#[allow(dead_code)]
pub fn small_warehouse() -> Facility {
    load_facility(fixtures_dir().join("small_warehouse.json")).expect("fixture loads")
}

/// Open 5x5 grid with 10-unit cells.
#[allow(dead_code)]
pub fn open_grid() -> OccupancyGrid {
    OccupancyGrid::with_dimensions(5, 5, 10.0).expect("valid dimensions")
}
