//! Facility bundles: grid, sites, start point and calibration in one file.
//!
//! The on-disk format is a single JSON document:
//!
//! ```json
//! {
//!   "grid": { "cellSize": 20, "cols": 40, "rows": 30, "walls": ["3_4"], "zones": [] },
//!   "sites": [{ "id": 1, "x": 110.0, "y": 70.0, "label": "A-01" }],
//!   "start": { "x": 10.0, "y": 10.0 },
//!   "calibration": { "pixelsPerMeter": 12.5, "defaultSpeedKmh": 7.0 },
//!   "routing": { "strategy": "grid" }
//! }
//! ```

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calibration::Calibration;
use crate::error::{Error, Result};
use crate::grid::{GridSnapshot, OccupancyGrid};
use crate::routing::RoutingConfig;
use crate::site::{find_site, Site, StartPoint};

/// Default filename for the facility bundle inside the data directory.
const FACILITY_FILENAME: &str = "facility.json";

/// Environment variable overriding the facility file location.
pub const FACILITY_ENV_VAR: &str = "PICKROUTE_FACILITY";

/// Serialized form of a [`Facility`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDocument {
    pub grid: GridSnapshot,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<StartPoint>,
    #[serde(default)]
    pub calibration: Calibration,
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// In-memory facility ready for routing.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub grid: OccupancyGrid,
    pub sites: Vec<Site>,
    pub start: Option<StartPoint>,
    pub calibration: Calibration,
    pub routing: RoutingConfig,
}

impl Facility {
    /// Empty facility over `grid`.
    pub fn new(grid: OccupancyGrid) -> Self {
        Self {
            grid,
            sites: Vec::new(),
            start: None,
            calibration: Calibration::default(),
            routing: RoutingConfig::default(),
        }
    }

    /// Build a facility from its serialized form.
    ///
    /// Repeated site ids keep only their first entry. A site-derived start
    /// is re-read from its site so it follows moved sites; a start naming a
    /// missing site is rejected.
    pub fn from_document(document: FacilityDocument) -> Result<Self> {
        let grid = OccupancyGrid::from_snapshot(&document.grid)?;

        let mut sites = document.sites;
        let mut seen = HashSet::new();
        sites.retain(|site| {
            let first = seen.insert(site.id);
            if !first {
                warn!(id = site.id, "dropping duplicate site id; keeping the first entry");
            }
            first
        });

        let start = match document.start {
            Some(StartPoint {
                site_id: Some(id), ..
            }) => Some(StartPoint::from_site(&sites, id)?),
            other => other,
        };

        Ok(Self {
            grid,
            sites,
            start,
            calibration: document.calibration,
            routing: document.routing,
        })
    }

    pub fn to_document(&self) -> FacilityDocument {
        FacilityDocument {
            grid: self.grid.to_snapshot(),
            sites: self.sites.clone(),
            start: self.start,
            calibration: self.calibration,
            routing: self.routing,
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let document: FacilityDocument = serde_json::from_str(source)?;
        Self::from_document(document)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    pub fn site(&self, id: crate::site::SiteId) -> Option<&Site> {
        find_site(&self.sites, id)
    }
}

/// Load a facility bundle from disk.
pub fn load_facility(path: impl AsRef<Path>) -> Result<Facility> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FacilityNotFound {
            path: path.to_path_buf(),
        });
    }

    let source = fs::read_to_string(path)?;
    let facility = Facility::from_json_str(&source)?;
    info!(
        path = %path.display(),
        cols = facility.grid.cols(),
        rows = facility.grid.rows(),
        sites = facility.sites.len(),
        calibrated = facility.calibration.is_calibrated(),
        "loaded facility"
    );
    Ok(facility)
}

/// Write a facility bundle to disk, creating parent directories as needed.
pub fn save_facility(path: impl AsRef<Path>, facility: &Facility) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, facility.to_json_string()?)?;
    debug!(path = %path.display(), "saved facility");
    Ok(())
}

/// Platform data-directory location of the facility bundle.
pub fn default_facility_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("com", "pickroute", "pickroute").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(FACILITY_FILENAME))
}

/// Resolve the facility file: explicit path, then the environment override,
/// then the platform default.
pub fn resolve_facility_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env::var_os(FACILITY_ENV_VAR) {
        return Ok(PathBuf::from(env_path));
    }
    default_facility_path()
}
