//! Editable routing state with cached route results.
//!
//! Every mutation of an input (grid, sites, start, targets, calibration or
//! routing config) marks the session stale. [`RouteSession::route`]
//! recomputes from scratch only when stale and otherwise returns the last
//! result. No distance memo survives between computations.

use tracing::debug;

use crate::calibration::Calibration;
use crate::error::{Error, Result};
use crate::facility::Facility;
use crate::grid::{OccupancyGrid, Point};
use crate::routing::{plan_route, Route, RouteRequest, RoutingConfig};
use crate::site::{Site, SiteId, StartPoint};

#[derive(Debug, Clone)]
pub struct RouteSession {
    grid: OccupancyGrid,
    sites: Vec<Site>,
    start: Option<StartPoint>,
    targets: Vec<SiteId>,
    calibration: Calibration,
    config: RoutingConfig,
    cached: Option<Route>,
    computations: usize,
}

impl RouteSession {
    pub fn new(grid: OccupancyGrid) -> Self {
        Self {
            grid,
            sites: Vec::new(),
            start: None,
            targets: Vec::new(),
            calibration: Calibration::default(),
            config: RoutingConfig::default(),
            cached: None,
            computations: 0,
        }
    }

    pub fn from_facility(facility: Facility) -> Self {
        Self {
            grid: facility.grid,
            sites: facility.sites,
            start: facility.start,
            targets: Vec::new(),
            calibration: facility.calibration,
            config: facility.routing,
            cached: None,
            computations: 0,
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn start(&self) -> Option<StartPoint> {
        self.start
    }

    pub fn targets(&self) -> &[SiteId] {
        &self.targets
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Apply an edit to the grid (brush strokes, rectangles, clears).
    pub fn edit_grid<R>(&mut self, edit: impl FnOnce(&mut OccupancyGrid) -> R) -> R {
        let result = edit(&mut self.grid);
        self.invalidate();
        result
    }

    pub fn set_sites(&mut self, sites: Vec<Site>) {
        self.sites = sites;
        self.resync_start();
        self.invalidate();
    }

    /// Move a site; a start placed on it moves along.
    pub fn move_site(&mut self, id: SiteId, to: Point) -> Result<()> {
        let site = self
            .sites
            .iter_mut()
            .find(|site| site.id == id)
            .ok_or(Error::UnknownSite { id })?;
        site.x = to.x;
        site.y = to.y;
        self.resync_start();
        self.invalidate();
        Ok(())
    }

    /// Remove a site and drop it from the targets. A start placed on it
    /// keeps its coordinates but loses the site link.
    pub fn remove_site(&mut self, id: SiteId) -> Result<Site> {
        let index = self
            .sites
            .iter()
            .position(|site| site.id == id)
            .ok_or(Error::UnknownSite { id })?;
        let removed = self.sites.remove(index);
        self.targets.retain(|target| *target != id);
        if let Some(start) = self.start.as_mut().filter(|s| s.site_id == Some(id)) {
            start.site_id = None;
        }
        self.invalidate();
        Ok(removed)
    }

    pub fn set_start(&mut self, start: Option<StartPoint>) {
        self.start = start;
        self.invalidate();
    }

    pub fn set_start_site(&mut self, id: SiteId) -> Result<()> {
        self.start = Some(StartPoint::from_site(&self.sites, id)?);
        self.invalidate();
        Ok(())
    }

    pub fn set_targets(&mut self, targets: impl IntoIterator<Item = SiteId>) {
        self.targets = targets.into_iter().collect();
        self.invalidate();
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
        self.invalidate();
    }

    pub fn set_config(&mut self, config: RoutingConfig) {
        self.config = config;
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn is_stale(&self) -> bool {
        self.cached.is_none()
    }

    /// Number of full route computations performed so far.
    pub fn computations(&self) -> usize {
        self.computations
    }

    /// Current route, recomputed only if an input changed since the last call.
    pub fn route(&mut self) -> &Route {
        let computations = &mut self.computations;
        let (grid, sites) = (&self.grid, &self.sites);
        let request = || {
            RouteRequest::new(self.start, self.targets.iter().copied())
                .with_calibration(self.calibration)
                .with_config(self.config)
        };
        self.cached.get_or_insert_with(|| {
            let route = plan_route(grid, sites, &request());
            *computations += 1;
            debug!(
                computation = *computations,
                stops = route.stop_count(),
                omitted = route.omitted.len(),
                "route recomputed"
            );
            route
        })
    }

    /// Snapshot of the session as a facility bundle.
    pub fn to_facility(&self) -> Facility {
        Facility {
            grid: self.grid.clone(),
            sites: self.sites.clone(),
            start: self.start,
            calibration: self.calibration,
            routing: self.config,
        }
    }

    fn resync_start(&mut self) {
        let Some(start) = self.start else {
            return;
        };
        let Some(id) = start.site_id else {
            return;
        };
        self.start = match StartPoint::from_site(&self.sites, id) {
            Ok(resolved) => Some(resolved),
            Err(_) => Some(StartPoint::at(start.position())),
        };
    }
}
