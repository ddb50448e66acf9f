use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Point;

/// Stable numeric identifier of a storage site.
pub type SiteId = i64;

/// Storage location on the facility plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub label: String,
}

impl Site {
    pub fn new(id: SiteId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Label for display, falling back to the id.
    pub fn display_name(&self) -> String {
        if self.label.is_empty() {
            format!("Site {}", self.id)
        } else {
            self.label.clone()
        }
    }
}

/// Operator-chosen tour origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPoint {
    pub x: f64,
    pub y: f64,
    /// Site the start was taken from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<SiteId>,
}

impl StartPoint {
    /// Freeform start at a plane coordinate.
    pub fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            site_id: None,
        }
    }

    /// Start placed on an existing site.
    pub fn from_site(sites: &[Site], id: SiteId) -> Result<Self> {
        let site = find_site(sites, id).ok_or(Error::UnknownSite { id })?;
        Ok(Self {
            x: site.x,
            y: site.y,
            site_id: Some(site.id),
        })
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_site_derived(&self) -> bool {
        self.site_id.is_some()
    }
}

pub fn find_site(sites: &[Site], id: SiteId) -> Option<&Site> {
    sites.iter().find(|site| site.id == id)
}
