//! Raster-to-physical unit conversion.
//!
//! Distances on the floor plan are measured in raster units (pixels). A
//! calibration maps them to meters and, with a walking speed, to seconds.
//! Without a usable scale every physical value is `None` and results are
//! flagged as uncalibrated so renderers show "unknown" rather than zero.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Walking speed assumed when none is configured.
pub const DEFAULT_SPEED_KMH: f64 = 7.0;

/// Scale factor and walking speed for a floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    #[serde(default)]
    pub pixels_per_meter: Option<f64>,
    #[serde(default = "default_speed_kmh")]
    pub default_speed_kmh: f64,
}

fn default_speed_kmh() -> f64 {
    DEFAULT_SPEED_KMH
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixels_per_meter: None,
            default_speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

/// Physical reading of one raster distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub meters: Option<f64>,
    pub seconds: Option<f64>,
}

impl Calibration {
    pub fn uncalibrated() -> Self {
        Self::default()
    }

    pub fn with_scale(pixels_per_meter: f64) -> Self {
        Self {
            pixels_per_meter: Some(pixels_per_meter),
            ..Self::default()
        }
    }

    pub fn with_speed(mut self, speed_kmh: f64) -> Self {
        self.default_speed_kmh = speed_kmh;
        self
    }

    /// Derive the scale from two marked points `raster_distance` apart that
    /// are known to be `meters` apart.
    pub fn from_reference(raster_distance: f64, meters: f64) -> Result<Self> {
        if !meters.is_finite() || meters <= 0.0 {
            return Err(Error::InvalidCalibration {
                message: format!("reference distance must be positive (got {meters} m)"),
            });
        }
        if !raster_distance.is_finite() || raster_distance <= 0.0 {
            return Err(Error::InvalidCalibration {
                message: "reference points must be distinct".to_string(),
            });
        }
        Ok(Self::with_scale(raster_distance / meters))
    }

    /// Usable scale, if any. Non-positive or non-finite scales count as absent.
    pub fn scale(&self) -> Option<f64> {
        self.pixels_per_meter
            .filter(|ppm| ppm.is_finite() && *ppm > 0.0)
    }

    pub fn is_calibrated(&self) -> bool {
        self.scale().is_some()
    }

    pub fn meters_per_second(&self) -> f64 {
        self.default_speed_kmh * 1000.0 / 3600.0
    }

    pub fn to_meters(&self, raster: f64) -> Option<f64> {
        self.scale().map(|ppm| raster / ppm)
    }

    pub fn to_seconds(&self, raster: f64) -> Option<f64> {
        let speed = self.meters_per_second();
        if !speed.is_finite() || speed <= 0.0 {
            return None;
        }
        self.to_meters(raster).map(|meters| meters / speed)
    }

    pub fn measure(&self, raster: f64) -> Measurement {
        Measurement {
            meters: self.to_meters(raster),
            seconds: self.to_seconds(raster),
        }
    }
}
