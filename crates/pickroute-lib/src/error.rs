use std::path::PathBuf;

use thiserror::Error;

use crate::site::SiteId;

/// Convenient result alias for the pickroute library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when grid dimensions violate the construction contract.
    #[error("invalid grid: {message}")]
    InvalidGrid { message: String },

    /// Facility file could not be located at the resolved path.
    #[error("facility file not found at {path}")]
    FacilityNotFound { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the facility file")]
    ProjectDirsUnavailable,

    /// Raised when a start point or request refers to a site that does not exist.
    #[error("unknown site id: {id}")]
    UnknownSite { id: SiteId },

    /// Raised when a calibration reference measurement is unusable.
    #[error("invalid calibration: {message}")]
    InvalidCalibration { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_grid(message: impl Into<String>) -> Self {
        Error::InvalidGrid {
            message: message.into(),
        }
    }
}
