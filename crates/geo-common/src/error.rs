//! Error types for raster-bbox operations.

use thiserror::Error;

use crate::CrsCode;

/// Result type alias using GeoError.
pub type GeoResult<T> = Result<T, GeoError>;

/// Primary error type for bounding box, projection, clipping and rendering.
#[derive(Debug, Error)]
pub enum GeoError {
    // === Setup Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unsupported CRS: {0}")]
    UnsupportedCrs(String),

    // === Geometry Errors ===
    #[error("Invalid bounding box: {0}")]
    InvalidBounds(String),

    #[error("CRS mismatch for year {year}: bounding box is in {expected}, raster is in {found}")]
    CrsMismatch {
        year: String,
        expected: CrsCode,
        found: CrsCode,
    },

    #[error("Bounding box does not intersect the raster for year {year}")]
    EmptyClip { year: String },

    #[error("Projection error: {0}")]
    Projection(String),

    // === Data Errors ===
    #[error("Percentile range collapsed: low={low}, high={high}")]
    DegenerateRange { low: f64, high: f64 },

    #[error("Failed to read raster: {0}")]
    RasterRead(String),

    // === Output Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeoError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a RasterRead error.
    pub fn raster_read(msg: impl Into<String>) -> Self {
        Self::RasterRead(msg.into())
    }

    /// Short stable code for this error, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            GeoError::Configuration(_) => "configuration",
            GeoError::InvalidParameter { .. } => "invalid_parameter",
            GeoError::UnsupportedCrs(_) => "unsupported_crs",
            GeoError::InvalidBounds(_) => "invalid_bounds",
            GeoError::CrsMismatch { .. } => "crs_mismatch",
            GeoError::EmptyClip { .. } => "empty_clip",
            GeoError::Projection(_) => "projection",
            GeoError::DegenerateRange { .. } => "degenerate_range",
            GeoError::RasterRead(_) => "raster_read",
            GeoError::Render(_) => "render",
            GeoError::Io(_) => "io",
        }
    }
}
