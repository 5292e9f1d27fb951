//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::{GeoError, GeoResult};

/// A geographic or projected bounding box.
///
/// For a geographic box x is longitude and y is latitude, in degrees.
/// For a projected box both axes are in the CRS units (usually meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from already ordered bounds.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create a bounding box from two opposite corners given in any order.
    ///
    /// Each axis is sorted independently, so a bottom-right to top-left pair
    /// produces the same box as top-left to bottom-right. The corners must be
    /// finite: `f64::min` would silently drop a NaN coordinate. Use
    /// [`try_from_corners`](Self::try_from_corners) for untrusted input.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            min_x: a.0.min(b.0),
            min_y: a.1.min(b.1),
            max_x: a.0.max(b.0),
            max_y: a.1.max(b.1),
        }
    }

    /// Like [`from_corners`](Self::from_corners), but fails with
    /// `InvalidBounds` when any coordinate is NaN or infinite.
    pub fn try_from_corners(a: (f64, f64), b: (f64, f64)) -> GeoResult<Self> {
        if [a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
            Ok(Self::from_corners(a, b))
        } else {
            Err(GeoError::InvalidBounds(format!(
                "non-finite corner in ({}, {}) - ({}, {})",
                a.0, a.1, b.0, b.1
            )))
        }
    }

    /// The bounds as `(x_min, x_max, y_min, y_max)`.
    pub fn to_extent(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.max_x, self.min_y, self.max_y)
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when every bound is a finite number.
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// A zero-area (or non-finite) box: nothing can be clipped with it.
    pub fn is_degenerate(&self) -> bool {
        !self.is_finite() || !(self.width() > 0.0) || !(self.height() > 0.0)
    }
}
