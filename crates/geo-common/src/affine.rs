//! Affine pixel-to-map transforms for axis-aligned rasters.

use serde::{Deserialize, Serialize};

/// Six-coefficient affine transform in rasterio order.
///
/// Maps pixel `(col, row)` to map `(X, Y)`:
///
/// ```text
/// X = a * col + b * row + c
/// Y = d * col + e * row + f
/// ```
///
/// Only axis-aligned rasters are supported. The rotation terms `b` and `d`
/// are kept so a loaded transform can be inspected, but the mapping methods
/// treat them as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform from an origin (top-left corner) and pixel size.
    ///
    /// `pixel_height` is the positive ground size of a row; the stored `e`
    /// coefficient is negated so rows grow southwards.
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height, origin_y)
    }

    /// Build from a GDAL geotransform `[c, a, b, f, d, e]`.
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// True when the rotation terms are zero.
    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }

    /// True when both scale terms are finite and non-zero.
    pub fn is_invertible(&self) -> bool {
        self.a.is_finite() && self.e.is_finite() && self.a != 0.0 && self.e != 0.0
    }

    /// Pixel size as `(|a|, |e|)`.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.a.abs(), self.e.abs())
    }

    /// Convert a pixel position to map coordinates in the raster's CRS.
    ///
    /// Integer positions address pixel corners; add 0.5 for centres.
    pub fn pixel_to_map(&self, col: f64, row: f64) -> (f64, f64) {
        (self.c + self.a * col, self.f + self.e * row)
    }

    /// Map coordinates of the centre of pixel `(col, row)`.
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.pixel_to_map(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Convert map coordinates to fractional pixel coordinates.
    ///
    /// Returns `None` when the transform has a zero scale term.
    pub fn map_to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !self.is_invertible() {
            return None;
        }
        Some(((x - self.c) / self.a, (y - self.f) / self.e))
    }

    /// Transform of a window whose top-left pixel is `(col_off, row_off)`.
    pub fn window(&self, col_off: usize, row_off: usize) -> Self {
        let (c, f) = self.pixel_to_map(col_off as f64, row_off as f64);
        Self { c, f, ..*self }
    }
}
