//! The dual-representation bounding box.

use geo_common::{AffineTransform, BoundingBox, CrsCode, GeoResult};
use projection::CoordinateTransformer;
use tracing::{debug, warn};

/// How a box came to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxOrigin {
    /// Given directly in lat/lon.
    Manual,
    /// Derived from a pixel rectangle on the reference raster.
    PixelSelection,
}

/// A region of interest in WGS84 and in the reference raster's CRS.
///
/// `latlon` is canonical; `crs` is always the sorted forward projection of
/// its two diagonal corners. The fields are private so the halves cannot
/// drift apart: the only way to get a `GeoBox` is through
/// [`from_latlon`](Self::from_latlon) or
/// [`from_pixel_rect`](Self::from_pixel_rect).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoBox {
    latlon: BoundingBox,
    crs: BoundingBox,
    crs_code: CrsCode,
    origin: BoxOrigin,
}

impl GeoBox {
    /// Build a box from lat/lon limits in degrees.
    ///
    /// Each pair is sorted first, so swapped limits give the same box.
    pub fn from_latlon(
        transformer: &CoordinateTransformer,
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
    ) -> GeoResult<Self> {
        let latlon = BoundingBox::try_from_corners((lon_min, lat_min), (lon_max, lat_max))?;
        Self::derive(transformer, latlon, BoxOrigin::Manual)
    }

    /// Build a box from two pixel corners on the reference raster.
    ///
    /// The corners may be given in any order. They are mapped to the native
    /// CRS, converted to lat/lon, and the native box is then re-derived from
    /// the lat/lon box exactly as [`from_latlon`](Self::from_latlon) does.
    pub fn from_pixel_rect(
        transformer: &CoordinateTransformer,
        affine: &AffineTransform,
        col1: f64,
        row1: f64,
        col2: f64,
        row2: f64,
    ) -> GeoResult<Self> {
        let pixels = BoundingBox::try_from_corners((col1, row1), (col2, row2))?;

        let (x1, y1) = affine.pixel_to_map(pixels.min_x, pixels.min_y);
        let (x2, y2) = affine.pixel_to_map(pixels.max_x, pixels.max_y);
        let corner1 = transformer.to_latlon(x1, y1)?;
        let corner2 = transformer.to_latlon(x2, y2)?;

        debug!(
            pixels = ?pixels.to_extent(),
            native = ?(x1, x2, y1, y2),
            "Mapped pixel rectangle"
        );

        let latlon = BoundingBox::try_from_corners(corner1, corner2)?;
        Self::derive(transformer, latlon, BoxOrigin::PixelSelection)
    }

    fn derive(
        transformer: &CoordinateTransformer,
        latlon: BoundingBox,
        origin: BoxOrigin,
    ) -> GeoResult<Self> {
        let low = transformer.from_latlon(latlon.min_x, latlon.min_y)?;
        let high = transformer.from_latlon(latlon.max_x, latlon.max_y)?;
        let crs = BoundingBox::try_from_corners(low, high)?;

        let geobox = Self {
            latlon,
            crs,
            crs_code: transformer.crs(),
            origin,
        };

        if geobox.is_degenerate() {
            warn!(
                latlon = ?latlon.to_extent(),
                crs = ?crs.to_extent(),
                "Bounding box has zero area; clipping with it will fail"
            );
        } else {
            debug!(
                latlon = ?latlon.to_extent(),
                crs = ?crs.to_extent(),
                crs_code = %geobox.crs_code,
                origin = ?origin,
                "Bounding box set"
            );
        }

        Ok(geobox)
    }

    /// The box in WGS84, x = longitude, y = latitude.
    pub fn latlon(&self) -> &BoundingBox {
        &self.latlon
    }

    /// The box in the native CRS.
    pub fn crs(&self) -> &BoundingBox {
        &self.crs
    }

    /// The CRS the native box is expressed in.
    pub fn crs_code(&self) -> CrsCode {
        self.crs_code
    }

    pub fn origin(&self) -> BoxOrigin {
        self.origin
    }

    pub fn is_manual(&self) -> bool {
        self.origin == BoxOrigin::Manual
    }

    /// True when either representation has zero width or height.
    pub fn is_degenerate(&self) -> bool {
        self.latlon.is_degenerate() || self.crs.is_degenerate()
    }
}
