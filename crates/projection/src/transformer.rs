//! Forward/inverse projection pair between a native CRS and WGS84.

use std::fmt;

use geo_common::{CrsCode, GeoError, GeoResult};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::debug;

use crate::definitions::{self, WGS84_PROJ};

/// Converts coordinates between a raster's native CRS and WGS84 lon/lat.
///
/// Both directions use `always_xy` ordering: x/longitude first, then
/// y/latitude. Build a new transformer whenever the governing CRS changes;
/// a single instance can be reused for any number of calls.
pub struct CoordinateTransformer {
    crs: CrsCode,
    native: Proj,
    wgs84: Proj,
    native_is_geographic: bool,
}

impl CoordinateTransformer {
    /// Create the projection pair for `crs`.
    pub fn new(crs: CrsCode) -> GeoResult<Self> {
        let native_def = definitions::proj_string(crs)?;

        let native = Proj::from_proj_string(native_def)
            .map_err(|e| GeoError::UnsupportedCrs(format!("invalid projection {crs}: {e:?}")))?;
        let wgs84 = Proj::from_proj_string(WGS84_PROJ)
            .map_err(|e| GeoError::Projection(format!("invalid WGS84 definition: {e:?}")))?;

        debug!(crs = %crs, definition = native_def, "Created coordinate transformer");

        Ok(Self {
            crs,
            native,
            wgs84,
            native_is_geographic: definitions::is_geographic(crs),
        })
    }

    /// The native CRS this transformer was built for.
    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    /// Convert a native-CRS point to `(lon, lat)` in degrees.
    pub fn to_latlon(&self, x: f64, y: f64) -> GeoResult<(f64, f64)> {
        if self.crs == CrsCode::WGS84 {
            return Ok((x, y));
        }

        let mut point = if self.native_is_geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };

        transform(&self.native, &self.wgs84, &mut point).map_err(|e| {
            GeoError::Projection(format!("{} -> EPSG:4326 failed for ({x}, {y}): {e:?}", self.crs))
        })?;

        checked((point.0.to_degrees(), point.1.to_degrees()), || {
            format!("{} -> EPSG:4326 produced no result for ({x}, {y})", self.crs)
        })
    }

    /// Convert `(lon, lat)` in degrees to a native-CRS point.
    pub fn from_latlon(&self, lon: f64, lat: f64) -> GeoResult<(f64, f64)> {
        if self.crs == CrsCode::WGS84 {
            return Ok((lon, lat));
        }

        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);

        transform(&self.wgs84, &self.native, &mut point).map_err(|e| {
            GeoError::Projection(format!(
                "EPSG:4326 -> {} failed for ({lon}, {lat}): {e:?}",
                self.crs
            ))
        })?;

        let out = if self.native_is_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        checked(out, || {
            format!("EPSG:4326 -> {} produced no result for ({lon}, {lat})", self.crs)
        })
    }

    /// Element-wise [`to_latlon`](Self::to_latlon) over equal-length slices.
    pub fn to_latlon_many(&self, xs: &[f64], ys: &[f64]) -> GeoResult<(Vec<f64>, Vec<f64>)> {
        self.map_many(xs, ys, |x, y| self.to_latlon(x, y))
    }

    /// Element-wise [`from_latlon`](Self::from_latlon) over equal-length slices.
    pub fn from_latlon_many(&self, lons: &[f64], lats: &[f64]) -> GeoResult<(Vec<f64>, Vec<f64>)> {
        self.map_many(lons, lats, |lon, lat| self.from_latlon(lon, lat))
    }

    fn map_many<F>(&self, a: &[f64], b: &[f64], f: F) -> GeoResult<(Vec<f64>, Vec<f64>)>
    where
        F: Fn(f64, f64) -> GeoResult<(f64, f64)>,
    {
        if a.len() != b.len() {
            return Err(GeoError::invalid_parameter(
                "coordinates",
                format!("sequence lengths differ: {} vs {}", a.len(), b.len()),
            ));
        }

        let mut out_a = Vec::with_capacity(a.len());
        let mut out_b = Vec::with_capacity(b.len());
        for (&u, &v) in a.iter().zip(b) {
            let (p, q) = f(u, v)?;
            out_a.push(p);
            out_b.push(q);
        }
        Ok((out_a, out_b))
    }
}

impl fmt::Debug for CoordinateTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateTransformer")
            .field("crs", &self.crs)
            .field("native_is_geographic", &self.native_is_geographic)
            .finish()
    }
}

fn checked<F>(point: (f64, f64), describe: F) -> GeoResult<(f64, f64)>
where
    F: FnOnce() -> String,
{
    if point.0.is_finite() && point.1.is_finite() {
        Ok(point)
    } else {
        Err(GeoError::Projection(describe()))
    }
}
