//! EPSG code to PROJ.4 definition lookup.

use geo_common::{CrsCode, GeoError, GeoResult};

/// PROJ.4 definition used for WGS84 longitude/latitude.
pub const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Get the PROJ.4 string for an EPSG code from the crs-definitions database.
pub fn proj_string(crs: CrsCode) -> GeoResult<&'static str> {
    if crs == CrsCode::WGS84 {
        return Ok(WGS84_PROJ);
    }

    crs_definitions::from_code(crs.epsg())
        .map(|def| def.proj4)
        .ok_or_else(|| {
            GeoError::UnsupportedCrs(format!("{crs} is not in the crs-definitions database"))
        })
}

/// Check if a CRS is geographic (degrees) rather than projected.
pub fn is_geographic(crs: CrsCode) -> bool {
    proj_string(crs)
        .map(|s| s.contains("+proj=longlat") || s.contains("+proj=latlong"))
        .unwrap_or(false)
}
