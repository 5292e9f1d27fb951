//! Coordinate reference system transformations.
//!
//! Wraps a forward/inverse projection pair between a raster's native CRS
//! and WGS84 longitude/latitude. Projection math is delegated to `proj4rs`;
//! EPSG codes are resolved through the `crs-definitions` table.

pub mod definitions;
pub mod transformer;

pub use definitions::{is_geographic, proj_string};
pub use transformer::CoordinateTransformer;
