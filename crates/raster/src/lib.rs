//! Raster access and multi-year bounding box clipping.
//!
//! Every year of a series is a single-band raster sharing one CRS. A single
//! native-CRS bounding box is applied to all of them:
//!
//! ```text
//! clip_all(years, crs_box)
//!      │
//!      ├─► validate box (degenerate → InvalidBounds)
//!      │
//!      ├─► for each year:
//!      │       RasterSource::load(year)
//!      │       check CRS against the box (→ CrsMismatch)
//!      │       select pixels whose centres fall in the box (→ EmptyClip)
//!      │       NaN → 0
//!      │
//!      └─► year → ClipResult { data, width, height, extent }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use raster::{GeoTiffSource, MultiYearClipper};
//!
//! let source = GeoTiffSource::new("/data/lake");
//! let clipper = MultiYearClipper::new(&source, reference_crs);
//! let clips = clipper.clip_all(&years, &geobox.crs)?;
//! ```

pub mod clip;
pub mod source;
pub mod types;

pub use clip::{clip_raster, MultiYearClipper};
pub use source::{
    discover_years, read_geotiff, write_geotiff, year_path, GeoTiffSource, MemorySource,
    RasterSource,
};
pub use types::{ClipResult, RasterGrid};
