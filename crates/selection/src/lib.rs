//! Bounding box selection.
//!
//! A [`GeoBox`] holds one region of interest in two synchronized forms: WGS84
//! lat/lon (canonical) and the native CRS of the reference raster (derived).
//! [`ViewerState`] tracks what has been set up so far and refuses operations
//! that need a CRS or a box before one exists.

pub mod geobox;
pub mod state;

pub use geobox::{BoxOrigin, GeoBox};
pub use state::{ReferenceRaster, ViewerState};
