//! Common types and utilities shared across the raster-bbox crates.

pub mod affine;
pub mod bbox;
pub mod crs;
pub mod error;

pub use affine::AffineTransform;
pub use bbox::BoundingBox;
pub use crs::CrsCode;
pub use error::{GeoError, GeoResult};
