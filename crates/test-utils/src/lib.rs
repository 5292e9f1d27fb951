//! Shared test utilities for the raster-bbox workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic raster data generators
//! - Common fixtures (affine transforms, boxes, year lists)
//! - An extent comparison macro with a tolerance
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_extent_approx_eq, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Assert that two extents `(x_min, x_max, y_min, y_max)` agree edge by
/// edge within `tolerance` (in the extent's own units).
///
/// ```ignore
/// use test_utils::assert_extent_approx_eq;
///
/// assert_extent_approx_eq!(clip.extent, (500005.0, 500995.0, 3999505.0, 3999995.0), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_extent_approx_eq {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (ax0, ax1, ay0, ay1): (f64, f64, f64, f64) = $actual;
        let (ex0, ex1, ey0, ey1): (f64, f64, f64, f64) = $expected;
        let tolerance: f64 = $tolerance;
        for (edge, a, e) in [
            ("x_min", ax0, ex0),
            ("x_max", ax1, ex1),
            ("y_min", ay0, ey0),
            ("y_max", ay1, ey1),
        ] {
            if !((a - e).abs() <= tolerance) {
                panic!(
                    "extent {} differs: actual {:?}, expected {:?} (tolerance {:?})\n  actual extent: {:?}\nexpected extent: {:?}",
                    edge,
                    a,
                    e,
                    tolerance,
                    (ax0, ax1, ay0, ay1),
                    (ex0, ex1, ey0, ey1)
                );
            }
        }
    }};
}
