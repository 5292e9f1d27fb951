//! Common test fixtures for raster-bbox tests.
//!
//! The reference scene is a UTM zone 33N grid with 10 m pixels whose
//! top-left corner sits at (500000, 4000000), i.e. on the zone's central
//! meridian (15°E), a little north of 36°N.

/// EPSG codes used across the test suite.
pub mod crs {
    /// WGS 84 geographic.
    pub const WGS84: u16 = 4326;

    /// WGS 84 / UTM zone 33N.
    pub const UTM33N: u16 = 32633;

    /// WGS 84 / UTM zone 32N, for mismatch cases.
    pub const UTM32N: u16 = 32632;
}

/// Affine coefficients `(a, b, c, d, e, f)` for test rasters.
pub mod transform {
    /// 10 m north-up grid anchored at (500000, 4000000).
    pub const UTM33_10M: (f64, f64, f64, f64, f64, f64) =
        (10.0, 0.0, 500000.0, 0.0, -10.0, 4000000.0);

    /// 20 m grid over the same origin, for multi-resolution series.
    pub const UTM33_20M: (f64, f64, f64, f64, f64, f64) =
        (20.0, 0.0, 500000.0, 0.0, -20.0, 4000000.0);

    /// Same scene shifted 1 km east.
    pub const UTM33_10M_SHIFTED: (f64, f64, f64, f64, f64, f64) =
        (10.0, 0.0, 501000.0, 0.0, -10.0, 4000000.0);

    /// 0.001° geographic grid anchored at (15°E, 45°N).
    pub const WGS84_MILLIDEG: (f64, f64, f64, f64, f64, f64) =
        (0.001, 0.0, 15.0, 0.0, -0.001, 45.0);
}

/// Bounding boxes in native coordinates, `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// The 1 km x 500 m box covered by pixels (0,0)..(100,50) of `UTM33_10M`.
    pub const UTM33_PIXEL_RECT: (f64, f64, f64, f64) = (500000.0, 3999500.0, 501000.0, 4000000.0);

    /// Whole extent of a 200 x 100 raster on `UTM33_10M`.
    pub const UTM33_FULL_200X100: (f64, f64, f64, f64) =
        (500000.0, 3999000.0, 502000.0, 4000000.0);

    /// Far away from every test raster.
    pub const UTM33_DISJOINT: (f64, f64, f64, f64) = (700000.0, 3000000.0, 701000.0, 3001000.0);

    /// Zero width.
    pub const DEGENERATE: (f64, f64, f64, f64) = (500100.0, 3999500.0, 500100.0, 4000000.0);
}

/// Pixel rectangles `(col0, row0, col1, row1)` as an interactive selector
/// would report them.
pub mod pixel_rect {
    /// Drawn top-left to bottom-right.
    pub const FORWARD: (f64, f64, f64, f64) = (0.0, 0.0, 100.0, 50.0);

    /// Same rectangle drawn bottom-right to top-left.
    pub const REVERSED: (f64, f64, f64, f64) = (100.0, 50.0, 0.0, 0.0);

    /// A click without a drag.
    pub const CLICK: (f64, f64, f64, f64) = (40.0, 20.0, 40.0, 20.0);
}

/// Year lists for multi-year series.
pub mod years {
    pub const THREE: [&str; 3] = ["2019", "2020", "2021"];

    pub const SINGLE: [&str; 1] = ["2020"];

    /// Owned copy of a year list.
    pub fn owned(years: &[&str]) -> Vec<String> {
        years.iter().map(|y| y.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_rect_matches_bbox() {
        let (a, _, c, _, e, f) = transform::UTM33_10M;
        let (c0, r0, c1, r1) = pixel_rect::FORWARD;
        let (min_x, min_y, max_x, max_y) = bbox::UTM33_PIXEL_RECT;

        assert_eq!(c + a * c0, min_x);
        assert_eq!(c + a * c1, max_x);
        assert_eq!(f + e * r0, max_y);
        assert_eq!(f + e * r1, min_y);
    }

    #[test]
    fn test_owned_years() {
        assert_eq!(years::owned(&years::THREE), vec!["2019", "2020", "2021"]);
    }
}
