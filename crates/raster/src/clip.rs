//! Clipping rasters to a native-CRS bounding box.
//!
//! A pixel is kept when its centre lies inside the box (edges inclusive).
//! The result therefore snaps to each raster's own grid, and the realized
//! extent is reported per year.

use std::collections::BTreeMap;

use geo_common::{BoundingBox, CrsCode, GeoError, GeoResult};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::source::RasterSource;
use crate::types::{ClipResult, RasterGrid};

/// Slack, in pixels, when deciding whether a centre lies on the box edge.
const EDGE_TOLERANCE: f64 = 1e-9;

/// Reject boxes that cannot select any area.
pub fn validate_bounds(bbox: &BoundingBox) -> GeoResult<()> {
    if bbox.is_degenerate() {
        return Err(GeoError::InvalidBounds(format!(
            "zero-area or non-finite box (x {}..{}, y {}..{})",
            bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y
        )));
    }
    Ok(())
}

/// Clip one raster to `bbox`, which must be in the raster's CRS.
pub fn clip_raster(year: &str, raster: &RasterGrid, bbox: &BoundingBox) -> GeoResult<ClipResult> {
    validate_bounds(bbox)?;

    let t = &raster.transform;
    if !t.is_invertible() {
        return Err(GeoError::invalid_parameter(
            "transform",
            format!("raster for year {year} has a zero pixel size"),
        ));
    }
    if !t.is_rectilinear() {
        warn!(year, b = t.b, d = t.d, "Ignoring rotation terms of raster transform");
    }

    let cols = axis_window(t.c, t.a, bbox.min_x, bbox.max_x, raster.width);
    let rows = axis_window(t.f, t.e, bbox.min_y, bbox.max_y, raster.height);

    let ((col0, col1), (row0, row1)) = match (cols, rows) {
        (Some(c), Some(r)) => (c, r),
        _ => {
            return Err(GeoError::EmptyClip {
                year: year.to_string(),
            })
        }
    };

    let width = col1 - col0;
    let height = row1 - row0;
    let mut data = Vec::with_capacity(width * height);
    let mut nodata_count = 0;

    for row in row0..row1 {
        let start = row * raster.width;
        for &v in &raster.data[start + col0..start + col1] {
            if v.is_nan() {
                nodata_count += 1;
                data.push(0.0);
            } else {
                data.push(v);
            }
        }
    }

    let first = t.pixel_center(col0, row0);
    let last = t.pixel_center(col1 - 1, row1 - 1);
    let extent = BoundingBox::from_corners(first, last).to_extent();

    debug!(
        year,
        col0, row0, width, height, nodata_count,
        extent = ?extent,
        "Clipped raster"
    );

    Ok(ClipResult {
        data,
        width,
        height,
        extent,
        transform: t.window(col0, row0),
        nodata_count,
    })
}

/// Half-open index range of pixels whose centres lie in `[lo, hi]`.
///
/// Centres sit at `origin + step * (i + 0.5)`; `step` may be negative.
fn axis_window(origin: f64, step: f64, lo: f64, hi: f64, len: usize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }

    let t1 = (lo - origin) / step - 0.5;
    let t2 = (hi - origin) / step - 0.5;
    let (t_min, t_max) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

    let first = (t_min - EDGE_TOLERANCE).ceil().max(0.0);
    let last = (t_max + EDGE_TOLERANCE).floor().min(len as f64 - 1.0);

    if first > last {
        return None;
    }
    Some((first as usize, last as usize + 1))
}

/// Applies one native-CRS box to every year of a raster series.
pub struct MultiYearClipper<'a> {
    source: &'a dyn RasterSource,
    reference_crs: CrsCode,
}

impl<'a> MultiYearClipper<'a> {
    /// `reference_crs` is the CRS the bounding box was built in.
    pub fn new(source: &'a dyn RasterSource, reference_crs: CrsCode) -> Self {
        Self {
            source,
            reference_crs,
        }
    }

    pub fn reference_crs(&self) -> CrsCode {
        self.reference_crs
    }

    /// Load and clip a single year.
    pub fn clip_year(&self, year: &str, crs_box: &BoundingBox) -> GeoResult<ClipResult> {
        let raster = self.source.load(year)?;

        if raster.crs != self.reference_crs {
            return Err(GeoError::CrsMismatch {
                year: year.to_string(),
                expected: self.reference_crs,
                found: raster.crs,
            });
        }

        clip_raster(year, &raster, crs_box)
    }

    /// Clip every year, stopping at the first failure.
    pub fn clip_all(
        &self,
        years: &[String],
        crs_box: &BoundingBox,
    ) -> GeoResult<BTreeMap<String, ClipResult>> {
        self.check_request(years, crs_box)?;

        let mut clips = BTreeMap::new();
        for year in years {
            let clip = self.clip_year(year, crs_box)?;
            clips.insert(year.clone(), clip);
        }

        info!(years = years.len(), crs = %self.reference_crs, "Clipped all years");
        Ok(clips)
    }

    /// Same as [`clip_all`](Self::clip_all) with years processed on the rayon pool.
    ///
    /// Results are gathered in input order, so the reported failure is the
    /// one the sequential path would hit first.
    pub fn clip_all_parallel(
        &self,
        years: &[String],
        crs_box: &BoundingBox,
    ) -> GeoResult<BTreeMap<String, ClipResult>> {
        self.check_request(years, crs_box)?;

        let results: Vec<GeoResult<ClipResult>> = years
            .par_iter()
            .map(|year| self.clip_year(year, crs_box))
            .collect();

        let mut clips = BTreeMap::new();
        for (year, result) in years.iter().zip(results) {
            clips.insert(year.clone(), result?);
        }

        info!(years = years.len(), crs = %self.reference_crs, "Clipped all years in parallel");
        Ok(clips)
    }

    fn check_request(&self, years: &[String], crs_box: &BoundingBox) -> GeoResult<()> {
        if years.is_empty() {
            return Err(GeoError::configuration("no years to clip"));
        }
        validate_bounds(crs_box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::AffineTransform;

    fn raster(width: usize, height: usize) -> RasterGrid {
        let data = (0..width * height).map(|i| i as f32).collect();
        RasterGrid::new(
            data,
            width,
            height,
            AffineTransform::north_up(500000.0, 4000000.0, 10.0, 10.0),
            CrsCode::new(32633),
        )
        .unwrap()
    }

    #[test]
    fn test_axis_window_positive_step() {
        // centres at 5, 15, 25, ...
        assert_eq!(axis_window(0.0, 10.0, 0.0, 30.0, 10), Some((0, 3)));
        assert_eq!(axis_window(0.0, 10.0, 5.0, 25.0, 10), Some((0, 3)));
        assert_eq!(axis_window(0.0, 10.0, 6.0, 24.0, 10), Some((1, 2)));
    }

    #[test]
    fn test_axis_window_negative_step() {
        // centres at 95, 85, 75, ...
        assert_eq!(axis_window(100.0, -10.0, 80.0, 100.0, 10), Some((0, 2)));
    }

    #[test]
    fn test_axis_window_outside() {
        assert_eq!(axis_window(0.0, 10.0, 200.0, 300.0, 10), None);
        assert_eq!(axis_window(0.0, 10.0, 6.0, 14.0, 10), None);
        assert_eq!(axis_window(0.0, 10.0, 0.0, 10.0, 0), None);
    }

    #[test]
    fn test_axis_window_clamps_partial_coverage() {
        assert_eq!(axis_window(0.0, 10.0, -50.0, 25.0, 10), Some((0, 3)));
        assert_eq!(axis_window(0.0, 10.0, 75.0, 500.0, 10), Some((7, 10)));
    }

    #[test]
    fn test_clip_exact_box() {
        let r = raster(200, 100);
        let bbox = BoundingBox::new(500000.0, 3999500.0, 501000.0, 4000000.0);
        let clip = clip_raster("2020", &r, &bbox).unwrap();

        assert_eq!(clip.width, 100);
        assert_eq!(clip.height, 50);
        assert_eq!(clip.extent, (500005.0, 500995.0, 3999505.0, 3999995.0));
        assert_eq!(clip.get(0, 0), Some(0.0));
        assert_eq!(clip.get(0, 1), Some(200.0));
        assert_eq!(clip.transform.pixel_to_map(0.0, 0.0), (500000.0, 4000000.0));
    }

    #[test]
    fn test_clip_nan_to_zero() {
        let mut r = raster(4, 4);
        r.data[5] = f32::NAN;
        let bbox = r.bounds();
        let clip = clip_raster("2020", &r, &bbox).unwrap();
        assert_eq!(clip.get(1, 1), Some(0.0));
        assert_eq!(clip.nodata_count, 1);
        assert!(clip.data.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_clip_degenerate_box() {
        let r = raster(10, 10);
        let zero_width = BoundingBox::new(500010.0, 3999900.0, 500010.0, 4000000.0);
        let zero_height = BoundingBox::new(500000.0, 3999950.0, 500100.0, 3999950.0);

        assert!(matches!(
            clip_raster("2020", &r, &zero_width),
            Err(GeoError::InvalidBounds(_))
        ));
        assert!(matches!(
            clip_raster("2020", &r, &zero_height),
            Err(GeoError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_clip_disjoint_box() {
        let r = raster(10, 10);
        let far = BoundingBox::new(600000.0, 3000000.0, 601000.0, 3001000.0);
        let err = clip_raster("2019", &r, &far).unwrap_err();
        assert!(matches!(err, GeoError::EmptyClip { ref year } if year == "2019"));
    }
}
