//! Core raster types.

use geo_common::{AffineTransform, BoundingBox, CrsCode, GeoError, GeoResult};

/// A single-band raster with its georeferencing.
#[derive(Debug, Clone)]
pub struct RasterGrid {
    /// Pixel values (row-major order, top-to-bottom). NaN marks missing data.
    pub data: Vec<f32>,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Pixel to native-CRS transform.
    pub transform: AffineTransform,
    /// Native CRS of the raster.
    pub crs: CrsCode,
}

impl RasterGrid {
    /// Create a raster, checking that the data matches the dimensions.
    pub fn new(
        data: Vec<f32>,
        width: usize,
        height: usize,
        transform: AffineTransform,
        crs: CrsCode,
    ) -> GeoResult<Self> {
        if data.len() != width * height {
            return Err(GeoError::raster_read(format!(
                "expected {}x{} = {} values, got {}",
                width,
                height,
                width * height,
                data.len()
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            transform,
            crs,
        })
    }

    /// Get the value at a pixel.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Outer bounds of the raster (pixel edges) in its native CRS.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_corners(
            self.transform.pixel_to_map(0.0, 0.0),
            self.transform
                .pixel_to_map(self.width as f64, self.height as f64),
        )
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One year's raster clipped to the requested bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipResult {
    /// Clipped pixel values (row-major, NaN already replaced by 0).
    pub data: Vec<f32>,
    /// Width of the clipped window in pixels.
    pub width: usize,
    /// Height of the clipped window in pixels.
    pub height: usize,
    /// Realized extent `(x_min, x_max, y_min, y_max)` of the selected pixel centres.
    ///
    /// Differs slightly from the requested box because the clip snaps to
    /// the raster's pixel grid.
    pub extent: (f64, f64, f64, f64),
    /// Transform of the clipped window.
    pub transform: AffineTransform,
    /// Number of NaN pixels that were replaced by 0.
    pub nodata_count: usize,
}

impl ClipResult {
    /// Get the value at a pixel of the clipped window.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// The clipped window as a standalone raster in `crs`.
    pub fn to_raster(&self, crs: CrsCode) -> GeoResult<RasterGrid> {
        RasterGrid::new(self.data.clone(), self.width, self.height, self.transform, crs)
    }

    /// Total number of pixels.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the clip has no pixels (never true for a successful clip).
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> RasterGrid {
        RasterGrid::new(
            vec![1.0, f32::NAN, 3.0, 4.0, 5.0, 6.0],
            3,
            2,
            AffineTransform::north_up(100.0, 200.0, 10.0, 10.0),
            CrsCode::new(32633),
        )
        .unwrap()
    }

    #[test]
    fn test_dimension_mismatch() {
        let result = RasterGrid::new(
            vec![0.0; 5],
            3,
            2,
            AffineTransform::north_up(0.0, 0.0, 1.0, 1.0),
            CrsCode::WGS84,
        );
        assert!(matches!(result, Err(GeoError::RasterRead(_))));
    }

    #[test]
    fn test_get_and_bounds() {
        let g = grid();
        assert_eq!(g.get(2, 1), Some(6.0));
        assert_eq!(g.get(3, 0), None);
        assert_eq!(g.bounds(), BoundingBox::new(100.0, 180.0, 130.0, 200.0));
    }

    #[test]
    fn test_clip_to_raster() {
        let clip = ClipResult {
            data: vec![1.0, 2.0],
            width: 2,
            height: 1,
            extent: (105.0, 115.0, 195.0, 195.0),
            transform: AffineTransform::north_up(100.0, 200.0, 10.0, 10.0),
            nodata_count: 0,
        };
        let r = clip.to_raster(CrsCode::new(32633)).unwrap();
        assert_eq!(r.bounds(), BoundingBox::new(100.0, 190.0, 120.0, 200.0));
    }
}
