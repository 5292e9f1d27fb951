//! Viewer state machine.
//!
//! ```text
//!                load                 set_from_latlon / set_from_pixel_rect
//! Uninitialized ─────► Configured ───────────────────────────────────────► BoxSet
//!                        ▲   ▲                                              │  │
//!                        │   └───────────────── clear_box ──────────────────┘  │
//!                        └──────────────────── load (box dropped) ─────────────┘
//! ```
//!
//! Every transition validates before it touches `self`, so a failed call
//! leaves the state exactly as it was.

use std::collections::BTreeMap;

use geo_common::{AffineTransform, BoundingBox, CrsCode, GeoError, GeoResult};
use projection::CoordinateTransformer;
use raster::{ClipResult, MultiYearClipper, RasterGrid, RasterSource};
use tracing::info;

use crate::geobox::GeoBox;

/// The raster a selection is made on, with its projection pair.
#[derive(Debug)]
pub struct ReferenceRaster {
    year: String,
    raster: RasterGrid,
    transformer: CoordinateTransformer,
}

impl ReferenceRaster {
    /// Wrap a loaded raster, building the transformer for its CRS.
    pub fn new(year: impl Into<String>, raster: RasterGrid) -> GeoResult<Self> {
        let transformer = CoordinateTransformer::new(raster.crs)?;
        Ok(Self {
            year: year.into(),
            raster,
            transformer,
        })
    }

    /// Load `year` from a source and wrap it.
    pub fn from_source(source: &dyn RasterSource, year: &str) -> GeoResult<Self> {
        let raster = source.load(year)?;
        Self::new(year, raster)
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn crs(&self) -> CrsCode {
        self.raster.crs
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.raster.transform
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.raster.width, self.raster.height)
    }

    /// The reference pixels, NaN for missing data.
    pub fn raster(&self) -> &RasterGrid {
        &self.raster
    }

    pub fn transformer(&self) -> &CoordinateTransformer {
        &self.transformer
    }

    /// Fractional pixel rectangle `(col_min, row_min, col_max, row_max)`
    /// covered by a box in the reference CRS.
    pub fn pixel_window(&self, bbox: &BoundingBox) -> Option<(f64, f64, f64, f64)> {
        let t = self.transform();
        let (c1, r1) = t.map_to_pixel(bbox.min_x, bbox.max_y)?;
        let (c2, r2) = t.map_to_pixel(bbox.max_x, bbox.min_y)?;
        Some((c1.min(c2), r1.min(r2), c1.max(c2), r1.max(r2)))
    }
}

/// What the viewer knows so far.
#[derive(Debug, Default)]
pub enum ViewerState {
    /// No reference raster, hence no CRS or transform.
    #[default]
    Uninitialized,
    /// Reference raster loaded; no box yet.
    Configured { reference: ReferenceRaster },
    /// Reference raster loaded and a box set in its CRS.
    BoxSet {
        reference: ReferenceRaster,
        bbox: GeoBox,
    },
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a reference raster. Any existing box is dropped, since the
    /// CRS it was derived in may have changed.
    pub fn load(&mut self, reference: ReferenceRaster) {
        info!(
            year = reference.year(),
            crs = %reference.crs(),
            width = reference.raster.width,
            height = reference.raster.height,
            pixel_size = ?reference.transform().pixel_size(),
            had_box = self.is_set(),
            "Reference raster loaded"
        );
        *self = ViewerState::Configured { reference };
    }

    /// Set the box from lat/lon limits. Always replaces an existing box.
    pub fn set_from_latlon(
        &mut self,
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
    ) -> GeoResult<&GeoBox> {
        let bbox = GeoBox::from_latlon(self.transformer()?, lon_min, lon_max, lat_min, lat_max)?;
        self.install(bbox);
        self.bbox()
    }

    /// Set the box from a pixel rectangle on the reference raster.
    ///
    /// A box that was given in lat/lon takes precedence: if one is set, this
    /// call leaves it in place and returns it. Use
    /// [`clear_box`](Self::clear_box) first to replace it.
    pub fn set_from_pixel_rect(
        &mut self,
        col1: f64,
        row1: f64,
        col2: f64,
        row2: f64,
    ) -> GeoResult<&GeoBox> {
        if let ViewerState::BoxSet { bbox, .. } = &*self {
            if bbox.is_manual() {
                info!(
                    latlon = ?bbox.latlon().to_extent(),
                    "Keeping manual bounding box; pixel selection ignored"
                );
                return self.bbox();
            }
        }

        let reference = self.reference()?;
        let bbox = GeoBox::from_pixel_rect(
            reference.transformer(),
            reference.transform(),
            col1,
            row1,
            col2,
            row2,
        )?;
        self.install(bbox);
        self.bbox()
    }

    /// Drop the box, keeping the reference raster.
    pub fn clear_box(&mut self) {
        *self = match std::mem::take(self) {
            ViewerState::BoxSet { reference, .. } => {
                info!("Bounding box cleared");
                ViewerState::Configured { reference }
            }
            other => other,
        };
    }

    fn install(&mut self, bbox: GeoBox) {
        *self = match std::mem::take(self) {
            ViewerState::Configured { reference } | ViewerState::BoxSet { reference, .. } => {
                ViewerState::BoxSet { reference, bbox }
            }
            ViewerState::Uninitialized => ViewerState::Uninitialized,
        };
    }

    pub fn is_set(&self) -> bool {
        matches!(self, ViewerState::BoxSet { .. })
    }

    /// True when a reference is loaded but no box has been chosen, i.e. the
    /// interactive selection step still has to run.
    pub fn needs_selection(&self) -> bool {
        matches!(self, ViewerState::Configured { .. })
    }

    pub fn bbox(&self) -> GeoResult<&GeoBox> {
        match self {
            ViewerState::BoxSet { bbox, .. } => Ok(bbox),
            ViewerState::Configured { .. } => {
                Err(GeoError::configuration("no bounding box has been set"))
            }
            ViewerState::Uninitialized => Err(not_loaded()),
        }
    }

    pub fn reference(&self) -> GeoResult<&ReferenceRaster> {
        match self {
            ViewerState::Configured { reference } | ViewerState::BoxSet { reference, .. } => {
                Ok(reference)
            }
            ViewerState::Uninitialized => Err(not_loaded()),
        }
    }

    pub fn transformer(&self) -> GeoResult<&CoordinateTransformer> {
        Ok(self.reference()?.transformer())
    }

    /// Clip every year to the current box.
    ///
    /// Fails with `Configuration` when no box is set; otherwise the first
    /// per-year failure is returned.
    pub fn clip_all(
        &self,
        source: &dyn RasterSource,
        years: &[String],
        parallel: bool,
    ) -> GeoResult<BTreeMap<String, ClipResult>> {
        let bbox = self.bbox()?;
        let clipper = MultiYearClipper::new(source, bbox.crs_code());

        if parallel {
            clipper.clip_all_parallel(years, bbox.crs())
        } else {
            clipper.clip_all(years, bbox.crs())
        }
    }
}

fn not_loaded() -> GeoError {
    GeoError::configuration("no reference raster loaded; CRS and transform are unknown")
}
