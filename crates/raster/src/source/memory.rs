use std::collections::BTreeMap;

use geo_common::{GeoError, GeoResult};

use super::RasterSource;
use crate::types::RasterGrid;

/// Rasters held in memory, keyed by year.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rasters: BTreeMap<String, RasterGrid>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the raster for a year.
    pub fn insert(&mut self, year: impl Into<String>, raster: RasterGrid) {
        self.rasters.insert(year.into(), raster);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_raster(mut self, year: impl Into<String>, raster: RasterGrid) -> Self {
        self.insert(year, raster);
        self
    }

    /// Years currently held, sorted.
    pub fn years(&self) -> Vec<String> {
        self.rasters.keys().cloned().collect()
    }
}

impl RasterSource for MemorySource {
    fn load(&self, year: &str) -> GeoResult<RasterGrid> {
        self.rasters
            .get(year)
            .cloned()
            .ok_or_else(|| GeoError::raster_read(format!("no raster for year {year}")))
    }
}
