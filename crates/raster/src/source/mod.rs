//! Raster sources: where each year's raster comes from.

mod geotiff;
mod memory;

pub use geotiff::{read_geotiff, write_geotiff, GeoTiffSource};
pub use memory::MemorySource;

use std::path::{Path, PathBuf};

use geo_common::{GeoError, GeoResult};

use crate::types::RasterGrid;

/// Loads the raster for a given year.
///
/// Implementations must be shareable across threads so that years can be
/// clipped in parallel.
pub trait RasterSource: Send + Sync {
    /// Load the raster for `year`, with missing data as NaN.
    fn load(&self, year: &str) -> GeoResult<RasterGrid>;
}

/// Path of a year's raster under the `<base>/<year>/<year>.tif` layout.
pub fn year_path(base: &Path, year: &str) -> PathBuf {
    base.join(year).join(format!("{year}.tif"))
}

/// List the year subdirectories of `base`, sorted by name.
pub fn discover_years(base: &Path) -> GeoResult<Vec<String>> {
    let entries = std::fs::read_dir(base).map_err(|e| {
        GeoError::configuration(format!("cannot list years in {}: {e}", base.display()))
    })?;

    let mut years = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                years.push(name.to_string());
            }
        }
    }

    years.sort();
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_path() {
        let path = year_path(Path::new("/data/lake"), "2021");
        assert_eq!(path, PathBuf::from("/data/lake/2021/2021.tif"));
    }

    #[test]
    fn test_discover_years_sorted_dirs_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["2021", "2019", "2020"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), b"not a year").unwrap();

        let years = discover_years(dir.path()).unwrap();
        assert_eq!(years, vec!["2019", "2020", "2021"]);
    }

    #[test]
    fn test_discover_years_missing_dir() {
        let err = discover_years(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, GeoError::Configuration(_)));
    }
}
