//! Viewer configuration.
//!
//! Layered lowest to highest: built-in defaults, an optional YAML file,
//! `BBOX_VIEWER_*` environment variables, then command-line flags.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use geo_common::{GeoError, GeoResult};
use renderer::{default_output_path, FigureOptions, PanelTitles};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ENV_PREFIX: &str = "BBOX_VIEWER_";

/// A lat/lon box in degrees, `lon_min,lon_max,lat_min,lat_max` on the
/// command line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl FromStr for LatLonBox {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [lon_min, lon_max, lat_min, lat_max] = parse_four("bbox", s)?;
        Ok(Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        })
    }
}

impl fmt::Display for LatLonBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

/// Two pixel corners on the reference raster, `col1,row1,col2,row2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub col1: f64,
    pub row1: f64,
    pub col2: f64,
    pub row2: f64,
}

impl FromStr for PixelRect {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [col1, row1, col2, row2] = parse_four("pixel_rect", s)?;
        Ok(Self {
            col1,
            row1,
            col2,
            row2,
        })
    }
}

fn parse_four(param: &str, s: &str) -> GeoResult<[f64; 4]> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(GeoError::invalid_parameter(
            param,
            format!("expected 4 comma-separated numbers, got '{s}'"),
        ));
    }

    let mut out = [0.0; 4];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| GeoError::invalid_parameter(param, format!("'{part}' is not a number")))?;
    }
    Ok(out)
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Root of the `<year>/<year>.tif` tree.
    pub base_path: PathBuf,
    /// Years to compare; empty means every year directory under `base_path`.
    pub years: Vec<String>,
    /// Year the selection is made on; defaults to the first year.
    pub reference_year: Option<String>,
    /// Box given directly in lat/lon.
    pub bbox: Option<LatLonBox>,
    /// Box picked as a pixel rectangle on the reference raster.
    pub pixel_rect: Option<PixelRect>,
    /// Figure path; defaults to `<base_path>/deposit/stacked_rasters.png`.
    pub output: Option<PathBuf>,
    pub save: bool,
    /// Write a normalized preview of the reference raster here.
    pub preview: Option<PathBuf>,
    /// Write each clipped year as `<dir>/<year>/<year>.tif`.
    pub export_clips: Option<PathBuf>,
    /// Clip years on the rayon pool.
    pub parallel: bool,
    pub figure: FigureOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::new(),
            years: Vec::new(),
            reference_year: None,
            bbox: None,
            pixel_rect: None,
            output: None,
            save: true,
            preview: None,
            export_clips: None,
            parallel: false,
            figure: FigureOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ViewerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded viewer config");
        Ok(config)
    }

    /// Apply `BBOX_VIEWER_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("BASE_PATH") {
            self.base_path = PathBuf::from(v);
        }
        if let Some(v) = var("YEARS") {
            self.years = split_list(&v);
        }
        if let Some(v) = var("REFERENCE_YEAR") {
            self.reference_year = Some(v);
        }
        if let Some(v) = var("BBOX") {
            self.bbox = Some(v.parse().context("Invalid BBOX_VIEWER_BBOX")?);
        }
        if let Some(v) = var("PIXEL_RECT") {
            self.pixel_rect = Some(v.parse().context("Invalid BBOX_VIEWER_PIXEL_RECT")?);
        }
        if let Some(v) = var("OUTPUT") {
            self.output = Some(PathBuf::from(v));
        }
        if let Some(v) = var("SAVE") {
            self.save = parse_bool(&v).context("Invalid BBOX_VIEWER_SAVE")?;
        }
        if let Some(v) = var("PARALLEL") {
            self.parallel = parse_bool(&v).context("Invalid BBOX_VIEWER_PARALLEL")?;
        }
        if let Some(v) = var("CMAP") {
            self.figure.colormap = v.parse().context("Invalid BBOX_VIEWER_CMAP")?;
        }
        if let Some(v) = var("LOWER_PERCENTILE") {
            self.figure.stretch.low_percentile =
                v.parse().context("Invalid BBOX_VIEWER_LOWER_PERCENTILE")?;
        }
        if let Some(v) = var("UPPER_PERCENTILE") {
            self.figure.stretch.high_percentile =
                v.parse().context("Invalid BBOX_VIEWER_UPPER_PERCENTILE")?;
        }
        if let Some(v) = var("COLOURBAR") {
            self.figure.colourbar.enabled =
                parse_bool(&v).context("Invalid BBOX_VIEWER_COLOURBAR")?;
        }
        Ok(())
    }

    /// Where the figure goes when saving.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output_path(&self.base_path))
    }

    /// Check the settings that can be checked before touching any raster.
    pub fn validate(&self) -> GeoResult<()> {
        if self.base_path.as_os_str().is_empty() {
            return Err(GeoError::configuration("base_path is not set"));
        }

        let mut seen = std::collections::BTreeSet::new();
        for year in &self.years {
            if !seen.insert(year) {
                return Err(GeoError::configuration(format!("year {year} listed twice")));
            }
        }

        if let Some(reference) = &self.reference_year {
            if !self.years.is_empty() && !self.years.contains(reference) {
                return Err(GeoError::configuration(format!(
                    "reference year {reference} is not among the selected years"
                )));
            }
        }

        if let PanelTitles::Positional(titles) = &self.figure.titles {
            if !self.years.is_empty() && titles.len() != self.years.len() {
                return Err(GeoError::invalid_parameter(
                    "titles",
                    format!("{} titles given for {} years", titles.len(), self.years.len()),
                ));
            }
        }

        if self.figure.tick_count == 0 {
            return Err(GeoError::invalid_parameter("tick_count", "must be at least 1"));
        }

        self.figure.stretch.validate()
    }
}

/// Split a comma-separated list, dropping empty entries.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(s: &str) -> GeoResult<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GeoError::invalid_parameter(
            "bool",
            format!("'{other}' is not a boolean"),
        )),
    }
}
