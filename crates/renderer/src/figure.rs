//! Stacked multi-year figure.
//!
//! Panels are stacked top to bottom in year order on a white canvas. Each
//! panel is stretched on its own, so years with different brightness stay
//! comparable by structure rather than absolute value. An optional colourbar
//! strip on the right shows the colour map from 0 (bottom) to 1 (top).
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  ┌──────────────────┐  ┌──┐  │
//! │  │ 2019             │  │  │  │
//! │  └──────────────────┘  │  │  │
//! │  ┌────────────┐        │  │  │
//! │  │ 2020       │ (pad)  │  │  │
//! │  └────────────┘        └──┘  │
//! └──────────────────────────────┘
//! ```
//!
//! Text (titles, tick labels, colourbar label) is not drawn into the image;
//! it goes into a JSON sidecar next to the PNG.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use geo_common::{GeoError, GeoResult};
use image::{ImageFormat, RgbImage};
use projection::CoordinateTransformer;
use raster::{ClipResult, RasterGrid};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::colormap::{Color, Colormap};
use crate::stretch::{apply_range, stretch, stretch_range, StretchParams};
use crate::ticks::{latlon_ticks, LatLonTicks};
use crate::titles::PanelTitles;

/// Colourbar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColourbarConfig {
    pub enabled: bool,
    pub label: String,
}

impl Default for ColourbarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            label: "Normalised reflectance".to_string(),
        }
    }
}

impl ColourbarConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Tick values along the bar: 0, 0.2, ..., 1.0.
    pub fn ticks() -> Vec<f64> {
        (0..=5).map(|i| i as f64 / 5.0).collect()
    }
}

/// Layout and styling of the stacked figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureOptions {
    pub stretch: StretchParams,
    pub colormap: Colormap,
    pub titles: PanelTitles,
    pub colourbar: ColourbarConfig,
    /// Lat/lon ticks per axis.
    pub tick_count: usize,
    /// Pixels between panels and around the canvas edge.
    pub gap: u32,
    /// Width of the colourbar strip.
    pub colourbar_width: u32,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            stretch: StretchParams::default(),
            colormap: Colormap::default(),
            titles: PanelTitles::default(),
            colourbar: ColourbarConfig::default(),
            tick_count: 5,
            gap: 16,
            colourbar_width: 24,
        }
    }
}

/// Where a panel sits in the figure and what it shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelMetadata {
    pub year: String,
    pub title: String,
    /// Realized extent `(x_min, x_max, y_min, y_max)` in the native CRS.
    pub extent: (f64, f64, f64, f64),
    /// `(x, y, width, height)` of the panel in figure pixels.
    pub placement: (u32, u32, u32, u32),
    /// Values mapped to 0 and 1 by the stretch.
    pub stretch_range: (f64, f64),
    pub nodata_count: usize,
    pub ticks: LatLonTicks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColourbarMetadata {
    pub label: String,
    pub ticks: Vec<f64>,
    /// `(x, y, width, height)` of the strip in figure pixels.
    pub placement: (u32, u32, u32, u32),
}

/// Everything about the figure that is not pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureMetadata {
    pub crs: String,
    pub colormap: Colormap,
    pub stretch: StretchParams,
    pub panels: Vec<PanelMetadata>,
    pub colourbar: Option<ColourbarMetadata>,
}

/// A composed figure, ready to save.
#[derive(Debug, Clone)]
pub struct StackedFigure {
    pub image: RgbImage,
    pub metadata: FigureMetadata,
}

impl StackedFigure {
    /// Stack the clipped years into one image, top to bottom in the order
    /// of `years`. Positional titles are matched against that order too.
    pub fn compose(
        years: &[String],
        clips: &BTreeMap<String, ClipResult>,
        transformer: &CoordinateTransformer,
        options: &FigureOptions,
    ) -> GeoResult<Self> {
        if years.is_empty() {
            return Err(GeoError::invalid_parameter("clips", "nothing to draw"));
        }
        options.stretch.validate()?;

        let ordered = years
            .iter()
            .map(|year| {
                clips.get(year).map(|clip| (year, clip)).ok_or_else(|| {
                    GeoError::invalid_parameter("years", format!("no clip for year {year}"))
                })
            })
            .collect::<GeoResult<Vec<_>>>()?;
        let titles = options.titles.resolve(years)?;

        let gap = options.gap;
        let max_width = ordered.iter().map(|(_, c)| c.width as u32).max().unwrap_or(0);
        let total_height = ordered.iter().map(|(_, c)| c.height as u32).sum::<u32>()
            + gap * (ordered.len() as u32 - 1);

        let bar_extra = if options.colourbar.enabled {
            gap + options.colourbar_width
        } else {
            0
        };
        let canvas_width = gap + max_width + bar_extra + gap;
        let canvas_height = gap + total_height + gap;

        let mut image = RgbImage::from_pixel(canvas_width, canvas_height, Color::WHITE.to_rgb());
        let mut panels = Vec::with_capacity(ordered.len());
        let mut y = gap;

        for ((year, clip), title) in ordered.into_iter().zip(titles) {
            let (low, high) = stretch_range(&clip.data, &options.stretch)?;
            let normalized = apply_range(&clip.data, low, high, options.stretch.gamma);
            let tile = options.colormap.apply(&normalized, clip.width, clip.height);
            blit(&mut image, &tile, gap, y);

            let ticks = latlon_ticks(transformer, clip.extent, options.tick_count)?;
            let placement = (gap, y, clip.width as u32, clip.height as u32);
            debug!(year = %year, ?placement, low, high, "Placed panel");

            panels.push(PanelMetadata {
                year: year.clone(),
                title,
                extent: clip.extent,
                placement,
                stretch_range: (low, high),
                nodata_count: clip.nodata_count,
                ticks,
            });
            y += clip.height as u32 + gap;
        }

        let colourbar = if options.colourbar.enabled {
            let placement = (gap + max_width + gap, gap, options.colourbar_width, total_height);
            draw_colourbar(&mut image, options.colormap, placement);
            Some(ColourbarMetadata {
                label: options.colourbar.label.clone(),
                ticks: ColourbarConfig::ticks(),
                placement,
            })
        } else {
            None
        };

        info!(
            panels = panels.len(),
            width = canvas_width,
            height = canvas_height,
            colourbar = options.colourbar.enabled,
            "Composed stacked figure"
        );

        Ok(Self {
            image,
            metadata: FigureMetadata {
                crs: transformer.crs().to_string(),
                colormap: options.colormap,
                stretch: options.stretch,
                panels,
                colourbar,
            },
        })
    }

    /// Write the PNG and its `<path>.json` sidecar, creating parent
    /// directories. Returns the sidecar path.
    pub fn save(&self, path: &Path) -> GeoResult<PathBuf> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| GeoError::Render(format!("{}: {e}", path.display())))?;

        let sidecar = sidecar_path(path);
        let json = serde_json::to_string_pretty(&self.metadata)
            .map_err(|e| GeoError::Render(format!("figure metadata: {e}")))?;
        std::fs::write(&sidecar, json)?;

        info!(path = %path.display(), sidecar = %sidecar.display(), "Saved figure");
        Ok(sidecar)
    }
}

/// `<path>.json`, e.g. `stacked_rasters.png.json`.
pub fn sidecar_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".json");
    PathBuf::from(name)
}

/// Default figure location for a raster series rooted at `base`.
pub fn default_output_path(base: &Path) -> PathBuf {
    base.join("deposit").join("stacked_rasters.png")
}

/// Normalized, colour-mapped rendering of a single raster, for picking a
/// pixel rectangle in an external viewer. Pixel `(x, y)` of the image is
/// pixel `(col, row)` of the raster.
pub fn preview_image(
    raster: &RasterGrid,
    params: &StretchParams,
    colormap: Colormap,
) -> GeoResult<RgbImage> {
    let normalized = stretch(&raster.data, params)?;
    Ok(colormap.apply(&normalized, raster.width, raster.height))
}

/// Write [`preview_image`] as a PNG.
pub fn save_preview(
    raster: &RasterGrid,
    params: &StretchParams,
    colormap: Colormap,
    path: &Path,
) -> GeoResult<()> {
    let image = preview_image(raster, params, colormap)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| GeoError::Render(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), "Saved selection preview");
    Ok(())
}

fn blit(canvas: &mut RgbImage, tile: &RgbImage, x0: u32, y0: u32) {
    for (x, y, pixel) in tile.enumerate_pixels() {
        canvas.put_pixel(x0 + x, y0 + y, *pixel);
    }
}

fn draw_colourbar(canvas: &mut RgbImage, colormap: Colormap, placement: (u32, u32, u32, u32)) {
    let (x0, y0, width, height) = placement;
    if width == 0 || height == 0 {
        return;
    }
    let span = (height - 1).max(1) as f32;

    for dy in 0..height {
        // Top row is 1, bottom row is 0
        let value = 1.0 - dy as f32 / span;
        let color = colormap.color(value).to_rgb();
        for dx in 0..width {
            canvas.put_pixel(x0 + dx, y0 + dy, color);
        }
    }

    // Tick marks: a black notch on the outer edge
    let notch = (width / 4).max(1);
    for tick in ColourbarConfig::ticks() {
        let dy = (((1.0 - tick) * span as f64).round() as u32).min(height - 1);
        for dx in width - notch..width {
            canvas.put_pixel(x0 + dx, y0 + dy, Color::BLACK.to_rgb());
        }
    }
}
