//! Multi-year bounding box viewer.
//!
//! Picks a bounding box on a reference raster (directly in lat/lon, or as a
//! pixel rectangle), applies it to every year of a `<base>/<year>/<year>.tif`
//! series, and writes a stacked, normalized comparison figure.

mod config;
mod pipeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use geo_common::GeoError;
use renderer::{Colormap, PanelTitles};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{split_list, LatLonBox, PixelRect, ViewerConfig};
use pipeline::RunOutcome;

#[derive(Parser, Debug)]
#[command(name = "bbox-viewer")]
#[command(about = "Apply one bounding box to a multi-year raster series")]
struct Args {
    /// Directory holding <year>/<year>.tif
    base_path: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, env = "BBOX_VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Years to compare, comma-separated (default: every year directory)
    #[arg(short, long)]
    years: Option<String>,

    /// Year to select on (default: first year)
    #[arg(long)]
    reference_year: Option<String>,

    /// Bounding box in degrees: lon_min,lon_max,lat_min,lat_max
    #[arg(long, allow_hyphen_values = true)]
    bbox: Option<LatLonBox>,

    /// Pixel rectangle on the reference raster: col1,row1,col2,row2
    #[arg(long)]
    pixel_rect: Option<PixelRect>,

    /// Write a normalized preview of the reference raster
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Figure output path (default: <base>/deposit/stacked_rasters.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not save the figure
    #[arg(long)]
    no_save: bool,

    /// Write each clipped year as a GeoTIFF under this directory
    #[arg(long)]
    export_clips: Option<PathBuf>,

    /// Clip years in parallel
    #[arg(long)]
    parallel: bool,

    /// Lower stretch percentile
    #[arg(long)]
    lower: Option<f64>,

    /// Upper stretch percentile
    #[arg(long)]
    upper: Option<f64>,

    /// Gamma applied after stretching
    #[arg(long)]
    gamma: Option<f64>,

    /// Colour map: gray, gray_r or viridis
    #[arg(long)]
    cmap: Option<Colormap>,

    /// Hide the colourbar
    #[arg(long)]
    no_colourbar: bool,

    /// Colourbar label
    #[arg(long)]
    colourbar_label: Option<String>,

    /// Panel title for a year, as YEAR=TITLE (repeatable)
    #[arg(long = "title", value_name = "YEAR=TITLE")]
    titles_by_year: Vec<String>,

    /// Panel titles in year order, comma-separated
    #[arg(long = "titles", conflicts_with = "titles_by_year")]
    titles_positional: Option<String>,

    /// Log level
    #[arg(long, env = "BBOX_VIEWER_LOG", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Overlay command-line flags on a loaded configuration.
    fn apply(self, config: &mut ViewerConfig) -> Result<()> {
        if let Some(base) = self.base_path {
            config.base_path = base;
        }
        if let Some(years) = self.years {
            config.years = split_list(&years);
        }
        if self.reference_year.is_some() {
            config.reference_year = self.reference_year;
        }
        if self.bbox.is_some() {
            config.bbox = self.bbox;
        }
        if self.pixel_rect.is_some() {
            config.pixel_rect = self.pixel_rect;
        }
        if self.preview.is_some() {
            config.preview = self.preview;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if self.no_save {
            config.save = false;
        }
        if self.export_clips.is_some() {
            config.export_clips = self.export_clips;
        }
        if self.parallel {
            config.parallel = true;
        }

        let figure = &mut config.figure;
        if let Some(lower) = self.lower {
            figure.stretch.low_percentile = lower;
        }
        if let Some(upper) = self.upper {
            figure.stretch.high_percentile = upper;
        }
        if let Some(gamma) = self.gamma {
            figure.stretch.gamma = gamma;
        }
        if let Some(cmap) = self.cmap {
            figure.colormap = cmap;
        }
        if self.no_colourbar {
            figure.colourbar.enabled = false;
        }
        if let Some(label) = self.colourbar_label {
            figure.colourbar.label = label;
        }

        if !self.titles_by_year.is_empty() {
            let mut map = std::collections::BTreeMap::new();
            for entry in &self.titles_by_year {
                let Some((year, title)) = entry.split_once('=') else {
                    anyhow::bail!("--title expects YEAR=TITLE, got '{entry}'");
                };
                map.insert(year.trim().to_string(), title.to_string());
            }
            figure.titles = PanelTitles::ByYear(map);
        } else if let Some(titles) = self.titles_positional {
            figure.titles = PanelTitles::Positional(
                titles.split(',').map(|t| t.trim().to_string()).collect(),
            );
        }

        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);
    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!("Starting bbox viewer");

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_env()?;
    args.apply(&mut config)?;

    info!(
        base_path = %config.base_path.display(),
        years = ?config.years,
        parallel = config.parallel,
        "Loaded configuration"
    );

    let outcome = pipeline::run(&config).inspect_err(|e| {
        let kind = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<GeoError>())
            .map_or("other", GeoError::kind);
        error!(kind, error = %e, "Run failed");
    })?;

    match outcome {
        RunOutcome::AwaitingSelection { preview } => {
            info!(preview = %preview.display(), "Waiting for a pixel selection");
        }
        RunOutcome::Completed(summary) => {
            info!(
                years = ?summary.years,
                latlon = ?summary.latlon.to_extent(),
                crs_box = ?summary.crs_box.to_extent(),
                crs = %summary.crs,
                panels = summary.clips.len(),
                exported = summary.exported.len(),
                figure = ?summary.figure,
                "Done"
            );
        }
    }

    Ok(())
}
