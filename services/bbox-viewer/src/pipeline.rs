//! One end-to-end run: reference raster, box, clips, figure.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use geo_common::BoundingBox;
use raster::{discover_years, write_geotiff, year_path, ClipResult, GeoTiffSource, RasterSource};
use renderer::{save_preview, StackedFigure, StretchParams};
use selection::{ReferenceRaster, ViewerState};
use tracing::{info, warn};

use crate::config::ViewerConfig;

/// What a run produced.
#[derive(Debug)]
pub enum RunOutcome {
    /// A preview was written and no box was given; pick a pixel rectangle on
    /// the preview and run again.
    AwaitingSelection { preview: PathBuf },
    Completed(RunSummary),
}

#[derive(Debug)]
pub struct RunSummary {
    pub years: Vec<String>,
    pub latlon: BoundingBox,
    pub crs_box: BoundingBox,
    pub crs: String,
    pub clips: BTreeMap<String, ClipResult>,
    pub figure: Option<PathBuf>,
    pub exported: Vec<PathBuf>,
}

/// Run against the GeoTIFF tree at `config.base_path`.
pub fn run(config: &ViewerConfig) -> Result<RunOutcome> {
    let source = GeoTiffSource::new(&config.base_path);
    let years = if config.years.is_empty() {
        discover_years(&config.base_path)?
    } else {
        config.years.clone()
    };
    run_with_source(config, &source, years)
}

/// Run against any raster source with an explicit year list.
pub fn run_with_source(
    config: &ViewerConfig,
    source: &dyn RasterSource,
    years: Vec<String>,
) -> Result<RunOutcome> {
    config.validate()?;

    let reference_year = match (&config.reference_year, years.first()) {
        (Some(year), _) => year.clone(),
        (None, Some(first)) => first.clone(),
        (None, None) => bail!("no years found under {}", config.base_path.display()),
    };

    let mut state = ViewerState::new();
    let reference = ReferenceRaster::from_source(source, &reference_year)
        .with_context(|| format!("Failed to load reference year {reference_year}"))?;
    state.load(reference);

    if let Some(b) = &config.bbox {
        state.set_from_latlon(b.lon_min, b.lon_max, b.lat_min, b.lat_max)?;
    }

    if let Some(path) = &config.preview {
        let reference = state.reference()?;
        save_preview(
            reference.raster(),
            &StretchParams::preview(),
            config.figure.colormap,
            path,
        )
        .context("Failed to write selection preview")?;
    }

    if let Some(r) = &config.pixel_rect {
        state.set_from_pixel_rect(r.col1, r.row1, r.col2, r.row2)?;
    }

    if state.needs_selection() {
        if let Some(preview) = &config.preview {
            info!(
                preview = %preview.display(),
                "No bounding box given; pick a pixel rectangle on the preview and pass --pixel-rect"
            );
            return Ok(RunOutcome::AwaitingSelection {
                preview: preview.clone(),
            });
        }
        bail!("no bounding box: pass --bbox or --pixel-rect (use --preview to pick one)");
    }

    let bbox = state.bbox()?.clone();
    info!(
        latlon = ?bbox.latlon().to_extent(),
        crs_box = ?bbox.crs().to_extent(),
        crs = %bbox.crs_code(),
        origin = ?bbox.origin(),
        pixels = ?state.reference()?.pixel_window(bbox.crs()),
        "Bounding box"
    );
    if bbox.is_degenerate() {
        warn!("Selected box has zero area");
    }

    let clips = state
        .clip_all(source, &years, config.parallel)
        .context("Failed to clip rasters")?;

    for (year, clip) in &clips {
        info!(
            year = %year,
            width = clip.width,
            height = clip.height,
            extent = ?clip.extent,
            nodata = clip.nodata_count,
            "Clipped"
        );
    }

    let mut exported = Vec::new();
    if let Some(dir) = &config.export_clips {
        for (year, clip) in &clips {
            let path = year_path(dir, year);
            write_geotiff(&path, &clip.to_raster(bbox.crs_code())?)
                .with_context(|| format!("Failed to export clip for {year}"))?;
            exported.push(path);
        }
        info!(dir = %dir.display(), count = exported.len(), "Exported clips");
    }

    let transformer = state.transformer()?;
    let figure = StackedFigure::compose(&years, &clips, transformer, &config.figure)
        .context("Failed to compose figure")?;

    let figure_path = if config.save {
        let path = config.output_path();
        figure.save(&path).context("Failed to save figure")?;
        Some(path)
    } else {
        info!("Figure not saved");
        None
    };

    Ok(RunOutcome::Completed(RunSummary {
        years,
        latlon: *bbox.latlon(),
        crs_box: *bbox.crs(),
        crs: bbox.crs_code().to_string(),
        clips,
        figure: figure_path,
        exported,
    }))
}
