//! Rendering for multi-year raster comparisons.
//!
//! - Percentile stretch to `[0, 1]` with optional gamma
//! - Colour maps
//! - Lat/lon tick labels for native-CRS panels
//! - Stacked PNG figure with colourbar and a JSON sidecar

pub mod colormap;
pub mod figure;
pub mod stretch;
pub mod ticks;
pub mod titles;

pub use colormap::{Color, Colormap};
pub use figure::{
    default_output_path, preview_image, save_preview, ColourbarConfig, FigureMetadata,
    FigureOptions, StackedFigure,
};
pub use stretch::{percentile, stretch, StretchParams};
pub use ticks::{latlon_ticks, LatLonTicks};
pub use titles::PanelTitles;
