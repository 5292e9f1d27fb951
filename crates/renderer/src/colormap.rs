//! Colour maps for normalized `[0, 1]` values.

use std::fmt;
use std::str::FromStr;

use geo_common::GeoError;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Color value in RGB format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub fn to_rgb(self) -> Rgb<u8> {
        Rgb([self.r, self.g, self.b])
    }
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;
    let mix = |a: u8, b: u8| ((a as f32 * t_inv) + (b as f32 * t)).round() as u8;

    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
    )
}

// Matplotlib's viridis sampled at 1/8 steps
const VIRIDIS: [Color; 9] = [
    Color::new(68, 1, 84),
    Color::new(72, 40, 120),
    Color::new(62, 73, 137),
    Color::new(49, 104, 142),
    Color::new(38, 130, 142),
    Color::new(31, 158, 137),
    Color::new(53, 183, 121),
    Color::new(110, 206, 88),
    Color::new(253, 231, 37),
];

/// Named colour map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Colormap {
    /// Black to white.
    #[default]
    #[serde(rename = "gray")]
    Gray,
    /// White to black.
    #[serde(rename = "gray_r")]
    GrayReversed,
    #[serde(rename = "viridis")]
    Viridis,
}

impl Colormap {
    /// Colour for a normalized value; out-of-range input is clamped and
    /// NaN is treated as 0.
    pub fn color(&self, value: f32) -> Color {
        let t = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        match self {
            Colormap::Gray => interpolate_color(Color::BLACK, Color::WHITE, t),
            Colormap::GrayReversed => interpolate_color(Color::WHITE, Color::BLACK, t),
            Colormap::Viridis => sample_stops(&VIRIDIS, t),
        }
    }

    /// Colour a row-major grid of normalized values.
    pub fn apply(&self, values: &[f32], width: usize, height: usize) -> RgbImage {
        RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let idx = y as usize * width + x as usize;
            self.color(values.get(idx).copied().unwrap_or(0.0)).to_rgb()
        })
    }
}

fn sample_stops(stops: &[Color], t: f32) -> Color {
    let segments = (stops.len() - 1) as f32;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    interpolate_color(stops[i], stops[i + 1], pos - i as f32)
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Colormap::Gray => "gray",
            Colormap::GrayReversed => "gray_r",
            Colormap::Viridis => "viridis",
        };
        f.write_str(name)
    }
}

impl FromStr for Colormap {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gray" | "grey" | "greys_r" => Ok(Colormap::Gray),
            "gray_r" | "grey_r" | "greys" => Ok(Colormap::GrayReversed),
            "viridis" => Ok(Colormap::Viridis),
            other => Err(GeoError::invalid_parameter(
                "cmap",
                format!("unknown colour map '{other}' (expected gray, gray_r or viridis)"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_endpoints() {
        assert_eq!(Colormap::Gray.color(0.0), Color::BLACK);
        assert_eq!(Colormap::Gray.color(1.0), Color::WHITE);
        assert_eq!(Colormap::GrayReversed.color(0.0), Color::WHITE);
        assert_eq!(Colormap::Gray.color(0.5), Color::new(128, 128, 128));
    }

    #[test]
    fn test_clamps_and_nan() {
        assert_eq!(Colormap::Gray.color(-3.0), Color::BLACK);
        assert_eq!(Colormap::Gray.color(7.0), Color::WHITE);
        assert_eq!(Colormap::Gray.color(f32::NAN), Color::BLACK);
    }

    #[test]
    fn test_viridis_stops() {
        assert_eq!(Colormap::Viridis.color(0.0), VIRIDIS[0]);
        assert_eq!(Colormap::Viridis.color(0.5), VIRIDIS[4]);
        assert_eq!(Colormap::Viridis.color(1.0), VIRIDIS[8]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("grey".parse::<Colormap>().unwrap(), Colormap::Gray);
        assert_eq!("Viridis".parse::<Colormap>().unwrap(), Colormap::Viridis);
        assert_eq!(Colormap::GrayReversed.to_string(), "gray_r");
        assert!("jet".parse::<Colormap>().is_err());
    }

    #[test]
    fn test_apply() {
        let img = Colormap::Gray.apply(&[0.0, 1.0, 1.0, 0.0], 2, 2);
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(1, 0), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }
}
