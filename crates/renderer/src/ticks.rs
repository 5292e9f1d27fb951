//! Lat/lon tick labels for native-CRS axes.

use geo_common::{GeoError, GeoResult};
use projection::CoordinateTransformer;
use serde::{Deserialize, Serialize};

/// Tick positions in native coordinates with lat/lon labels.
///
/// Ticks are paired by index: the i-th x tick and the i-th y tick are
/// converted together, so each label is the coordinate of a point on the
/// panel's diagonal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLonTicks {
    pub x_positions: Vec<f64>,
    pub y_positions: Vec<f64>,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Ticks for a panel whose extent is `(x_min, x_max, y_min, y_max)`.
pub fn latlon_ticks(
    transformer: &CoordinateTransformer,
    extent: (f64, f64, f64, f64),
    count: usize,
) -> GeoResult<LatLonTicks> {
    if count == 0 {
        return Err(GeoError::invalid_parameter("tick_count", "must be at least 1"));
    }

    let (x_min, x_max, y_min, y_max) = extent;
    let x_positions = linspace(x_min, x_max, count);
    let y_positions = linspace(y_min, y_max, count);
    let (lons, lats) = transformer.to_latlon_many(&x_positions, &y_positions)?;

    Ok(LatLonTicks {
        x_labels: lons.iter().map(|lon| format!("{lon:.2}°E")).collect(),
        y_labels: lats.iter().map(|lat| format!("{lat:.2}°N")).collect(),
        x_positions,
        y_positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_common::CrsCode;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_wgs84_labels() {
        let t = CoordinateTransformer::new(CrsCode::WGS84).unwrap();
        let ticks = latlon_ticks(&t, (10.0, 11.0, 45.0, 46.0), 5).unwrap();
        assert_eq!(ticks.x_labels[0], "10.00°E");
        assert_eq!(ticks.x_labels[1], "10.25°E");
        assert_eq!(ticks.y_labels[4], "46.00°N");
        assert_eq!(ticks.x_positions.len(), 5);
    }

    #[test]
    fn test_utm_central_meridian() {
        let t = CoordinateTransformer::new(CrsCode::new(32633)).unwrap();
        let ticks = latlon_ticks(&t, (500000.0, 501000.0, 3999500.0, 4000000.0), 3).unwrap();
        assert_eq!(ticks.x_labels[0], "15.00°E");
        assert!(ticks.y_labels.iter().all(|l| l.starts_with("36.")));
    }

    #[test]
    fn test_zero_count() {
        let t = CoordinateTransformer::new(CrsCode::WGS84).unwrap();
        assert!(latlon_ticks(&t, (0.0, 1.0, 0.0, 1.0), 0).is_err());
    }
}
