//! Percentile contrast stretch.

use geo_common::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parameters of the percentile stretch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StretchParams {
    /// Percentile mapped to 0.
    pub low_percentile: f64,
    /// Percentile mapped to 1.
    pub high_percentile: f64,
    /// Exponent applied after rescaling.
    pub gamma: f64,
}

impl Default for StretchParams {
    fn default() -> Self {
        Self {
            low_percentile: 2.0,
            high_percentile: 98.0,
            gamma: 1.0,
        }
    }
}

impl StretchParams {
    pub fn new(low_percentile: f64, high_percentile: f64) -> Self {
        Self {
            low_percentile,
            high_percentile,
            ..Self::default()
        }
    }

    /// Slightly brightened stretch used for the selection preview.
    pub fn preview() -> Self {
        Self {
            gamma: 0.8,
            ..Self::default()
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn validate(&self) -> GeoResult<()> {
        check_percentile("low_percentile", self.low_percentile)?;
        check_percentile("high_percentile", self.high_percentile)?;
        if self.low_percentile >= self.high_percentile {
            return Err(GeoError::invalid_parameter(
                "percentiles",
                format!(
                    "low ({}) must be below high ({})",
                    self.low_percentile, self.high_percentile
                ),
            ));
        }
        if !(self.gamma.is_finite() && self.gamma > 0.0) {
            return Err(GeoError::invalid_parameter(
                "gamma",
                format!("must be positive, got {}", self.gamma),
            ));
        }
        Ok(())
    }
}

fn check_percentile(param: &str, p: f64) -> GeoResult<()> {
    if !(0.0..=100.0).contains(&p) {
        return Err(GeoError::invalid_parameter(
            param,
            format!("{p} is outside 0..=100"),
        ));
    }
    Ok(())
}

/// The `p`-th percentile of the finite values, interpolating linearly
/// between the two closest ranks.
pub fn percentile(values: &[f32], p: f64) -> GeoResult<f64> {
    check_percentile("percentile", p)?;
    let sorted = sorted_finite(values);
    if sorted.is_empty() {
        return Err(GeoError::DegenerateRange {
            low: f64::NAN,
            high: f64::NAN,
        });
    }
    Ok(interpolate(&sorted, p))
}

fn sorted_finite(values: &[f32]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| v as f64)
        .collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64 / 100.0;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Low and high stretch bounds for `data`.
///
/// Fails with `DegenerateRange` if the bounds coincide or there is no finite
/// sample to take them from.
pub fn stretch_range(data: &[f32], params: &StretchParams) -> GeoResult<(f64, f64)> {
    params.validate()?;

    let sorted = sorted_finite(data);
    if sorted.is_empty() {
        return Err(GeoError::DegenerateRange {
            low: f64::NAN,
            high: f64::NAN,
        });
    }

    let low = interpolate(&sorted, params.low_percentile);
    let high = interpolate(&sorted, params.high_percentile);
    if high <= low {
        return Err(GeoError::DegenerateRange { low, high });
    }
    Ok((low, high))
}

/// Rescale `data` so the low/high percentiles land on 0 and 1, clamp, and
/// apply gamma. Non-finite samples become 0.
pub fn stretch(data: &[f32], params: &StretchParams) -> GeoResult<Vec<f32>> {
    let (low, high) = stretch_range(data, params)?;
    Ok(apply_range(data, low, high, params.gamma))
}

/// The rescale step of [`stretch`] with precomputed bounds.
pub fn apply_range(data: &[f32], low: f64, high: f64, gamma: f64) -> Vec<f32> {
    let span = high - low;
    debug!(low, high, gamma, samples = data.len(), "Stretching");

    data.iter()
        .map(|&v| {
            if !v.is_finite() {
                return 0.0;
            }
            let t = ((v as f64 - low) / span).clamp(0.0, 1.0);
            if gamma == 1.0 {
                t as f32
            } else {
                t.powf(gamma) as f32
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Vec<f32> {
        (0..=100).map(|v| v as f32).collect()
    }

    #[test]
    fn test_percentile_ramp() {
        let data = ramp();
        assert_eq!(percentile(&data, 0.0).unwrap(), 0.0);
        assert_eq!(percentile(&data, 2.0).unwrap(), 2.0);
        assert_eq!(percentile(&data, 98.0).unwrap(), 98.0);
        assert_eq!(percentile(&data, 100.0).unwrap(), 100.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0];
        // rank = 0.5 * 3 = 1.5
        assert!((percentile(&data, 50.0).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_ignores_non_finite() {
        let data = [f32::NAN, 1.0, f32::INFINITY, 3.0];
        assert_eq!(percentile(&data, 100.0).unwrap(), 3.0);
        assert!(matches!(
            percentile(&[f32::NAN], 50.0),
            Err(GeoError::DegenerateRange { .. })
        ));
    }

    #[test]
    fn test_percentile_out_of_range() {
        assert!(matches!(
            percentile(&ramp(), 101.0),
            Err(GeoError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_stretch_ramp() {
        let out = stretch(&ramp(), &StretchParams::default()).unwrap();
        assert_eq!(out[0], 0.0);
        assert_eq!(out[2], 0.0);
        assert_eq!(out[50], 0.5);
        assert_eq!(out[98], 1.0);
        assert_eq!(out[100], 1.0);
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_stretch_gamma() {
        let params = StretchParams::default().with_gamma(0.5);
        let out = stretch(&ramp(), &params).unwrap();
        // (26 - 2) / 96 = 0.25, sqrt = 0.5
        assert!((out[26] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_stretch_constant_is_degenerate() {
        let err = stretch(&[0.3; 50], &StretchParams::default()).unwrap_err();
        assert!(matches!(err, GeoError::DegenerateRange { low, high } if low == high));
    }

    #[test]
    fn test_stretch_nan_maps_to_zero() {
        let mut data = ramp();
        data[60] = f32::NAN;
        let out = stretch(&data, &StretchParams::default()).unwrap();
        assert_eq!(out[60], 0.0);
    }

    #[test]
    fn test_invalid_params() {
        assert!(StretchParams::new(98.0, 2.0).validate().is_err());
        assert!(StretchParams::new(-1.0, 50.0).validate().is_err());
        assert!(StretchParams::default().with_gamma(0.0).validate().is_err());
        assert!(StretchParams::preview().validate().is_ok());
    }
}
