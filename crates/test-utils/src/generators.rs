//! Synthetic raster data generators.
//!
//! All generators return row-major `Vec<f32>` buffers (row 0 first), so they
//! can be fed straight into a raster constructor.

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// This makes it easy to verify that a clipped window came from the right
/// place by checking that grid[row][col] == col * 1000 + row.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[0], 0.0);   // col=0, row=0 -> 0*1000 + 0
/// assert_eq!(grid[1], 1000.0); // col=1, row=0 -> 1*1000 + 0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1 -> 0*1000 + 1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// Creates a grid whose values step evenly from `start` to `end` in
/// row-major order.
///
/// A 101-cell ramp from 0 to 100 has one cell per integer, which makes
/// percentile arithmetic easy to check by hand.
pub fn create_ramp_grid(width: usize, height: usize, start: f32, end: f32) -> Vec<f32> {
    let n = width * height;
    if n <= 1 {
        return vec![start; n];
    }
    let step = (end - start) / (n - 1) as f32;
    (0..n).map(|i| start + step * i as f32).collect()
}

/// Creates a grid filled with a single value.
pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Creates a reflectance-like grid in `[0, 0.4]`.
///
/// Low values along the left edge ("water") grow towards bright land on
/// the right, with a gentle row-wise ripple.
pub fn create_reflectance_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f32 / width.max(1) as f32;
            let ripple = ((row as f32) * 0.3).sin() * 0.02;
            data.push((0.02 + x * 0.35 + ripple).clamp(0.0, 0.4));
        }
    }
    data
}

/// Replaces every `stride`-th cell with NaN and returns how many were masked.
///
/// A `stride` of 0 masks nothing.
pub fn punch_nodata(data: &mut [f32], stride: usize) -> usize {
    if stride == 0 {
        return 0;
    }
    let mut count = 0;
    for v in data.iter_mut().step_by(stride) {
        *v = f32::NAN;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(3, 2);
        assert_eq!(grid, vec![0.0, 1000.0, 2000.0, 1.0, 1001.0, 2001.0]);
    }

    #[test]
    fn test_ramp_grid_endpoints() {
        let grid = create_ramp_grid(101, 1, 0.0, 100.0);
        assert_eq!(grid.len(), 101);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[50], 50.0);
        assert_eq!(grid[100], 100.0);
    }

    #[test]
    fn test_ramp_grid_single_cell() {
        assert_eq!(create_ramp_grid(1, 1, 3.0, 9.0), vec![3.0]);
        assert!(create_ramp_grid(0, 4, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_reflectance_range() {
        let grid = create_reflectance_grid(50, 20);
        assert!(grid.iter().all(|v| (0.0..=0.4).contains(v)));
    }

    #[test]
    fn test_punch_nodata() {
        let mut grid = create_constant_grid(4, 4, 1.0);
        let masked = punch_nodata(&mut grid, 5);
        assert_eq!(masked, 4); // indices 0, 5, 10, 15
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 4);
        assert_eq!(punch_nodata(&mut grid, 0), 0);
    }
}
