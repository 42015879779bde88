//! Pixel grid generators.
//!
//! Every grid is row-major, `width` columns by `height` rows, row 0 first.

/// Grid whose value encodes its position: `col * 1000 + row`.
///
/// Crops and resamples can be checked by decoding the value back into the
/// source pixel it came from.
///
/// ```
/// let grid = test_utils::create_test_grid(4, 3);
/// assert_eq!(grid[2 * 4 + 1], 1002.0);
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

pub fn create_constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Grid ramping along columns: `a * col + b`.
///
/// Bilinear interpolation reproduces it exactly.
pub fn create_column_ramp(width: usize, height: usize, a: f32, b: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(a * col as f32 + b);
        }
    }
    data
}

/// [`create_test_grid`] with NaN over the half-open patch
/// `(col0, row0, col1, row1)`.
pub fn create_grid_with_nan_patch(
    width: usize,
    height: usize,
    patch: (usize, usize, usize, usize),
) -> Vec<f32> {
    let (col0, row0, col1, row1) = patch;
    let mut data = create_test_grid(width, height);
    for row in row0..row1.min(height) {
        for col in col0..col1.min(width) {
            data[row * width + col] = f32::NAN;
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid_values() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[3 * 10 + 4], 4003.0);
    }

    #[test]
    fn test_column_ramp() {
        let grid = create_column_ramp(4, 2, 2.0, 1.0);
        assert_eq!(grid, vec![1.0, 3.0, 5.0, 7.0, 1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_nan_patch() {
        let grid = create_grid_with_nan_patch(4, 4, (1, 1, 3, 3));
        assert!(grid[5].is_nan());
        assert!(grid[10].is_nan());
        assert!(!grid[0].is_nan());
        assert_eq!(grid.iter().filter(|v| v.is_nan()).count(), 4);
    }

    #[test]
    fn test_constant_grid() {
        assert!(create_constant_grid(3, 3, 7.0).iter().all(|&v| v == 7.0));
    }
}
