//! Sampling kernels used when resampling maps.
//!
//! Positions are zero-based fractional pixel indices `(x, y)` =
//! `(column, row)`. A position off the grid, or one whose neighbourhood
//! holds a NaN pixel, samples as NaN.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

impl Interpolation {
    pub fn sample(&self, data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
        match self {
            Interpolation::Nearest => nearest_interpolate(data, width, height, x, y),
            Interpolation::Bilinear => bilinear_interpolate(data, width, height, x, y),
        }
    }
}

/// Pixel `(col, row)` if it lies on the grid.
fn pixel(data: &[f32], width: usize, height: usize, col: f64, row: f64) -> Option<f32> {
    let on_grid = col >= 0.0 && row >= 0.0 && col < width as f64 && row < height as f64;
    on_grid.then(|| data[row as usize * width + col as usize])
}

/// Value of the pixel whose centre is closest to `(x, y)`.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if !x.is_finite() || !y.is_finite() {
        return f32::NAN;
    }
    pixel(data, width, height, x.round(), y.round()).unwrap_or(f32::NAN)
}

/// Weighted mean of the four pixels around `(x, y)`.
///
/// Defined between the first and last pixel centres on each axis.
pub fn bilinear_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if width == 0 || height == 0 || !x.is_finite() || !y.is_finite() {
        return f32::NAN;
    }
    let (max_x, max_y) = ((width - 1) as f64, (height - 1) as f64);
    if !(0.0..=max_x).contains(&x) || !(0.0..=max_y).contains(&y) {
        return f32::NAN;
    }

    let (left, bottom) = (x.floor(), y.floor());
    let (right, top) = ((left + 1.0).min(max_x), (bottom + 1.0).min(max_y));
    let corners = [
        pixel(data, width, height, left, bottom),
        pixel(data, width, height, right, bottom),
        pixel(data, width, height, left, top),
        pixel(data, width, height, right, top),
    ];
    let [Some(lb), Some(rb), Some(lt), Some(rt)] = corners else {
        return f32::NAN;
    };
    if [lb, rb, lt, rt].iter().any(|v| v.is_nan()) {
        return f32::NAN;
    }

    let tx = (x - left) as f32;
    let ty = (y - bottom) as f32;
    let lower = lb + (rb - lb) * tx;
    let upper = lt + (rt - lt) * tx;
    lower + (upper - lower) * ty
}
