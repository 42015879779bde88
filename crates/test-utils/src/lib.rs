//! Shared test utilities for the gxbox workspace.
//!
//! - float and angle assertions with explicit tolerances
//! - reference observations (times, origins, box sizes) in [`fixtures`]
//! - pixel grid generators in [`generators`]
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures::solar};
//! ```

pub mod fixtures;
pub mod generators;

pub use generators::*;

/// Assert `|left - right| <= epsilon`. NaN on either side fails.
///
/// ```ignore
/// assert_approx_eq!(header.scale, 0.1153, 1e-4);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: {} ≈ {}\n  left: {:?}\n right: {:?}\n  diff: {:?} (tolerance {:?})",
                stringify!($left),
                stringify!($right),
                left,
                right,
                diff,
                epsilon
            );
        }
    }};
}

/// Assert two angles in degrees agree modulo 360.
///
/// Longitudes near the ±180 seam compare equal across it.
#[macro_export]
macro_rules! assert_angle_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let delta = ($left as f64 - $right as f64).rem_euclid(360.0);
        $crate::assert_approx_eq!(delta.min(360.0 - delta), 0.0, $epsilon);
    }};
}

/// Assert two `(x, y)` pairs agree component-wise.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}
