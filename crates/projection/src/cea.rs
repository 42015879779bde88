//! Cylindrical equal-area (CEA) map projection.
//!
//! Maps heliographic longitude/latitude onto a regular pixel grid so that
//! every pixel covers the same surface area. The projection is the FITS
//! `CEA` with `PV2_1 = 1`: native `x = phi`, `y = (180/PI) * sin(theta)`.
//! The native sphere is rotated so the reference pixel lands on the
//! reference coordinate with heliographic north up.
//!
//! Reference: Calabretta & Greisen, A&A 395, 1077 (2002), section 5.5.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// A CEA grid: reference coordinate, pixel scale, reference pixel and shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CeaProjection {
    /// Reference (longitude, latitude) in degrees
    pub crval: (f64, f64),
    /// Pixel scale along (columns, rows) in degrees per pixel
    pub cdelt: (f64, f64),
    /// One-based reference pixel (column, row)
    pub crpix: (f64, f64),
    /// Grid shape as (rows, columns)
    pub shape: (usize, usize),
}

impl CeaProjection {
    /// A grid of `shape` centred on `crval`.
    pub fn centered(crval: (f64, f64), cdelt: (f64, f64), shape: (usize, usize)) -> Self {
        let (rows, cols) = shape;
        Self {
            crval,
            cdelt,
            crpix: ((cols as f64 + 1.0) / 2.0, (rows as f64 + 1.0) / 2.0),
            shape,
        }
    }

    fn rotation(&self) -> Rotation3<f64> {
        let lon0 = self.crval.0.to_radians();
        let lat0 = self.crval.1.to_radians();
        Rotation3::from_axis_angle(&Vector3::z_axis(), lon0)
            * Rotation3::from_axis_angle(&Vector3::y_axis(), -lat0)
    }

    /// World (lon, lat) in degrees of zero-based pixel `(col, row)`.
    ///
    /// Returns `None` for pixels beyond the poles of the projection.
    pub fn pixel_to_world(&self, col: f64, row: f64) -> Option<(f64, f64)> {
        let x = self.cdelt.0 * (col + 1.0 - self.crpix.0);
        let y = self.cdelt.1 * (row + 1.0 - self.crpix.1);

        let sin_theta = y.to_radians();
        if sin_theta.abs() > 1.0 {
            return None;
        }
        let theta = sin_theta.asin();
        let phi = x.to_radians();

        let native = Vector3::new(theta.cos() * phi.cos(), theta.cos() * phi.sin(), theta.sin());
        let world = self.rotation() * native;

        let lon = world.y.atan2(world.x).to_degrees();
        let lat = world.z.clamp(-1.0, 1.0).asin().to_degrees();
        Some((lon, lat))
    }

    /// Zero-based pixel `(col, row)` of world (lon, lat) in degrees.
    pub fn world_to_pixel(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lon = lon_deg.to_radians();
        let lat = lat_deg.to_radians();
        let world = Vector3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
        let native = self.rotation().inverse() * world;

        let phi = native.y.atan2(native.x).to_degrees();
        let y = native.z.clamp(-1.0, 1.0).to_degrees();

        let col = phi / self.cdelt.0 + self.crpix.0 - 1.0;
        let row = y / self.cdelt.1 + self.crpix.1 - 1.0;
        (col, row)
    }

    /// Number of pixels in the grid.
    pub fn pixel_count(&self) -> usize {
        self.shape.0 * self.shape.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, assert_coords_approx_eq};

    #[test]
    fn test_reference_pixel_maps_to_reference_coordinate() {
        let proj = CeaProjection::centered((-40.8, -4.7), (0.1153, 0.1153), (72, 72));
        assert_eq!(proj.crpix, (36.5, 36.5));
        let (lon, lat) = proj.pixel_to_world(35.5, 35.5).unwrap();
        assert_coords_approx_eq!((lon, lat), (-40.8, -4.7), 1e-9);
    }

    #[test]
    fn test_north_is_up_and_west_is_right() {
        let proj = CeaProjection::centered((20.0, 15.0), (0.1, 0.1), (101, 101));
        let (lon_c, lat_c) = proj.pixel_to_world(50.0, 50.0).unwrap();
        let (_, lat_up) = proj.pixel_to_world(50.0, 60.0).unwrap();
        let (lon_right, _) = proj.pixel_to_world(60.0, 50.0).unwrap();
        assert!(lat_up > lat_c);
        assert!(lon_right > lon_c);
    }

    #[test]
    fn test_pixel_world_roundtrip() {
        let proj = CeaProjection::centered((-40.0, -12.0), (0.05, 0.05), (200, 300));
        for &(col, row) in &[(0.0, 0.0), (299.0, 199.0), (150.0, 10.0), (12.5, 180.25)] {
            let (lon, lat) = proj.pixel_to_world(col, row).unwrap();
            let (c2, r2) = proj.world_to_pixel(lon, lat);
            assert_approx_eq!(c2, col, 1e-6);
            assert_approx_eq!(r2, row, 1e-6);
        }
    }

    #[test]
    fn test_equator_grid_is_plain_cea() {
        // At crval = (0, 0) the rotation is the identity and y = sin(lat).
        let proj = CeaProjection::centered((0.0, 0.0), (1.0, 1.0), (181, 361));
        let (lon, lat) = proj.pixel_to_world(180.0 + 30.0, 90.0 + 30.0).unwrap();
        assert_approx_eq!(lon, 30.0, 1e-9);
        assert_approx_eq!(lat.to_radians().sin().to_degrees(), 30.0, 1e-9);
        assert!(proj.pixel_to_world(180.0, 90.0 + 60.0).is_none());
    }
}
