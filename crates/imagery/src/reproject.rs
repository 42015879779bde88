//! Resampling images onto a box's surface header.
//!
//! Each output pixel centre is mapped to its Stonyhurst surface point,
//! then into the source image's pixel grid, and the source is sampled
//! there. Output pixels the source cannot see stay NaN.

use gxbox::{SurfaceHeader, MAX_GRID_SIDE};
use projection::{Frame, SkyCoord};
use rayon::prelude::*;
use solar_common::{GxError, GxResult};
use tracing::debug;

use crate::image::{ImageWcs, SolarImage};
use crate::interpolation::Interpolation;

impl SolarImage {
    /// Resample onto `header` with bilinear interpolation.
    pub fn reproject_to(&self, header: &SurfaceHeader) -> GxResult<SolarImage> {
        self.reproject_with(header, Interpolation::Bilinear)
    }

    /// Resample onto `header` with the given kernel.
    ///
    /// Fails up front when the image's frame cannot be related to the
    /// header's, e.g. when their observation times differ.
    pub fn reproject_with(&self, header: &SurfaceHeader, method: Interpolation) -> GxResult<SolarImage> {
        let projection = header.projection();
        let (rows, cols) = header.shape;
        if rows > MAX_GRID_SIDE || cols > MAX_GRID_SIDE || header.pixel_count().is_none() {
            return Err(GxError::DegenerateGrid(format!(
                "{} x {} grid exceeds {} pixels per side",
                rows, cols, MAX_GRID_SIDE
            )));
        }
        let surface = Frame::stonyhurst(Some(header.date_obs)).with_rsun(header.rsun_ref);

        // Frame mismatches fail here rather than per pixel.
        header.reference.transform_to(self.wcs.frame())?;

        let mut output = vec![f32::NAN; rows * cols];
        output
            .par_chunks_mut(cols)
            .enumerate()
            .for_each(|(row, out_row)| {
                for (col, out) in out_row.iter_mut().enumerate() {
                    let Some((lon, lat)) = projection.pixel_to_world(col as f64, row as f64) else {
                        continue;
                    };
                    let Ok(point) = SkyCoord::heliographic(surface, lon, lat, header.rsun_ref) else {
                        continue;
                    };
                    if let Some((x, y)) = self.wcs.world_to_pixel(&point) {
                        *out = method.sample(&self.data, self.width, self.height, x, y);
                    }
                }
            });

        let valid = output.iter().filter(|v| !v.is_nan()).count();
        debug!(
            name = %self.meta.name,
            rows = rows,
            cols = cols,
            valid = valid,
            "Reprojected image onto surface header"
        );

        let meta = self.meta.clone().with_rsun_ref(header.rsun_ref);
        let wcs = ImageWcs::Cea {
            frame: surface,
            projection,
        };
        SolarImage::new(meta, wcs, cols, rows, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::MapMeta;
    use gxbox::BoxDimensions;
    use solar_common::units::{mm_to_m, RSUN_PHOTOSPHERIC};
    use test_utils::{assert_approx_eq, create_constant_grid, fixtures::solar};

    fn full_disk(value: f32) -> SolarImage {
        let t = solar::flare_time();
        let frame = Frame::earth_view(t);
        let wcs = ImageWcs::Helioprojective {
            frame,
            crval: (0.0, 0.0),
            cdelt: (4.0, 4.0),
            crpix: (300.5, 300.5),
        };
        let meta = MapMeta::new("171", t, frame.observer().unwrap());
        SolarImage::new(meta, wcs, 600, 600, create_constant_grid(600, 600, value)).unwrap()
    }

    fn header_at(lon: f64, lat: f64) -> SurfaceHeader {
        let hgs = Frame::stonyhurst(Some(solar::flare_time()));
        let origin = SkyCoord::heliographic(hgs, lon, lat, RSUN_PHOTOSPHERIC).unwrap();
        let dims = BoxDimensions::from_mm(50.0, 40.0, 30.0).unwrap();
        SurfaceHeader::derive(&origin, &dims, mm_to_m(2.0)).unwrap()
    }

    #[test]
    fn test_output_matches_header_grid() {
        let header = header_at(-40.0, -5.0);
        let out = full_disk(3.0).reproject_to(&header).unwrap();
        assert_eq!(out.shape(), header.shape);
        assert_eq!((out.height, out.width), (20, 25));
        assert!(matches!(out.wcs, ImageWcs::Cea { .. }));
        for v in &out.data {
            assert_approx_eq!(*v, 3.0, 1e-6);
        }
    }

    #[test]
    fn test_far_side_is_nan() {
        let header = header_at(175.0, 0.0);
        let out = full_disk(1.0).reproject_to(&header).unwrap();
        assert!(out.data.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_oversized_header_is_rejected() {
        let header = SurfaceHeader {
            shape: (MAX_GRID_SIDE + 1, usize::MAX / 2),
            ..header_at(-40.0, -5.0)
        };
        let err = full_disk(1.0).reproject_to(&header).unwrap_err();
        assert_eq!(err.error_code(), "DegenerateGrid");
    }

    #[test]
    fn test_mismatched_time_is_rejected() {
        let hgs = Frame::stonyhurst(Some(solar::ar_time()));
        let origin = SkyCoord::heliographic(hgs, 0.0, 0.0, RSUN_PHOTOSPHERIC).unwrap();
        let dims = BoxDimensions::from_mm(50.0, 40.0, 30.0).unwrap();
        let header = SurfaceHeader::derive(&origin, &dims, mm_to_m(2.0)).unwrap();
        let err = full_disk(1.0).reproject_to(&header).unwrap_err();
        assert_eq!(err.error_code(), "IncompatibleFrames");
    }
}
