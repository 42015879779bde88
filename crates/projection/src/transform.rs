//! Transforms between solar frames.
//!
//! Every frame converts to and from Cartesian Stonyhurst coordinates
//! (Sun-centred, `x` toward Stonyhurst longitude 0 on the equator, `z`
//! toward solar north). A transform is the composition of the source
//! variant's `to_stonyhurst` and the target variant's `from_stonyhurst`.
//!
//! Reference: W. T. Thompson, "Coordinate systems for solar image data",
//! A&A 449, 791-803 (2006).

use std::f64::consts::PI;

use nalgebra::{Matrix3, Vector3};
use solar_common::units::{rad_to_arcsec, wrap_rad_pi};
use solar_common::{GxError, GxResult, ObservationTime};

use crate::coord::{CoordData, SkyCoord};
use crate::ephemeris::{carrington_l0, Observer};
use crate::frame::Frame;

/// Express `coord` in `target`.
///
/// Fails with a configuration error when either frame lacks the observer
/// or observation time its conversion needs, and with a projection error
/// when the frames disagree on the observation time or a distance-less
/// helioprojective point does not hit the solar sphere.
pub fn transform_to(coord: &SkyCoord, target: &Frame) -> GxResult<SkyCoord> {
    check_obstimes(coord.frame(), target)?;
    let stonyhurst = to_stonyhurst(coord)?;
    from_stonyhurst(stonyhurst, target)
}

fn check_obstimes(source: &Frame, target: &Frame) -> GxResult<()> {
    if let (Some(a), Some(b)) = (source.obstime(), target.obstime()) {
        if a != b {
            return Err(GxError::incompatible_frames(
                source.name(),
                target.name(),
                format!("observation times differ ({} vs {})", a, b),
            ));
        }
    }
    Ok(())
}

/// Rotation taking Stonyhurst Cartesian vectors into the heliocentric frame
/// of `observer`. Rows are the heliocentric axes expressed in Stonyhurst.
pub fn heliocentric_rotation(observer: &Observer) -> Matrix3<f64> {
    let (sl, cl) = observer.lon.sin_cos();
    let (sb, cb) = observer.lat.sin_cos();
    Matrix3::new(
        -sl,
        cl,
        0.0,
        -sb * cl,
        -sb * sl,
        cb,
        cb * cl,
        cb * sl,
        sb,
    )
}

fn spherical_to_cartesian(lon: f64, lat: f64, radius: f64) -> Vector3<f64> {
    let (slat, clat) = lat.sin_cos();
    let (slon, clon) = lon.sin_cos();
    Vector3::new(radius * clat * clon, radius * clat * slon, radius * slat)
}

fn cartesian_to_spherical(v: &Vector3<f64>) -> (f64, f64, f64) {
    let radius = v.norm();
    if radius == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let lon = v.y.atan2(v.x);
    let lat = (v.z / radius).clamp(-1.0, 1.0).asin();
    (lon, lat, radius)
}

fn carrington_offset(frame: &Frame) -> GxResult<f64> {
    let obstime: ObservationTime = frame.require_obstime()?;
    Ok(carrington_l0(&obstime))
}

// --- Stonyhurst ---------------------------------------------------------

fn stonyhurst_from_spherical(lon: f64, lat: f64, radius: f64) -> Vector3<f64> {
    spherical_to_cartesian(lon, lat, radius)
}

fn spherical_from_stonyhurst(v: &Vector3<f64>) -> CoordData {
    let (lon, lat, radius) = cartesian_to_spherical(v);
    CoordData::Spherical {
        lon: wrap_rad_pi(lon),
        lat,
        radius,
    }
}

// --- Carrington ---------------------------------------------------------

fn stonyhurst_from_carrington(frame: &Frame, lon: f64, lat: f64, radius: f64) -> GxResult<Vector3<f64>> {
    let l0 = carrington_offset(frame)?;
    Ok(spherical_to_cartesian(lon - l0, lat, radius))
}

fn carrington_from_stonyhurst(frame: &Frame, v: &Vector3<f64>) -> GxResult<CoordData> {
    let l0 = carrington_offset(frame)?;
    let (lon, lat, radius) = cartesian_to_spherical(v);
    Ok(CoordData::Spherical {
        lon: (lon + l0).rem_euclid(2.0 * PI),
        lat,
        radius,
    })
}

// --- Heliocentric -------------------------------------------------------

fn stonyhurst_from_heliocentric(observer: &Observer, hcc: &Vector3<f64>) -> Vector3<f64> {
    heliocentric_rotation(observer).transpose() * hcc
}

fn heliocentric_from_stonyhurst(observer: &Observer, v: &Vector3<f64>) -> Vector3<f64> {
    heliocentric_rotation(observer) * v
}

// --- Helioprojective ----------------------------------------------------

/// Heliocentric position of a helioprojective direction.
///
/// With no distance the point is placed where the line of sight first
/// meets the sphere of radius `rsun`.
fn heliocentric_from_projective(
    observer: &Observer,
    rsun: f64,
    tx: f64,
    ty: f64,
    distance: Option<f64>,
) -> GxResult<Vector3<f64>> {
    let d_obs = observer.radius;
    let (sx, cx) = tx.sin_cos();
    let (sy, cy) = ty.sin_cos();

    let d = match distance {
        Some(d) => d,
        None => {
            let cos_alpha = cy * cx;
            let b = -2.0 * d_obs * cos_alpha;
            let c = d_obs * d_obs - rsun * rsun;
            let discriminant = b * b - 4.0 * c;
            if discriminant < 0.0 {
                return Err(GxError::OffDisk {
                    tx_arcsec: rad_to_arcsec(tx),
                    ty_arcsec: rad_to_arcsec(ty),
                });
            }
            (-b - discriminant.sqrt()) / 2.0
        }
    };

    Ok(Vector3::new(d * cy * sx, d * sy, d_obs - d * cy * cx))
}

fn projective_from_heliocentric(observer: &Observer, hcc: &Vector3<f64>) -> CoordData {
    let dz = observer.radius - hcc.z;
    let distance = (hcc.x * hcc.x + hcc.y * hcc.y + dz * dz).sqrt();
    let tx = hcc.x.atan2(dz);
    let ty = if distance > 0.0 {
        (hcc.y / distance).clamp(-1.0, 1.0).asin()
    } else {
        0.0
    };
    CoordData::Projective {
        tx,
        ty,
        distance: Some(distance),
    }
}

// --- Composition --------------------------------------------------------

fn to_stonyhurst(coord: &SkyCoord) -> GxResult<Vector3<f64>> {
    let frame = coord.frame();
    match (frame, *coord.data()) {
        (Frame::HeliographicStonyhurst { .. }, CoordData::Spherical { lon, lat, radius }) => {
            Ok(stonyhurst_from_spherical(lon, lat, radius))
        }
        (Frame::HeliographicCarrington { .. }, CoordData::Spherical { lon, lat, radius }) => {
            stonyhurst_from_carrington(frame, lon, lat, radius)
        }
        (Frame::Heliocentric { .. }, CoordData::Cartesian { x, y, z }) => {
            let observer = frame.require_observer()?;
            Ok(stonyhurst_from_heliocentric(
                &observer,
                &Vector3::new(x, y, z),
            ))
        }
        (Frame::Helioprojective { rsun, .. }, CoordData::Projective { tx, ty, distance }) => {
            let observer = frame.require_observer()?;
            let hcc = heliocentric_from_projective(&observer, *rsun, tx, ty, distance)?;
            Ok(stonyhurst_from_heliocentric(&observer, &hcc))
        }
        (frame, data) => Err(GxError::invalid_parameter(
            "coordinate",
            format!("{:?} data cannot be expressed in frame {}", data, frame.name()),
        )),
    }
}

fn from_stonyhurst(v: Vector3<f64>, target: &Frame) -> GxResult<SkyCoord> {
    let data = match target {
        Frame::HeliographicStonyhurst { .. } => spherical_from_stonyhurst(&v),
        Frame::HeliographicCarrington { .. } => carrington_from_stonyhurst(target, &v)?,
        Frame::Heliocentric { .. } => {
            let observer = target.require_observer()?;
            let hcc = heliocentric_from_stonyhurst(&observer, &v);
            CoordData::Cartesian {
                x: hcc.x,
                y: hcc.y,
                z: hcc.z,
            }
        }
        Frame::Helioprojective { .. } => {
            let observer = target.require_observer()?;
            let hcc = heliocentric_from_stonyhurst(&observer, &v);
            projective_from_heliocentric(&observer, &hcc)
        }
    };
    SkyCoord::new(*target, data)
}

/// Transform a batch of points into `target`, failing on the first error.
pub fn transform_all(coords: &[SkyCoord], target: &Frame) -> GxResult<Vec<SkyCoord>> {
    coords.iter().map(|c| transform_to(c, target)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_common::units::{AU_METERS, RSUN_PHOTOSPHERIC};
    use test_utils::{assert_angle_approx_eq, assert_approx_eq, fixtures::solar};

    fn time() -> ObservationTime {
        solar::flare_time()
    }

    #[test]
    fn test_rotation_is_orthonormal() {
        let obs = Observer::from_degrees(23.0, -5.0, AU_METERS);
        let m = heliocentric_rotation(&obs);
        let identity = m * m.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_approx_eq!(identity[(i, j)], expected, 1e-12);
            }
        }
    }

    #[test]
    fn test_disk_center_projects_to_origin() {
        let t = time();
        let earth = Observer::earth(&t);
        let hgs = Frame::stonyhurst(Some(t));
        // The sub-observer point sits at the observer's own lon/lat.
        let center =
            SkyCoord::heliographic(hgs, earth.lon_deg(), earth.lat_deg(), RSUN_PHOTOSPHERIC)
                .unwrap();
        let hpc = center.transform_to(&Frame::earth_view(t)).unwrap();
        let (tx, ty) = hpc.tx_ty_arcsec().unwrap();
        assert_approx_eq!(tx, 0.0, 1e-6);
        assert_approx_eq!(ty, 0.0, 1e-6);
    }

    #[test]
    fn test_helioprojective_surface_roundtrip() {
        let t = time();
        let hpc_frame = Frame::earth_view(t);
        let point = SkyCoord::helioprojective(hpc_frame, -632.0, -135.0).unwrap();

        let hgs = point.transform_to(&Frame::stonyhurst(Some(t))).unwrap();
        assert_approx_eq!(hgs.radius().unwrap(), RSUN_PHOTOSPHERIC, 1.0);
        let (lon, lat) = hgs.lon_lat_deg().unwrap();
        assert!(lon < -35.0 && lon > -50.0, "lon {}", lon);
        assert!(lat < 0.0 && lat > -10.0, "lat {}", lat);

        let back = hgs.transform_to(&hpc_frame).unwrap();
        let (tx, ty) = back.tx_ty_arcsec().unwrap();
        assert_approx_eq!(tx, -632.0, 1e-6);
        assert_approx_eq!(ty, -135.0, 1e-6);
    }

    #[test]
    fn test_off_disk_point_is_rejected() {
        let t = time();
        let point = SkyCoord::helioprojective(Frame::earth_view(t), 1500.0, 0.0).unwrap();
        let err = point.transform_to(&Frame::stonyhurst(Some(t))).unwrap_err();
        assert_eq!(err.error_code(), "OffDisk");
    }

    #[test]
    fn test_transform_all_stops_at_first_failure() {
        let t = time();
        let frame = Frame::earth_view(t);
        let hgs = Frame::stonyhurst(Some(t));
        let on_disk = SkyCoord::helioprojective(frame, 100.0, 0.0).unwrap();
        let off_disk = SkyCoord::helioprojective(frame, 1500.0, 0.0).unwrap();

        assert_eq!(transform_all(&[on_disk, on_disk], &hgs).unwrap().len(), 2);
        let err = transform_all(&[on_disk, off_disk], &hgs).unwrap_err();
        assert_eq!(err.error_code(), "OffDisk");
    }

    #[test]
    fn test_carrington_offset_is_l0() {
        let t = time();
        let hgs = SkyCoord::heliographic(Frame::stonyhurst(Some(t)), 0.0, 10.0, RSUN_PHOTOSPHERIC)
            .unwrap();
        let hgc = hgs.transform_to(&Frame::carrington(Some(t))).unwrap();
        let (lon, lat) = hgc.lon_lat_deg().unwrap();
        assert_angle_approx_eq!(lon, carrington_l0(&t).to_degrees(), 1e-9);
        assert_approx_eq!(lat, 10.0, 1e-9);
    }

    #[test]
    fn test_carrington_requires_obstime() {
        let hgs = SkyCoord::heliographic(Frame::stonyhurst(None), 0.0, 0.0, RSUN_PHOTOSPHERIC)
            .unwrap();
        let err = hgs.transform_to(&Frame::carrington(None)).unwrap_err();
        assert_eq!(err.error_code(), "MissingObservationTime");
    }

    #[test]
    fn test_mismatched_obstimes_are_incompatible() {
        let t1 = time();
        let t2 = ObservationTime::from_ymd_hms(2014, 11, 2, 16, 40, 0).unwrap();
        let hgs = SkyCoord::heliographic(Frame::stonyhurst(Some(t1)), 0.0, 0.0, RSUN_PHOTOSPHERIC)
            .unwrap();
        let err = hgs.transform_to(&Frame::earth_view(t2)).unwrap_err();
        assert_eq!(err.error_code(), "IncompatibleFrames");
    }

    #[test]
    fn test_heliocentric_z_points_at_observer() {
        let t = time();
        let origin = Observer::from_degrees(-40.0, -12.0, RSUN_PHOTOSPHERIC);
        let frame = Frame::heliocentric(origin, t);
        let surface = SkyCoord::heliographic(
            Frame::stonyhurst(Some(t)),
            -40.0,
            -12.0,
            RSUN_PHOTOSPHERIC,
        )
        .unwrap();
        let hcc = surface.transform_to(&frame).unwrap().cartesian().unwrap();
        assert_approx_eq!(hcc.x, 0.0, 1e-3);
        assert_approx_eq!(hcc.y, 0.0, 1e-3);
        assert_approx_eq!(hcc.z, RSUN_PHOTOSPHERIC, 1e-3);
    }
}
