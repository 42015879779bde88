//! HMI vector magnetogram products.
//!
//! The inverted field arrives as four segments: field strength (G),
//! inclination and azimuth (degrees) and a bit-packed disambiguation flag.
//! After resolving the 180 degree azimuth ambiguity the field is rotated
//! into local spherical components `(bp, bt, br)` at each pixel's
//! heliographic position.
//!
//! Reference: Gary & Hagyard, Solar Physics 126, 21-36 (1990).

use solar_common::{GxError, GxResult};
use tracing::debug;

use crate::image::SolarImage;

/// Bit of the disambiguation segment selected by default (radial acute).
pub const DEFAULT_DISAMBIG_METHOD: u32 = 2;

fn check_same_grid(a: &SolarImage, b: &SolarImage) -> GxResult<()> {
    if a.shape() != b.shape() || a.wcs != b.wcs {
        return Err(GxError::InvalidMapData(format!(
            "{} and {} do not share a pixel grid",
            a.name(),
            b.name()
        )));
    }
    Ok(())
}

/// Flip the azimuth by 180 degrees where bit `method` of `disambig` is set.
pub fn disambiguate(azimuth: &SolarImage, disambig: &SolarImage, method: u32) -> GxResult<SolarImage> {
    check_same_grid(azimuth, disambig)?;
    if method > 2 {
        return Err(GxError::invalid_parameter(
            "method",
            format!("disambiguation method must be 0, 1 or 2, got {}", method),
        ));
    }

    let data = azimuth
        .data
        .iter()
        .zip(&disambig.data)
        .map(|(&az, &flag)| {
            if flag.is_finite() && (flag as i64 >> method) & 1 != 0 {
                az + 180.0
            } else {
                az
            }
        })
        .collect();
    azimuth.with_data(azimuth.name(), data)
}

/// Convert field, inclination and azimuth into `(bp, bt, br)`.
///
/// Pixels off the solar disk come out NaN.
pub fn b2ptr(
    field: &SolarImage,
    inclination: &SolarImage,
    azimuth: &SolarImage,
) -> GxResult<(SolarImage, SolarImage, SolarImage)> {
    check_same_grid(field, inclination)?;
    check_same_grid(field, azimuth)?;

    let observer = field.wcs.frame().require_observer()?;
    let n = field.data.len();
    let mut bp = vec![f32::NAN; n];
    let mut bt = vec![f32::NAN; n];
    let mut br = vec![f32::NAN; n];

    for row in 0..field.height {
        for col in 0..field.width {
            let i = row * field.width + col;
            let Some(position) = field.wcs.pixel_to_world(col as f64, row as f64) else {
                continue;
            };
            let Some((lon, lat)) = position.lon_lat_deg() else {
                continue;
            };

            let components = spherical_components(
                field.data[i] as f64,
                inclination.data[i] as f64,
                azimuth.data[i] as f64,
                lon.to_radians() - observer.lon,
                lat.to_radians(),
                observer.lat,
                0.0,
            );
            bp[i] = components[0] as f32;
            bt[i] = components[1] as f32;
            br[i] = components[2] as f32;
        }
    }

    debug!(
        pixels = n,
        on_disk = br.iter().filter(|v| !v.is_nan()).count(),
        "Derived spherical field components"
    );

    Ok((
        field.with_data("bp", bp)?,
        field.with_data("bt", bt)?,
        field.with_data("br", br)?,
    ))
}

/// `[bp, bt, br]` for one pixel.
///
/// `phi` is the longitude from the disk centre, `lambda` the latitude,
/// `b` the disk-centre latitude and `p` the position angle of solar north,
/// all in radians. Field angles are in degrees.
fn spherical_components(
    field: f64,
    inclination_deg: f64,
    azimuth_deg: f64,
    phi: f64,
    lambda: f64,
    b: f64,
    p: f64,
) -> [f64; 3] {
    let (sin_g, cos_g) = inclination_deg.to_radians().sin_cos();
    let (sin_psi, cos_psi) = azimuth_deg.to_radians().sin_cos();
    let bx = -field * sin_g * sin_psi;
    let by = field * sin_g * cos_psi;
    let bz = field * cos_g;

    let (sb, cb) = b.sin_cos();
    let (sp, cp) = p.sin_cos();
    let (sphi, cphi) = phi.sin_cos();
    let (slam, clam) = lambda.sin_cos();

    let k11 = clam * (sb * sp * cphi + cp * sphi) - slam * cb * sp;
    let k12 = -clam * (sb * cp * cphi - sp * sphi) + slam * cb * cp;
    let k13 = clam * cb * cphi + slam * sb;
    let k21 = slam * (sb * sp * cphi + cp * sphi) + clam * cb * sp;
    let k22 = -slam * (sb * cp * cphi - sp * sphi) - clam * cb * cp;
    let k23 = slam * cb * cphi - clam * sb;
    let k31 = -sb * sp * sphi + cp * cphi;
    let k32 = sb * cp * sphi + sp * cphi;
    let k33 = -cb * sphi;

    [
        k31 * bx + k32 * by + k33 * bz,
        k21 * bx + k22 * by + k23 * bz,
        k11 * bx + k12 * by + k13 * bz,
    ]
}
