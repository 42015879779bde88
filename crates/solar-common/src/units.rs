//! Physical constants and unit conversions.
//!
//! Lengths are carried as metres and angles as radians internally. The
//! helpers here convert at the edges where callers speak in megametres,
//! arcseconds or degrees.

use std::f64::consts::PI;

/// Metres per megametre.
pub const METERS_PER_MM: f64 = 1.0e6;

/// Metres per astronomical unit (IAU 2012).
pub const AU_METERS: f64 = 149_597_870_700.0;

/// Nominal photospheric solar radius (IAU 2015 B3), metres.
pub const RSUN_PHOTOSPHERIC: f64 = 695_700_000.0;

/// Solar radius reference commonly written by SDO/AIA into `RSUN_REF`, metres.
pub const RSUN_REF_AIA: f64 = 696_000_000.0;

/// Arcseconds per radian.
pub const ARCSEC_PER_RAD: f64 = 180.0 * 3600.0 / PI;

/// Convert megametres to metres.
#[inline]
pub fn mm_to_m(v: f64) -> f64 {
    v * METERS_PER_MM
}

/// Convert metres to megametres.
#[inline]
pub fn m_to_mm(v: f64) -> f64 {
    v / METERS_PER_MM
}

/// Convert radians to arcseconds.
#[inline]
pub fn rad_to_arcsec(v: f64) -> f64 {
    v * ARCSEC_PER_RAD
}

/// Convert arcseconds to radians.
#[inline]
pub fn arcsec_to_rad(v: f64) -> f64 {
    v / ARCSEC_PER_RAD
}

/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
pub fn wrap_deg_360(v: f64) -> f64 {
    v.rem_euclid(360.0)
}

/// Wrap an angle in radians into `[-PI, PI)`.
#[inline]
pub fn wrap_rad_pi(v: f64) -> f64 {
    (v + PI).rem_euclid(2.0 * PI) - PI
}
