//! Low-precision solar ephemeris.
//!
//! Provides the Sun-Earth distance and the heliographic orientation of the
//! solar disk (B0, Carrington L0) from the classical solar theory. Accuracy
//! is about 0.01 degrees in B0 and 0.1 degrees in L0 over several centuries
//! around J2000, which is far below one pixel of any solar imager.
//!
//! Reference: J. Meeus, Astronomical Algorithms (2nd ed.), chapters 25 and 29.

use serde::{Deserialize, Serialize};
use solar_common::units::{wrap_deg_360, AU_METERS};
use solar_common::ObservationTime;

/// Inclination of the solar equator to the ecliptic (degrees).
const SOLAR_EQUATOR_INCLINATION_DEG: f64 = 7.25;

/// Sidereal Carrington rotation period (days).
const CARRINGTON_PERIOD_DAYS: f64 = 25.38;

/// Julian date of the Carrington longitude zero point.
const CARRINGTON_EPOCH_JD: f64 = 2_398_220.0;

/// Geometric and apparent ecliptic longitude of the Sun plus distance.
#[derive(Debug, Clone, Copy)]
struct SolarPosition {
    /// Apparent ecliptic longitude (degrees)
    apparent_longitude: f64,
    /// Sun-Earth distance (AU)
    distance_au: f64,
}

fn solar_position(time: &ObservationTime) -> SolarPosition {
    let t = time.julian_centuries();

    let mean_longitude = 280.46646 + 36000.76983 * t + 0.0003032 * t * t;
    let mean_anomaly = 357.52911 + 35999.05029 * t - 0.0001537 * t * t;
    let eccentricity = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;

    let m = mean_anomaly.to_radians();
    let center = (1.914602 - 0.004817 * t - 0.000014 * t * t) * m.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * m).sin()
        + 0.000289 * (3.0 * m).sin();

    let true_longitude = mean_longitude + center;
    let true_anomaly = (mean_anomaly + center).to_radians();

    let distance_au = 1.000001018 * (1.0 - eccentricity * eccentricity)
        / (1.0 + eccentricity * true_anomaly.cos());

    let omega = (125.04 - 1934.136 * t).to_radians();
    let apparent_longitude = wrap_deg_360(true_longitude - 0.00569 - 0.00478 * omega.sin());

    SolarPosition {
        apparent_longitude,
        distance_au,
    }
}

/// Sun-Earth distance in astronomical units.
pub fn sun_distance_au(time: &ObservationTime) -> f64 {
    solar_position(time).distance_au
}

/// Longitude of the ascending node of the solar equator on the ecliptic (degrees).
fn ascending_node(jd: f64) -> f64 {
    73.6667 + 1.3958333 * (jd - 2_396_758.0) / 36_525.0
}

/// Heliographic latitude of the centre of the solar disk as seen from Earth (radians).
pub fn b0(time: &ObservationTime) -> f64 {
    let lambda = solar_position(time).apparent_longitude;
    let k = ascending_node(time.julian_day());
    let inc = SOLAR_EQUATOR_INCLINATION_DEG.to_radians();
    ((lambda - k).to_radians().sin() * inc.sin()).asin()
}

/// Carrington longitude of the centre of the solar disk as seen from Earth (radians, `[0, 2PI)`).
///
/// No light-travel-time correction is applied.
pub fn carrington_l0(time: &ObservationTime) -> f64 {
    let jd = time.julian_day();
    let lambda = solar_position(time).apparent_longitude;
    let k = ascending_node(jd);
    let inc = SOLAR_EQUATOR_INCLINATION_DEG.to_radians();

    let lk = (lambda - k).to_radians();
    let eta = (-lk.sin() * inc.cos()).atan2(-lk.cos()).to_degrees();
    let theta = (jd - CARRINGTON_EPOCH_JD) * 360.0 / CARRINGTON_PERIOD_DAYS;

    wrap_deg_360(eta - theta).to_radians()
}

/// A physical observer location in Stonyhurst heliographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    /// Stonyhurst longitude (radians)
    pub lon: f64,
    /// Stonyhurst latitude (radians)
    pub lat: f64,
    /// Distance from Sun centre (metres)
    pub radius: f64,
}

impl Observer {
    pub fn new(lon: f64, lat: f64, radius: f64) -> Self {
        Self { lon, lat, radius }
    }

    pub fn from_degrees(lon_deg: f64, lat_deg: f64, radius: f64) -> Self {
        Self::new(lon_deg.to_radians(), lat_deg.to_radians(), radius)
    }

    /// Earth as an observer at `time`.
    ///
    /// Stonyhurst longitude zero is defined by the Sun-Earth line, so Earth
    /// sits at longitude 0 and latitude B0.
    pub fn earth(time: &ObservationTime) -> Self {
        Self {
            lon: 0.0,
            lat: b0(time),
            radius: sun_distance_au(time) * AU_METERS,
        }
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon.to_degrees()
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat.to_degrees()
    }
}
