//! Observation time handling.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GxError;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian date of J2000.0.
pub const J2000_JD: f64 = 2_451_545.0;

/// The instant an observation was taken, always in UTC.
///
/// UTC is used directly as the dynamical timescale by the ephemeris code;
/// the ~69 s offset to TT is below the precision of the solar theory used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObservationTime(DateTime<Utc>);

impl ObservationTime {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Build from calendar fields, rejecting impossible dates.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        min: u32,
        sec: u32,
    ) -> Result<Self, GxError> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(Self)
            .ok_or_else(|| {
                GxError::InvalidTime(format!(
                    "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                    year, month, day, hour, min, sec
                ))
            })
    }

    /// Parse an ISO 8601 timestamp.
    ///
    /// Accepts RFC 3339 (with offset), a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
    /// (taken as UTC) and a bare date.
    pub fn from_iso8601(s: &str) -> Result<Self, GxError> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Self(Utc.from_utc_datetime(&ndt)));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
                return Ok(Self(Utc.from_utc_datetime(&ndt)));
            }
        }

        Err(GxError::InvalidTime(s.to_string()))
    }

    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Julian date of this instant.
    pub fn julian_day(&self) -> f64 {
        let secs = self.0.timestamp() as f64 + self.0.timestamp_subsec_nanos() as f64 * 1e-9;
        UNIX_EPOCH_JD + secs / 86_400.0
    }

    /// Julian centuries since J2000.0.
    pub fn julian_centuries(&self) -> f64 {
        (self.julian_day() - J2000_JD) / 36_525.0
    }

    /// FITS `DATE-OBS` rendering.
    pub fn to_fits_string(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }
}

impl From<DateTime<Utc>> for ObservationTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl FromStr for ObservationTime {
    type Err = GxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_iso8601(s)
    }
}

impl fmt::Display for ObservationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}
