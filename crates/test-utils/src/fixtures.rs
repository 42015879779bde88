//! Common test fixtures for gxbox tests.
//!
//! This module provides pre-defined observation scenarios that show up
//! across the geometry, projection and imagery test suites.

/// Reference observing scenarios.
pub mod solar {
    use solar_common::ObservationTime;

    /// Flare active region observed on 2014-11-01T16:40:00Z.
    pub const FLARE_TIME: &str = "2014-11-01T16:40:00Z";

    /// Helioprojective origin of the flare region (arcsec).
    pub const FLARE_ORIGIN_ARCSEC: (f64, f64) = (-632.0, -135.0);

    /// Quiet-sun "dots" source seen on the same day (arcsec).
    pub const DOTS_ORIGIN_ARCSEC: (f64, f64) = (-475.0, -330.0);

    /// Later observation used for an off-centre origin (2024-05-09T17:12:00Z).
    pub const AR_TIME: &str = "2024-05-09T17:12:00Z";

    /// Active region origin for [`AR_TIME`] (arcsec).
    pub const AR_ORIGIN_ARCSEC: (f64, f64) = (450.0, -256.0);

    /// Default box size (Mm).
    pub const DEFAULT_DIMS_MM: [f64; 3] = [100.0, 100.0, 100.0];

    /// Default box resolution (Mm).
    pub const DEFAULT_RES_MM: f64 = 1.4;

    /// Box used with the flare region (Mm).
    pub const FLARE_DIMS_MM: [f64; 3] = [150.0, 150.0, 100.0];

    /// Resolution used with the flare region (Mm).
    pub const FLARE_RES_MM: f64 = 0.6;

    /// Parsed [`FLARE_TIME`].
    pub fn flare_time() -> ObservationTime {
        ObservationTime::from_iso8601(FLARE_TIME).expect("fixture time parses")
    }

    /// Parsed [`AR_TIME`].
    pub fn ar_time() -> ObservationTime {
        ObservationTime::from_iso8601(AR_TIME).expect("fixture time parses")
    }
}

/// Product names used by the map cache tests.
pub mod maps {
    /// AIA 171 Å context image
    pub const AIA_171: &str = "171";

    /// AIA 1600 Å context image
    pub const AIA_1600: &str = "1600";

    /// HMI line-of-sight magnetogram
    pub const MAGNETOGRAM: &str = "magnetogram";

    /// HMI vector field segments
    pub const SEGMENTS: [&str; 4] = ["field", "inclination", "azimuth", "disambig"];

    /// Derived spherical field components
    pub const PRODUCTS: [&str; 3] = ["br", "bp", "bt"];
}
