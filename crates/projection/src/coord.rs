//! Frame-tagged coordinates.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use solar_common::units::{arcsec_to_rad, rad_to_arcsec};
use solar_common::{GxError, GxResult};

use crate::frame::Frame;
use crate::transform;

/// Raw coordinate values in the representation native to their frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "repr", rename_all = "snake_case")]
pub enum CoordData {
    /// Heliocentric (x, y, z) in metres.
    Cartesian { x: f64, y: f64, z: f64 },
    /// Heliographic longitude/latitude in radians, radius in metres.
    Spherical { lon: f64, lat: f64, radius: f64 },
    /// Helioprojective (Tx, Ty) in radians, optional observer distance in metres.
    Projective {
        tx: f64,
        ty: f64,
        distance: Option<f64>,
    },
}

/// A point tagged with the frame it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyCoord {
    frame: Frame,
    data: CoordData,
}

impl SkyCoord {
    /// Pair a frame with data, rejecting representations the frame cannot hold.
    pub fn new(frame: Frame, data: CoordData) -> GxResult<Self> {
        let ok = matches!(
            (&frame, &data),
            (Frame::Heliocentric { .. }, CoordData::Cartesian { .. })
                | (
                    Frame::HeliographicStonyhurst { .. } | Frame::HeliographicCarrington { .. },
                    CoordData::Spherical { .. }
                )
                | (Frame::Helioprojective { .. }, CoordData::Projective { .. })
        );
        if !ok {
            return Err(GxError::invalid_parameter(
                "coordinate",
                format!("{:?} data cannot be expressed in frame {}", data, frame.name()),
            ));
        }
        Ok(Self { frame, data })
    }

    /// Heliocentric Cartesian point (metres).
    pub fn heliocentric(frame: Frame, position: Vector3<f64>) -> GxResult<Self> {
        Self::new(
            frame,
            CoordData::Cartesian {
                x: position.x,
                y: position.y,
                z: position.z,
            },
        )
    }

    /// Heliographic point from degrees and a radius in metres.
    pub fn heliographic(frame: Frame, lon_deg: f64, lat_deg: f64, radius: f64) -> GxResult<Self> {
        Self::new(
            frame,
            CoordData::Spherical {
                lon: lon_deg.to_radians(),
                lat: lat_deg.to_radians(),
                radius,
            },
        )
    }

    /// Helioprojective point from arcseconds, with no distance attached.
    pub fn helioprojective(frame: Frame, tx_arcsec: f64, ty_arcsec: f64) -> GxResult<Self> {
        Self::new(
            frame,
            CoordData::Projective {
                tx: arcsec_to_rad(tx_arcsec),
                ty: arcsec_to_rad(ty_arcsec),
                distance: None,
            },
        )
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn data(&self) -> &CoordData {
        &self.data
    }

    /// Heliocentric position vector; `None` for other representations.
    pub fn cartesian(&self) -> Option<Vector3<f64>> {
        match self.data {
            CoordData::Cartesian { x, y, z } => Some(Vector3::new(x, y, z)),
            _ => None,
        }
    }

    /// Heliographic (lon, lat) in degrees; `None` for other representations.
    pub fn lon_lat_deg(&self) -> Option<(f64, f64)> {
        match self.data {
            CoordData::Spherical { lon, lat, .. } => Some((lon.to_degrees(), lat.to_degrees())),
            _ => None,
        }
    }

    /// Distance from Sun centre for heliographic points.
    pub fn radius(&self) -> Option<f64> {
        match self.data {
            CoordData::Spherical { radius, .. } => Some(radius),
            CoordData::Cartesian { x, y, z } => Some(Vector3::new(x, y, z).norm()),
            CoordData::Projective { .. } => None,
        }
    }

    /// Helioprojective (Tx, Ty) in arcseconds; `None` for other representations.
    pub fn tx_ty_arcsec(&self) -> Option<(f64, f64)> {
        match self.data {
            CoordData::Projective { tx, ty, .. } => Some((rad_to_arcsec(tx), rad_to_arcsec(ty))),
            _ => None,
        }
    }

    /// Express this point in `target`.
    pub fn transform_to(&self, target: &Frame) -> GxResult<SkyCoord> {
        transform::transform_to(self, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solar_common::ObservationTime;

    #[test]
    fn test_rejects_mismatched_representation() {
        let t = ObservationTime::from_ymd_hms(2014, 11, 1, 16, 40, 0).unwrap();
        let hpc = Frame::earth_view(t);
        let err = SkyCoord::heliographic(hpc, 10.0, 10.0, 1.0).unwrap_err();
        assert_eq!(err.error_code(), "InvalidParameterValue");

        let ok = SkyCoord::helioprojective(hpc, -632.0, -135.0).unwrap();
        let (tx, ty) = ok.tx_ty_arcsec().unwrap();
        assert!((tx + 632.0).abs() < 1e-9);
        assert!((ty + 135.0).abs() < 1e-9);
        assert!(ok.cartesian().is_none());
    }
}
