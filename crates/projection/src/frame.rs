//! Solar reference frames.

use serde::{Deserialize, Serialize};
use solar_common::units::RSUN_PHOTOSPHERIC;
use solar_common::{GxError, GxResult, ObservationTime};

use crate::ephemeris::Observer;

/// A solar coordinate frame with the parameters needed to convert out of it.
///
/// - Stonyhurst: Sun-centred, rotating with the Sun, longitude zero on the
///   Sun-Earth line.
/// - Carrington: Sun-centred, fixed to the solar surface.
/// - Heliocentric: Sun-centred Cartesian, `z` toward the observer, `y`
///   toward solar north in the plane of the sky.
/// - Helioprojective: observer-centred angles (Tx, Ty) on the sky plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    HeliographicStonyhurst {
        obstime: Option<ObservationTime>,
        rsun: f64,
    },
    HeliographicCarrington {
        obstime: Option<ObservationTime>,
        rsun: f64,
    },
    Heliocentric {
        observer: Option<Observer>,
        obstime: Option<ObservationTime>,
    },
    Helioprojective {
        observer: Option<Observer>,
        obstime: Option<ObservationTime>,
        rsun: f64,
    },
}

impl Frame {
    pub fn stonyhurst(obstime: Option<ObservationTime>) -> Self {
        Frame::HeliographicStonyhurst {
            obstime,
            rsun: RSUN_PHOTOSPHERIC,
        }
    }

    pub fn carrington(obstime: Option<ObservationTime>) -> Self {
        Frame::HeliographicCarrington {
            obstime,
            rsun: RSUN_PHOTOSPHERIC,
        }
    }

    pub fn heliocentric(observer: Observer, obstime: ObservationTime) -> Self {
        Frame::Heliocentric {
            observer: Some(observer),
            obstime: Some(obstime),
        }
    }

    pub fn helioprojective(observer: Observer, obstime: ObservationTime) -> Self {
        Frame::Helioprojective {
            observer: Some(observer),
            obstime: Some(obstime),
            rsun: RSUN_PHOTOSPHERIC,
        }
    }

    /// Helioprojective frame of an Earth observer at `obstime`.
    pub fn earth_view(obstime: ObservationTime) -> Self {
        Self::helioprojective(Observer::earth(&obstime), obstime)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Frame::HeliographicStonyhurst { .. } => "heliographic_stonyhurst",
            Frame::HeliographicCarrington { .. } => "heliographic_carrington",
            Frame::Heliocentric { .. } => "heliocentric",
            Frame::Helioprojective { .. } => "helioprojective",
        }
    }

    pub fn obstime(&self) -> Option<ObservationTime> {
        match *self {
            Frame::HeliographicStonyhurst { obstime, .. }
            | Frame::HeliographicCarrington { obstime, .. }
            | Frame::Heliocentric { obstime, .. }
            | Frame::Helioprojective { obstime, .. } => obstime,
        }
    }

    pub fn observer(&self) -> Option<Observer> {
        match *self {
            Frame::Heliocentric { observer, .. } | Frame::Helioprojective { observer, .. } => {
                observer
            }
            _ => None,
        }
    }

    /// Solar radius assumed by this frame. Heliocentric frames carry none
    /// and report the photospheric value.
    pub fn rsun(&self) -> f64 {
        match *self {
            Frame::HeliographicStonyhurst { rsun, .. }
            | Frame::HeliographicCarrington { rsun, .. }
            | Frame::Helioprojective { rsun, .. } => rsun,
            Frame::Heliocentric { .. } => RSUN_PHOTOSPHERIC,
        }
    }

    /// Same frame with a different solar radius; a no-op for heliocentric frames.
    pub fn with_rsun(self, value: f64) -> Self {
        match self {
            Frame::HeliographicStonyhurst { obstime, .. } => Frame::HeliographicStonyhurst {
                obstime,
                rsun: value,
            },
            Frame::HeliographicCarrington { obstime, .. } => Frame::HeliographicCarrington {
                obstime,
                rsun: value,
            },
            Frame::Helioprojective {
                observer, obstime, ..
            } => Frame::Helioprojective {
                observer,
                obstime,
                rsun: value,
            },
            other => other,
        }
    }

    /// Observer of an observer-based frame, or a configuration error.
    pub fn require_observer(&self) -> GxResult<Observer> {
        self.observer()
            .ok_or_else(|| GxError::MissingObserver(self.name().to_string()))
    }

    /// Observation time of the frame, or a configuration error.
    pub fn require_obstime(&self) -> GxResult<ObservationTime> {
        self.obstime()
            .ok_or_else(|| GxError::MissingObservationTime(self.name().to_string()))
    }

    /// True for frames whose coordinates are angles on an observer's sky.
    pub fn is_projective(&self) -> bool {
        matches!(self, Frame::Helioprojective { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_observer_and_time() {
        let hgs = Frame::stonyhurst(None);
        assert!(matches!(
            hgs.require_observer(),
            Err(GxError::MissingObserver(_))
        ));
        assert!(matches!(
            hgs.require_obstime(),
            Err(GxError::MissingObservationTime(_))
        ));

        let t = ObservationTime::from_ymd_hms(2014, 11, 1, 16, 40, 0).unwrap();
        let hpc = Frame::earth_view(t);
        assert!(hpc.require_observer().is_ok());
        assert_eq!(hpc.require_obstime().unwrap(), t);
        assert!(hpc.is_projective());
    }

    #[test]
    fn test_with_rsun() {
        let hgs = Frame::stonyhurst(None).with_rsun(696.0e6);
        assert_eq!(hgs.rsun(), 696.0e6);
        assert_eq!(hgs.name(), "heliographic_stonyhurst");
    }
}
