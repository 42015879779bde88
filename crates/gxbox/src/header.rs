//! Cylindrical equal-area header for the box's bottom face.

use projection::{CeaProjection, Frame, SkyCoord};
use serde::{Deserialize, Serialize};
use solar_common::units::m_to_mm;
use solar_common::{GxError, GxResult, ObservationTime};
use tracing::{debug, warn};

use crate::geometry::BoxDimensions;

/// Map projection codes supported for surface headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionCode {
    #[serde(rename = "CEA")]
    Cea,
}

impl ProjectionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionCode::Cea => "CEA",
        }
    }
}

/// Value of a single header card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Pixel grid that covers the box's bottom face on the solar surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceHeader {
    /// Grid shape as (rows, cols)
    pub shape: (usize, usize),
    /// Pixel scale in degrees per pixel, equal on both axes
    pub scale: f64,
    /// Stonyhurst reference coordinate at the grid centre
    pub reference: SkyCoord,
    /// One-based reference pixel (column, row)
    pub reference_pixel: (f64, f64),
    /// Solar radius reference in metres
    pub rsun_ref: f64,
    pub date_obs: ObservationTime,
    pub projection: ProjectionCode,
}

/// Largest number of pixels along either side of the bottom grid.
pub const MAX_GRID_SIDE: usize = 16_384;

fn grid_side(extent: f64, resolution: f64) -> GxResult<usize> {
    let side = (extent / resolution).ceil();
    if !side.is_finite() || side > MAX_GRID_SIDE as f64 {
        warn!(extent_mm = m_to_mm(extent), resolution_mm = m_to_mm(resolution), "Grid too large");
        return Err(GxError::DegenerateGrid(format!(
            "{} Mm at {} Mm resolution needs more than {} pixels per side",
            m_to_mm(extent),
            m_to_mm(resolution),
            MAX_GRID_SIDE
        )));
    }
    Ok(side as usize)
}

impl SurfaceHeader {
    /// Derive the header for a box whose bottom face is centred on `origin`.
    ///
    /// `resolution` is in metres. The pixel scale is the angle subtended at
    /// Sun centre by one resolution element on a sphere of the origin
    /// frame's solar radius.
    pub fn derive(origin: &SkyCoord, dimensions: &BoxDimensions, resolution: f64) -> GxResult<Self> {
        let obstime = origin.frame().require_obstime()?;
        let rsun = origin.frame().rsun();

        if !resolution.is_finite() || resolution <= 0.0 || resolution >= rsun {
            return Err(GxError::InvalidResolution(format!(
                "resolution must lie in (0, {} Mm), got {} Mm",
                m_to_mm(rsun),
                m_to_mm(resolution)
            )));
        }
        if resolution >= dimensions.x() || resolution >= dimensions.y() {
            return Err(GxError::DegenerateGrid(format!(
                "resolution {} Mm does not resolve a {} x {} Mm face",
                m_to_mm(resolution),
                m_to_mm(dimensions.x()),
                m_to_mm(dimensions.y())
            )));
        }

        let rows = grid_side(dimensions.y(), resolution)?;
        let cols = grid_side(dimensions.x(), resolution)?;

        let hgs = Frame::stonyhurst(Some(obstime)).with_rsun(rsun);
        let reference = origin.transform_to(&hgs)?;

        let scale = (resolution / rsun).asin().to_degrees();

        debug!(
            rows = rows,
            cols = cols,
            scale_deg = scale,
            rsun_mm = m_to_mm(rsun),
            "Derived bottom CEA header"
        );

        Ok(Self {
            shape: (rows, cols),
            scale,
            reference,
            reference_pixel: ((cols as f64 + 1.0) / 2.0, (rows as f64 + 1.0) / 2.0),
            rsun_ref: rsun,
            date_obs: obstime,
            projection: ProjectionCode::Cea,
        })
    }

    /// Replace the solar radius reference, usually with the context map's.
    ///
    /// Only the recorded reference changes; the pixel scale keeps the value
    /// the box was derived with.
    pub fn with_rsun_ref(mut self, rsun_ref: f64) -> GxResult<Self> {
        if !rsun_ref.is_finite() || rsun_ref <= 0.0 {
            return Err(GxError::invalid_parameter(
                "rsun_ref",
                format!("must be a positive length in metres, got {}", rsun_ref),
            ));
        }
        if (rsun_ref - self.rsun_ref).abs() > 1.0 {
            warn!(
                from_mm = m_to_mm(self.rsun_ref),
                to_mm = m_to_mm(rsun_ref),
                "Overriding surface header rsun_ref"
            );
        }
        self.rsun_ref = rsun_ref;
        Ok(self)
    }

    /// Reference (lon, lat) in degrees.
    pub fn reference_lon_lat(&self) -> (f64, f64) {
        self.reference.lon_lat_deg().unwrap_or((f64::NAN, f64::NAN))
    }

    pub fn rows(&self) -> usize {
        self.shape.0
    }

    pub fn cols(&self) -> usize {
        self.shape.1
    }

    /// Total pixels, or `None` when the shape overflows `usize`.
    pub fn pixel_count(&self) -> Option<usize> {
        self.shape.0.checked_mul(self.shape.1)
    }

    /// Pixel math for this grid.
    pub fn projection(&self) -> CeaProjection {
        CeaProjection {
            crval: self.reference_lon_lat(),
            cdelt: (self.scale, self.scale),
            crpix: self.reference_pixel,
            shape: self.shape,
        }
    }

    /// Header as ordered FITS-style cards.
    pub fn to_fits_cards(&self) -> Vec<(String, CardValue)> {
        let (lon, lat) = self.reference_lon_lat();
        let code = self.projection.as_str();
        let cards = [
            ("NAXIS", CardValue::Int(2)),
            ("NAXIS1", CardValue::Int(self.cols() as i64)),
            ("NAXIS2", CardValue::Int(self.rows() as i64)),
            ("CTYPE1", CardValue::Str(format!("HGLN-{}", code))),
            ("CTYPE2", CardValue::Str(format!("HGLT-{}", code))),
            ("CUNIT1", CardValue::Str("deg".to_string())),
            ("CUNIT2", CardValue::Str("deg".to_string())),
            ("CDELT1", CardValue::Float(self.scale)),
            ("CDELT2", CardValue::Float(self.scale)),
            ("CRPIX1", CardValue::Float(self.reference_pixel.0)),
            ("CRPIX2", CardValue::Float(self.reference_pixel.1)),
            ("CRVAL1", CardValue::Float(lon)),
            ("CRVAL2", CardValue::Float(lat)),
            ("DATE-OBS", CardValue::Str(self.date_obs.to_fits_string())),
            ("RSUN_REF", CardValue::Float(self.rsun_ref)),
            ("PV2_1", CardValue::Int(1)),
        ];
        cards.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}
