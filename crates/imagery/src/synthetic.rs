//! Deterministic stand-in maps.
//!
//! The viewer and the tests run without network access, so full-disk maps
//! are synthesised: a limb-darkened disk for EUV/UV channels and a bipolar
//! active region for the magnetic products.

use projection::{Frame, SkyCoord};
use solar_common::units::{rad_to_arcsec, RSUN_REF_AIA};
use solar_common::{GxError, GxResult};

use crate::cache::MapLoader;
use crate::image::{ImageWcs, MapMeta, SolarImage};

/// Default full-disk grid size in pixels per side.
pub const DEFAULT_SIZE: usize = 440;

/// Default pixel scale in arcseconds.
pub const DEFAULT_SCALE_ARCSEC: f64 = 5.0;

/// Products served when no list is given.
pub const DEFAULT_NAMES: [&str; 7] = [
    "171",
    "1600",
    "magnetogram",
    "field",
    "inclination",
    "azimuth",
    "disambig",
];

const POLE_SEPARATION_ARCSEC: f64 = 30.0;
const POLE_WIDTH_ARCSEC: f64 = 15.0;

/// Loader producing synthetic full-disk maps as seen from one observer.
#[derive(Debug, Clone)]
pub struct SyntheticLoader {
    frame: Frame,
    names: Vec<String>,
    size: usize,
    scale: f64,
    region: (f64, f64),
}

impl SyntheticLoader {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            names: DEFAULT_NAMES.iter().map(|s| s.to_string()).collect(),
            size: DEFAULT_SIZE,
            scale: DEFAULT_SCALE_ARCSEC,
            region: (0.0, 0.0),
        }
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_grid(mut self, size: usize, scale_arcsec: f64) -> Self {
        self.size = size;
        self.scale = scale_arcsec;
        self
    }

    /// Centre the active region at (Tx, Ty) in arcseconds.
    pub fn with_active_region(mut self, tx: f64, ty: f64) -> Self {
        self.region = (tx, ty);
        self
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    fn pixel_value(&self, name: &str, tx: f64, ty: f64, rsun_arcsec: f64) -> f32 {
        let r = tx.hypot(ty);
        let on_disk = r < rsun_arcsec;
        let dx = tx - self.region.0;
        let dy = ty - self.region.1;
        let lobe = |offset: f64| {
            let d2 = (dx - offset).powi(2) + dy.powi(2);
            (-d2 / (2.0 * POLE_WIDTH_ARCSEC.powi(2))).exp()
        };
        let positive = lobe(-POLE_SEPARATION_ARCSEC);
        let negative = lobe(POLE_SEPARATION_ARCSEC);

        let value = match name {
            "magnetogram" | "field" | "inclination" | "azimuth" | "disambig" if !on_disk => f64::NAN,
            "magnetogram" => 1500.0 * (positive - negative),
            "field" => 100.0 + 1400.0 * (positive + negative),
            "inclination" => 90.0 - 70.0 * (5.0 * (positive - negative)).tanh(),
            "azimuth" => (-dx).atan2(dy).to_degrees().rem_euclid(360.0),
            "disambig" => {
                if dx < 0.0 {
                    4.0
                } else {
                    0.0
                }
            }
            _ if on_disk => {
                let mu = (1.0 - (r / rsun_arcsec).powi(2)).sqrt();
                1000.0 * (1.0 - 0.6 * (1.0 - mu)) + 2000.0 * (positive + negative)
            }
            _ => 400.0 * (-(r - rsun_arcsec) / 60.0).exp(),
        };
        value as f32
    }
}

fn unit_for(name: &str) -> Option<&'static str> {
    match name {
        "magnetogram" | "field" => Some("G"),
        "inclination" | "azimuth" => Some("deg"),
        "disambig" => None,
        _ => Some("DN"),
    }
}

impl MapLoader for SyntheticLoader {
    fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn load(&self, name: &str) -> GxResult<SolarImage> {
        if !self.names.iter().any(|n| n == name) {
            return Err(GxError::map_not_available(name, &self.names[..]));
        }
        let obstime = self.frame.require_obstime()?;
        let observer = self.frame.require_observer()?;
        let rsun_arcsec = rad_to_arcsec((RSUN_REF_AIA / observer.radius).asin());

        let crpix = (self.size as f64 + 1.0) / 2.0;
        let wcs = ImageWcs::Helioprojective {
            frame: self.frame,
            crval: (0.0, 0.0),
            cdelt: (self.scale, self.scale),
            crpix: (crpix, crpix),
        };

        let mut data = Vec::with_capacity(self.size * self.size);
        for row in 0..self.size {
            for col in 0..self.size {
                let (tx, ty) = wcs
                    .pixel_to_sky(col as f64, row as f64)
                    .unwrap_or((f64::NAN, f64::NAN));
                data.push(self.pixel_value(name, tx, ty, rsun_arcsec));
            }
        }

        let mut meta = MapMeta::new(name, obstime, observer);
        if let Some(unit) = unit_for(name) {
            meta = meta.with_unit(unit);
        }
        SolarImage::new(meta, wcs, self.size, self.size, data)
    }
}

/// A 50x50 all-NaN placeholder at 10 arcsec per pixel centred on `reference`.
pub fn make_dummy_map(reference: &SkyCoord) -> GxResult<SolarImage> {
    let (tx, ty) = reference.tx_ty_arcsec().ok_or_else(|| {
        GxError::invalid_parameter(
            "reference",
            format!("expected a helioprojective point, got {}", reference.frame().name()),
        )
    })?;
    let frame = *reference.frame();
    let meta = MapMeta::new("dummy", frame.require_obstime()?, frame.require_observer()?);
    let wcs = ImageWcs::Helioprojective {
        frame,
        crval: (tx, ty),
        cdelt: (10.0, 10.0),
        crpix: (25.5, 25.5),
    };
    SolarImage::new(meta, wcs, 50, 50, vec![f32::NAN; 2500])
}
