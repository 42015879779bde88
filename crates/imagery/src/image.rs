//! Solar image model and sub-region extraction.

use gxbox::{CoordRange, CornerBounds};
use projection::{CeaProjection, Frame, Observer, SkyCoord};
use serde::{Deserialize, Serialize};
use solar_common::units::RSUN_REF_AIA;
use solar_common::{BoundingBox, GxError, GxResult, ObservationTime};
use tracing::debug;

/// Descriptive metadata carried by every image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMeta {
    /// Product name, e.g. `171` or `br`
    pub name: String,
    pub date_obs: ObservationTime,
    /// Solar radius reference in metres
    pub rsun_ref: f64,
    pub observer: Observer,
    pub unit: Option<String>,
}

impl MapMeta {
    pub fn new(name: impl Into<String>, date_obs: ObservationTime, observer: Observer) -> Self {
        Self {
            name: name.into(),
            date_obs,
            rsun_ref: RSUN_REF_AIA,
            observer,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_rsun_ref(mut self, rsun_ref: f64) -> Self {
        self.rsun_ref = rsun_ref;
        self
    }
}

/// World coordinate system of an image.
///
/// Pixel indices are zero-based `(col, row)`; row 0 is the southernmost
/// row, so rows grow with Ty or latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageWcs {
    /// Linear helioprojective grid, angles in arcseconds.
    Helioprojective {
        frame: Frame,
        crval: (f64, f64),
        cdelt: (f64, f64),
        /// One-based reference pixel (column, row)
        crpix: (f64, f64),
    },
    /// Cylindrical equal-area grid on the solar surface.
    Cea {
        frame: Frame,
        projection: CeaProjection,
    },
}

impl ImageWcs {
    pub fn frame(&self) -> &Frame {
        match self {
            ImageWcs::Helioprojective { frame, .. } | ImageWcs::Cea { frame, .. } => frame,
        }
    }

    /// Sky angles (Tx, Ty) in arcseconds of a helioprojective pixel.
    pub fn pixel_to_sky(&self, col: f64, row: f64) -> Option<(f64, f64)> {
        match self {
            ImageWcs::Helioprojective {
                crval, cdelt, crpix, ..
            } => Some((
                crval.0 + cdelt.0 * (col + 1.0 - crpix.0),
                crval.1 + cdelt.1 * (row + 1.0 - crpix.1),
            )),
            ImageWcs::Cea { .. } => None,
        }
    }

    /// Fractional pixel of sky angles in arcseconds.
    pub fn sky_to_pixel(&self, tx: f64, ty: f64) -> Option<(f64, f64)> {
        match self {
            ImageWcs::Helioprojective {
                crval, cdelt, crpix, ..
            } => Some((
                (tx - crval.0) / cdelt.0 + crpix.0 - 1.0,
                (ty - crval.1) / cdelt.1 + crpix.1 - 1.0,
            )),
            ImageWcs::Cea { .. } => None,
        }
    }

    /// World coordinate of a pixel centre.
    ///
    /// Helioprojective pixels are placed on the solar sphere, so pixels off
    /// the disk yield `None`.
    pub fn pixel_to_world(&self, col: f64, row: f64) -> Option<SkyCoord> {
        match self {
            ImageWcs::Helioprojective { frame, .. } => {
                let (tx, ty) = self.pixel_to_sky(col, row)?;
                let on_sky = SkyCoord::helioprojective(*frame, tx, ty).ok()?;
                let hgs = Frame::stonyhurst(frame.obstime()).with_rsun(frame.rsun());
                on_sky.transform_to(&hgs).ok()
            }
            ImageWcs::Cea { frame, projection } => {
                let (lon, lat) = projection.pixel_to_world(col, row)?;
                SkyCoord::heliographic(*frame, lon, lat, frame.rsun()).ok()
            }
        }
    }

    /// Fractional pixel of a world point, `None` where the image cannot see it.
    ///
    /// Surface points on the far side of the Sun from a helioprojective
    /// image's observer are hidden.
    pub fn world_to_pixel(&self, point: &SkyCoord) -> Option<(f64, f64)> {
        match self {
            ImageWcs::Helioprojective { frame, .. } => {
                let observer = frame.observer()?;
                let hcc_frame = Frame::Heliocentric {
                    observer: Some(observer),
                    obstime: frame.obstime(),
                };
                let hcc = point.transform_to(&hcc_frame).ok()?;
                let v = hcc.cartesian()?;
                let radius = v.norm();
                if v.z * observer.radius <= radius * radius {
                    return None;
                }
                let (tx, ty) = hcc.transform_to(frame).ok()?.tx_ty_arcsec()?;
                self.sky_to_pixel(tx, ty)
            }
            ImageWcs::Cea { frame, projection } => {
                let (lon, lat) = point.transform_to(frame).ok()?.lon_lat_deg()?;
                Some(projection.world_to_pixel(lon, lat))
            }
        }
    }
}

/// Compact description of an image for scene output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
    /// Share of pixels holding a finite value
    pub coverage: f64,
    /// Sky extent in arcseconds, for helioprojective images
    pub extent: Option<BoundingBox>,
}

/// A row-major `f32` image with its coordinate system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarImage {
    pub meta: MapMeta,
    pub wcs: ImageWcs,
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl SolarImage {
    pub fn new(meta: MapMeta, wcs: ImageWcs, width: usize, height: usize, data: Vec<f32>) -> GxResult<Self> {
        if width == 0 || height == 0 {
            return Err(GxError::InvalidMapData(format!(
                "{}: empty {}x{} grid",
                meta.name, width, height
            )));
        }
        if data.len() != width * height {
            return Err(GxError::InvalidMapData(format!(
                "{}: {} values for a {}x{} grid",
                meta.name,
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            meta,
            wcs,
            width,
            height,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.data[row * self.width + col])
    }

    /// Same grid and coordinates with new values and a new name.
    pub fn with_data(&self, name: &str, data: Vec<f32>) -> GxResult<Self> {
        let meta = MapMeta {
            name: name.to_string(),
            ..self.meta.clone()
        };
        Self::new(meta, self.wcs, self.width, self.height, data)
    }

    /// Sky extent of a helioprojective image, pixel edges included.
    pub fn sky_extent(&self) -> Option<BoundingBox> {
        let (x0, y0) = self.wcs.pixel_to_sky(-0.5, -0.5)?;
        let (x1, y1) = self
            .wcs
            .pixel_to_sky(self.width as f64 - 0.5, self.height as f64 - 0.5)?;
        Some(BoundingBox::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)))
    }

    /// Crop a helioprojective image to the pixels whose centres fall in `bbox`.
    pub fn submap(&self, bbox: &BoundingBox) -> GxResult<SolarImage> {
        let (frame, crval, cdelt, crpix) = match self.wcs {
            ImageWcs::Helioprojective {
                frame,
                crval,
                cdelt,
                crpix,
            } => (frame, crval, cdelt, crpix),
            ImageWcs::Cea { .. } => {
                return Err(GxError::invalid_parameter(
                    "submap",
                    format!("{} is not a helioprojective image", self.meta.name),
                ))
            }
        };

        let (c0, r0) = self.wcs.sky_to_pixel(bbox.min_x, bbox.min_y).unwrap_or((f64::NAN, f64::NAN));
        let (c1, r1) = self.wcs.sky_to_pixel(bbox.max_x, bbox.max_y).unwrap_or((f64::NAN, f64::NAN));
        let col_range = pixel_span(c0.min(c1), c0.max(c1), self.width);
        let row_range = pixel_span(r0.min(r1), r0.max(r1), self.height);

        let ((col_start, col_end), (row_start, row_end)) = match (col_range, row_range) {
            (Some(cols), Some(rows)) => (cols, rows),
            _ => {
                return Err(GxError::EmptyOverlap(format!(
                    "{} does not cover Tx [{:.1}, {:.1}], Ty [{:.1}, {:.1}]",
                    self.meta.name, bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y
                )))
            }
        };

        let width = col_end - col_start;
        let height = row_end - row_start;
        let mut data = Vec::with_capacity(width * height);
        for row in row_start..row_end {
            let offset = row * self.width;
            data.extend_from_slice(&self.data[offset + col_start..offset + col_end]);
        }

        debug!(
            name = %self.meta.name,
            cols = width,
            rows = height,
            "Cropped image to field of view"
        );

        let wcs = ImageWcs::Helioprojective {
            frame,
            crval,
            cdelt,
            crpix: (crpix.0 - col_start as f64, crpix.1 - row_start as f64),
        };
        SolarImage::new(self.meta.clone(), wcs, width, height, data)
    }

    pub fn submap_range(&self, range: &CoordRange) -> GxResult<SolarImage> {
        self.submap(&range.to_bbox())
    }

    pub fn submap_corners(&self, corners: &CornerBounds) -> GxResult<SolarImage> {
        self.submap(&corners.to_bbox()?)
    }

    pub fn summary(&self) -> ImageSummary {
        let finite: Vec<f32> = self.data.iter().copied().filter(|v| v.is_finite()).collect();
        let min = finite.iter().copied().reduce(f32::min);
        let max = finite.iter().copied().reduce(f32::max);
        ImageSummary {
            name: self.meta.name.clone(),
            width: self.width,
            height: self.height,
            min,
            max,
            coverage: finite.len() as f64 / self.data.len() as f64,
            extent: self.sky_extent(),
        }
    }
}

/// Half-open range of pixel indices whose centres lie in `[lo, hi]`.
fn pixel_span(lo: f64, hi: f64, len: usize) -> Option<(usize, usize)> {
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let start = lo.ceil().max(0.0);
    let end = (hi.floor() + 1.0).min(len as f64);
    if end <= start {
        return None;
    }
    Some((start as usize, end as usize))
}
