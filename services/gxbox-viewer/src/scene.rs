//! Drawable description of the current view.
//!
//! The scene holds everything a front end needs to draw the box over the
//! context map: projected edges with their line styles, the bounds
//! quadrangle, the padded field of view and the outline of the resampled
//! bottom map. All sky positions are `(Tx, Ty)` in arcseconds.

use gxbox::{CardValue, SimBox, SurfaceHeader};
use imagery::{ImageSummary, SolarImage};
use projection::{Frame, Observer, SkyCoord};
use serde::{Deserialize, Serialize};
use solar_common::units::rad_to_arcsec;
use solar_common::{BoundingBox, GxResult};

/// Width of the viewer window in pixels.
pub const WINDOW_WIDTH: u32 = 800;

/// Room below the map for the toolbar and map selectors.
pub const WINDOW_CONTROLS_HEIGHT: u32 = 150;

const FOOTPRINT_SAMPLES_PER_SIDE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Bottom,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dash {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub dash: Dash,
    pub width: f64,
}

impl LineStyle {
    fn new(color: &str, dash: Dash, width: f64) -> Self {
        Self {
            color: color.to_string(),
            dash,
            width,
        }
    }

    /// Edges of the bottom face.
    pub fn bottom_edge() -> Self {
        Self::new("tab:red", Dash::Dashed, 0.5)
    }

    pub fn other_edge() -> Self {
        Self::new("tab:red", Dash::Solid, 1.0)
    }

    pub fn bounds() -> Self {
        Self::new("tab:blue", Dash::Dashed, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEdge {
    pub kind: EdgeKind,
    pub start: (f64, f64),
    pub end: (f64, f64),
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quadrangle {
    pub bottom_left: (f64, f64),
    pub top_right: (f64, f64),
    pub style: LineStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    /// Fixed width, map aspect ratio, plus room for controls.
    pub fn for_map(map: &SolarImage) -> Self {
        let aspect = if map.width == 0 {
            1.0
        } else {
            map.height as f64 / map.width as f64
        };
        Self {
            width: WINDOW_WIDTH,
            height: (WINDOW_WIDTH as f64 * aspect) as u32 + WINDOW_CONTROLS_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayScene {
    pub date_obs: String,
    pub observer: Observer,
    /// Apparent radius of the context map's solar limb
    pub limb_radius_arcsec: f64,
    pub window: WindowSize,
    pub context: ImageSummary,
    pub bottom: ImageSummary,
    pub edges: Vec<SceneEdge>,
    pub bounds: Quadrangle,
    pub field_of_view: BoundingBox,
    /// Outline of the bottom map's surface grid on the sky, closed
    pub bottom_footprint: Vec<(f64, f64)>,
    pub surface_header: Vec<(String, CardValue)>,
}

impl OverlayScene {
    pub fn build(
        simbox: &SimBox,
        header: &SurfaceHeader,
        context: &SolarImage,
        bottom: &SolarImage,
    ) -> GxResult<Self> {
        let frame = simbox.observer_frame();
        let observer = frame.require_observer()?;

        let (bottom_edges, other_edges) = simbox.projected_edges()?;
        let mut edges = Vec::with_capacity(bottom_edges.len() + other_edges.len());
        for (kind, style, projected) in [
            (EdgeKind::Bottom, LineStyle::bottom_edge(), bottom_edges),
            (EdgeKind::Other, LineStyle::other_edge(), other_edges),
        ] {
            edges.extend(projected.into_iter().map(|[start, end]| SceneEdge {
                kind,
                start,
                end,
                style: style.clone(),
            }));
        }

        let range = simbox.bounds_coords()?;
        let bounds = Quadrangle {
            bottom_left: (range.tx[0], range.ty[0]),
            top_right: (range.tx[1], range.ty[1]),
            style: LineStyle::bounds(),
        };

        Ok(Self {
            date_obs: header.date_obs.to_fits_string(),
            observer,
            limb_radius_arcsec: rad_to_arcsec((context.meta.rsun_ref / observer.radius).asin()),
            window: WindowSize::for_map(context),
            context: context.summary(),
            bottom: bottom.summary(),
            edges,
            bounds,
            field_of_view: simbox.bl_tr_pad_coords()?.to_bbox()?,
            bottom_footprint: footprint(header, frame)?,
            surface_header: header.to_fits_cards(),
        })
    }
}

/// Boundary of the header's pixel grid projected onto `frame`'s sky.
fn footprint(header: &SurfaceHeader, frame: &Frame) -> GxResult<Vec<(f64, f64)>> {
    let projection = header.projection();
    let surface = Frame::stonyhurst(Some(header.date_obs)).with_rsun(header.rsun_ref);
    let (rows, cols) = header.shape;
    let (left, right) = (-0.5, cols as f64 - 0.5);
    let (bottom, top) = (-0.5, rows as f64 - 0.5);

    let n = FOOTPRINT_SAMPLES_PER_SIDE;
    let lerp = |a: f64, b: f64, i: usize| a + (b - a) * i as f64 / n as f64;
    let mut outline = Vec::with_capacity(4 * n + 1);
    for i in 0..n {
        outline.push((lerp(left, right, i), bottom));
    }
    for i in 0..n {
        outline.push((right, lerp(bottom, top, i)));
    }
    for i in 0..n {
        outline.push((lerp(right, left, i), top));
    }
    for i in 0..n {
        outline.push((left, lerp(top, bottom, i)));
    }
    outline.push((left, bottom));

    let mut points = Vec::with_capacity(outline.len());
    for (col, row) in outline {
        let Some((lon, lat)) = projection.pixel_to_world(col, row) else {
            continue;
        };
        let on_sky = SkyCoord::heliographic(surface, lon, lat, header.rsun_ref)?.transform_to(frame)?;
        if let Some(point) = on_sky.tx_ty_arcsec() {
            points.push(point);
        }
    }
    Ok(points)
}
