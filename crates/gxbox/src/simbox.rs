//! The simulation box: a value built once from an origin, dimensions and a
//! resolution, carrying its edges in the box frame and its surface header.

use projection::{Frame, Observer, SkyCoord};
use solar_common::units::m_to_mm;
use solar_common::{GxError, GxResult};
use tracing::debug;

use crate::bounds::{self, CoordRange, CornerBounds, PadConfig};
use crate::geometry::{
    classify_edges, compute_corners, compute_edges, edge_to_frame_points, BoxDimensions, Edge,
    EdgeCoords, Point3D,
};
use crate::header::SurfaceHeader;

/// A box tangent to the solar surface at its origin.
///
/// The box frame is heliocentric with the origin as its observer, so `z`
/// runs along the local vertical and the bottom face lies in the tangent
/// plane. The centre sits half a height above the origin.
#[derive(Debug, Clone)]
pub struct SimBox {
    observer_frame: Frame,
    box_frame: Frame,
    origin: SkyCoord,
    center: SkyCoord,
    dimensions: BoxDimensions,
    resolution: f64,
    corners: [Point3D; 8],
    edges: Vec<Edge>,
    bottom_edges: Vec<EdgeCoords>,
    other_edges: Vec<EdgeCoords>,
    header: SurfaceHeader,
    pad: PadConfig,
}

impl SimBox {
    /// Build a box seen from `observer_frame`.
    ///
    /// `origin` may be given in any frame sharing the observer frame's
    /// observation time; `resolution` is in metres. All configuration is
    /// validated before any edge is computed.
    pub fn new(
        observer_frame: Frame,
        origin: &SkyCoord,
        dimensions: BoxDimensions,
        resolution: f64,
    ) -> GxResult<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(GxError::InvalidResolution(format!(
                "resolution must be a positive length, got {} m",
                resolution
            )));
        }
        if !observer_frame.is_projective() {
            return Err(GxError::incompatible_frames(
                origin.frame().name(),
                observer_frame.name(),
                "the observer frame must be helioprojective",
            ));
        }
        observer_frame.require_observer()?;
        let obstime = observer_frame.require_obstime()?;

        let hgs = Frame::stonyhurst(Some(obstime)).with_rsun(origin.frame().rsun());
        let origin_hgs = origin.transform_to(&hgs)?;
        let (lon, lat) = origin_hgs
            .lon_lat_deg()
            .ok_or_else(|| GxError::invalid_parameter("origin", "no heliographic position"))?;
        let radius = origin_hgs.radius().unwrap_or(hgs.rsun());

        let box_frame = Frame::heliocentric(Observer::from_degrees(lon, lat, radius), obstime);
        let anchor = origin_hgs
            .transform_to(&box_frame)?
            .cartesian()
            .ok_or_else(|| GxError::invalid_parameter("origin", "no heliocentric position"))?;
        let mut lifted = anchor;
        lifted.z += dimensions.z() / 2.0;
        let center = SkyCoord::heliocentric(box_frame, lifted)?;

        let header = SurfaceHeader::derive(&origin_hgs, &dimensions, resolution)?;

        let corners = compute_corners(&dimensions);
        let edges = compute_edges(&corners);
        let (bottom, other) = classify_edges(&corners, &edges);
        let bottom_edges = bottom
            .iter()
            .map(|e| edge_to_frame_points(e, &center))
            .collect::<GxResult<Vec<_>>>()?;
        let other_edges = other
            .iter()
            .map(|e| edge_to_frame_points(e, &center))
            .collect::<GxResult<Vec<_>>>()?;

        debug!(
            lon_deg = lon,
            lat_deg = lat,
            dims_mm = ?dimensions.as_array().map(m_to_mm),
            resolution_mm = m_to_mm(resolution),
            bottom = bottom_edges.len(),
            other = other_edges.len(),
            "Constructed simulation box"
        );

        Ok(Self {
            observer_frame,
            box_frame,
            origin: origin_hgs,
            center,
            dimensions,
            resolution,
            corners,
            edges,
            bottom_edges,
            other_edges,
            header,
            pad: PadConfig::default(),
        })
    }

    /// Same box with a different padding policy for the field of view.
    pub fn with_pad(mut self, pad: PadConfig) -> Self {
        self.pad = pad;
        self
    }

    pub fn observer_frame(&self) -> &Frame {
        &self.observer_frame
    }

    pub fn box_frame(&self) -> &Frame {
        &self.box_frame
    }

    /// Tangent point in Stonyhurst coordinates.
    pub fn origin(&self) -> &SkyCoord {
        &self.origin
    }

    /// Box centre in the box frame.
    pub fn center(&self) -> &SkyCoord {
        &self.center
    }

    pub fn dimensions(&self) -> &BoxDimensions {
        &self.dimensions
    }

    /// Resolution in metres.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn corners(&self) -> &[Point3D; 8] {
        &self.corners
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn pad_config(&self) -> &PadConfig {
        &self.pad
    }

    pub fn bottom_edges(&self) -> &[EdgeCoords] {
        &self.bottom_edges
    }

    pub fn other_edges(&self) -> &[EdgeCoords] {
        &self.other_edges
    }

    /// Bottom edges followed by the rest.
    pub fn all_edges(&self) -> Vec<EdgeCoords> {
        let mut all = Vec::with_capacity(self.bottom_edges.len() + self.other_edges.len());
        all.extend_from_slice(&self.bottom_edges);
        all.extend_from_slice(&self.other_edges);
        all
    }

    /// Tight range over every edge in the observer frame.
    pub fn bounds_coords(&self) -> GxResult<CoordRange> {
        bounds::as_coordinate_range(&self.all_edges(), &self.observer_frame)
    }

    /// Tight range over the bottom face only.
    pub fn bottom_bounds_coords(&self) -> GxResult<CoordRange> {
        bounds::as_coordinate_range(&self.bottom_edges, &self.observer_frame)
    }

    /// Tight corners over every edge.
    pub fn bl_tr_coords(&self) -> GxResult<CornerBounds> {
        let bbox = bounds::tight_bounds(&self.all_edges(), &self.observer_frame)?;
        CornerBounds::from_bbox(&bbox, &self.observer_frame)
    }

    /// Padded corners over every edge, the field of view used for cropping.
    pub fn bl_tr_pad_coords(&self) -> GxResult<CornerBounds> {
        let bbox = bounds::padded_bounds(&self.all_edges(), &self.observer_frame, &self.pad)?;
        CornerBounds::from_bbox(&bbox, &self.observer_frame)
    }

    /// Edges projected onto the observer's sky, bottom edges first.
    pub fn projected_edges(&self) -> GxResult<(Vec<bounds::ProjectedEdge>, Vec<bounds::ProjectedEdge>)> {
        Ok((
            bounds::project(&self.bottom_edges, &self.observer_frame)?,
            bounds::project(&self.other_edges, &self.observer_frame)?,
        ))
    }

    pub fn bottom_cea_header(&self) -> &SurfaceHeader {
        &self.header
    }
}
