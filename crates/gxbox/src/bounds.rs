//! Sky-plane bounds of projected box edges.

use projection::{Frame, SkyCoord};
use serde::{Deserialize, Serialize};
use solar_common::{BoundingBox, GxError, GxResult};

use crate::geometry::EdgeCoords;

/// A projected edge: two (Tx, Ty) points in arcseconds.
pub type ProjectedEdge = [(f64, f64); 2];

/// Padding policy for field-of-view bounds.
///
/// The pad applied to every side is `fraction * max(width, height, floor_arcsec)`,
/// so tiny boxes still get a visible margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadConfig {
    pub fraction: f64,
    pub floor_arcsec: f64,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            fraction: 0.3,
            floor_arcsec: 20.0,
        }
    }
}

impl PadConfig {
    /// Pad in arcseconds for a box of the given extent.
    pub fn pad_for(&self, bbox: &BoundingBox) -> f64 {
        self.fraction * bbox.width().max(bbox.height()).max(self.floor_arcsec)
    }
}

/// Bottom-left and top-right corners in the observer frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerBounds {
    pub bottom_left: SkyCoord,
    pub top_right: SkyCoord,
}

impl CornerBounds {
    pub fn from_bbox(bbox: &BoundingBox, frame: &Frame) -> GxResult<Self> {
        Ok(Self {
            bottom_left: SkyCoord::helioprojective(*frame, bbox.min_x, bbox.min_y)?,
            top_right: SkyCoord::helioprojective(*frame, bbox.max_x, bbox.max_y)?,
        })
    }

    /// Numeric bounds in arcseconds. Both corners must be helioprojective.
    pub fn to_bbox(&self) -> GxResult<BoundingBox> {
        let corner = |coord: &SkyCoord| {
            coord.tx_ty_arcsec().ok_or_else(|| {
                GxError::invalid_parameter(
                    "corner",
                    format!("{} corner has no sky-plane angles", coord.frame().name()),
                )
            })
        };
        let (x0, y0) = corner(&self.bottom_left)?;
        let (x1, y1) = corner(&self.top_right)?;
        Ok(BoundingBox::new(x0, y0, x1, y1))
    }
}

/// Paired `[min, max]` Tx and Ty ranges in the observer frame, used for cropping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordRange {
    pub frame: Frame,
    pub tx: [f64; 2],
    pub ty: [f64; 2],
}

impl CoordRange {
    pub fn from_bbox(bbox: &BoundingBox, frame: &Frame) -> Self {
        Self {
            frame: *frame,
            tx: [bbox.min_x, bbox.max_x],
            ty: [bbox.min_y, bbox.max_y],
        }
    }

    pub fn to_bbox(&self) -> BoundingBox {
        BoundingBox::new(self.tx[0], self.ty[0], self.tx[1], self.ty[1])
    }

    pub fn corners(&self) -> GxResult<CornerBounds> {
        CornerBounds::from_bbox(&self.to_bbox(), &self.frame)
    }
}

fn require_projective(target: &Frame) -> GxResult<()> {
    if !target.is_projective() {
        return Err(GxError::incompatible_frames(
            "box edges",
            target.name(),
            "sky-plane bounds need a helioprojective target frame",
        ));
    }
    Ok(())
}

/// Project every edge endpoint onto the sky plane of `target`.
pub fn project(edges: &[EdgeCoords], target: &Frame) -> GxResult<Vec<ProjectedEdge>> {
    if edges.is_empty() {
        return Err(GxError::EmptyEdges);
    }
    require_projective(target)?;

    edges
        .iter()
        .map(|[a, b]| {
            let pa = sky_point(a, target)?;
            let pb = sky_point(b, target)?;
            Ok([pa, pb])
        })
        .collect()
}

fn sky_point(coord: &SkyCoord, target: &Frame) -> GxResult<(f64, f64)> {
    coord
        .transform_to(target)?
        .tx_ty_arcsec()
        .ok_or_else(|| GxError::incompatible_frames(coord.frame().name(), target.name(), "no sky-plane angles"))
}

/// Tight min/max over every projected endpoint.
pub fn tight_bounds(edges: &[EdgeCoords], target: &Frame) -> GxResult<BoundingBox> {
    let projected = project(edges, target)?;
    BoundingBox::from_points(projected.iter().flat_map(|edge| edge.iter().copied()))
        .filter(BoundingBox::is_finite)
        .ok_or_else(|| GxError::incompatible_frames("box edges", target.name(), "projected bounds are not finite"))
}

/// Tight bounds grown symmetrically by the pad policy.
pub fn padded_bounds(edges: &[EdgeCoords], target: &Frame, pad: &PadConfig) -> GxResult<BoundingBox> {
    let tight = tight_bounds(edges, target)?;
    Ok(tight.expand(pad.pad_for(&tight)))
}

/// Tight bounds as a paired coordinate range.
pub fn as_coordinate_range(edges: &[EdgeCoords], target: &Frame) -> GxResult<CoordRange> {
    Ok(CoordRange::from_bbox(&tight_bounds(edges, target)?, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::solar;

    #[test]
    fn test_pad_uses_floor_for_small_boxes() {
        let pad = PadConfig::default();
        let small = BoundingBox::new(0.0, 0.0, 5.0, 2.0);
        assert_eq!(pad.pad_for(&small), 0.3 * 20.0);

        let large = BoundingBox::new(0.0, 0.0, 200.0, 150.0);
        assert_eq!(pad.pad_for(&large), 0.3 * 200.0);
    }

    #[test]
    fn test_range_and_corners_agree() {
        let frame = Frame::stonyhurst(None);
        let bbox = BoundingBox::new(-650.0, -160.0, -540.0, -40.0);
        let range = CoordRange::from_bbox(&bbox, &frame);
        assert_eq!(range.to_bbox(), bbox);
        // Corner pairs need a helioprojective frame.
        assert!(range.corners().is_err());
    }

    #[test]
    fn test_corners_must_be_helioprojective() {
        let time = solar::flare_time();
        let hpc = Frame::earth_view(time);
        let bbox = BoundingBox::new(-650.0, -160.0, -540.0, -40.0);
        let corners = CornerBounds::from_bbox(&bbox, &hpc).unwrap();
        assert_eq!(corners.to_bbox().unwrap(), bbox);

        let surface = Frame::stonyhurst(Some(time));
        let mixed = CornerBounds {
            bottom_left: SkyCoord::heliographic(surface, -40.0, -10.0, surface.rsun()).unwrap(),
            ..corners
        };
        let err = mixed.to_bbox().unwrap_err();
        assert!(matches!(err, GxError::InvalidParameter { .. }));
    }

    #[test]
    fn test_non_finite_projection_is_a_frame_error() {
        let time = solar::flare_time();
        let surface = Frame::stonyhurst(Some(time));
        let rsun = surface.rsun();
        let edge = [
            SkyCoord::heliographic(surface, f64::NAN, 0.0, rsun).unwrap(),
            SkyCoord::heliographic(surface, -40.0, -10.0, rsun).unwrap(),
        ];
        let err = tight_bounds(&[edge], &Frame::earth_view(time)).unwrap_err();
        assert!(matches!(err, GxError::IncompatibleFrames { .. }));
    }

    #[test]
    fn test_empty_edge_list_is_an_input_error() {
        let err = tight_bounds(&[], &Frame::stonyhurst(None)).unwrap_err();
        assert!(matches!(err, GxError::EmptyEdges));
    }
}
