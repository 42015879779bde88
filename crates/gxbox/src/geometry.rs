//! Box corners and edges.
//!
//! All offsets are in metres relative to the box centre, expressed on the
//! axes of the box's heliocentric frame: `x` solar west, `y` solar north,
//! `z` radially outward through the box origin.

use nalgebra::Vector3;
use projection::SkyCoord;
use serde::{Deserialize, Serialize};
use solar_common::units::mm_to_m;
use solar_common::{GxError, GxResult};

/// A 3D offset in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Number of axes on which two points differ.
    pub fn differing_axes(&self, other: &Point3D) -> usize {
        let diff = self.as_vector() - other.as_vector();
        diff.iter().filter(|c| **c != 0.0).count()
    }
}

/// An ordered pair of box corners differing on exactly one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub start: Point3D,
    pub end: Point3D,
}

impl Edge {
    pub fn new(start: Point3D, end: Point3D) -> Self {
        Self { start, end }
    }

    /// Length of the edge in metres.
    pub fn length(&self) -> f64 {
        (self.end.as_vector() - self.start.as_vector()).norm()
    }
}

/// An edge embedded in a frame: its two endpoints as frame-tagged points.
pub type EdgeCoords = [SkyCoord; 2];

/// Box size along (x, y, z) in metres. Every component is finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDimensions {
    x: f64,
    y: f64,
    z: f64,
}

impl BoxDimensions {
    pub fn new(x: f64, y: f64, z: f64) -> GxResult<Self> {
        for (axis, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GxError::InvalidDimensions(format!(
                    "{} component must be a positive length, got {} m",
                    axis, value
                )));
            }
        }
        Ok(Self { x, y, z })
    }

    /// Dimensions given in megametres.
    pub fn from_mm(x: f64, y: f64, z: f64) -> GxResult<Self> {
        Self::new(mm_to_m(x), mm_to_m(y), mm_to_m(z))
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// The 8 corners at `±d/2` on each axis, in x-major, z-minor order.
pub fn compute_corners(dimensions: &BoxDimensions) -> [Point3D; 8] {
    let half = dimensions.as_array().map(|d| d / 2.0);
    let mut corners = [Point3D::new(0.0, 0.0, 0.0); 8];
    let mut i = 0;
    for sx in [-1.0, 1.0] {
        for sy in [-1.0, 1.0] {
            for sz in [-1.0, 1.0] {
                corners[i] = Point3D::new(sx * half[0], sy * half[1], sz * half[2]);
                i += 1;
            }
        }
    }
    corners
}

/// All corner pairs that differ on exactly one axis.
///
/// Face and space diagonals differ on two or three axes and are skipped.
pub fn compute_edges(corners: &[Point3D]) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(12);
    for (i, a) in corners.iter().enumerate() {
        for b in &corners[i + 1..] {
            if a.differing_axes(b) == 1 {
                edges.push(Edge::new(*a, *b));
            }
        }
    }
    edges
}

/// Split edges into those lying in the lowest face and the rest.
///
/// Corner heights come from the same `±d/2` construction, so the minimum
/// is compared exactly.
pub fn classify_edges(corners: &[Point3D], edges: &[Edge]) -> (Vec<Edge>, Vec<Edge>) {
    let min_z = corners.iter().map(|c| c.z).fold(f64::INFINITY, f64::min);
    edges
        .iter()
        .partition(|e| e.start.z == min_z && e.end.z == min_z)
}

/// Anchor an edge at `center` by adding its offsets to the centre's coordinates.
///
/// `center` must be a heliocentric Cartesian point; the result lives in the
/// same frame.
pub fn edge_to_frame_points(edge: &Edge, center: &SkyCoord) -> GxResult<EdgeCoords> {
    let origin = center.cartesian().ok_or_else(|| {
        GxError::invalid_parameter(
            "center",
            format!(
                "edges are anchored on a heliocentric point, got a {} coordinate",
                center.frame().name()
            ),
        )
    })?;
    let frame = *center.frame();
    Ok([
        SkyCoord::heliocentric(frame, origin + edge.start.as_vector())?,
        SkyCoord::heliocentric(frame, origin + edge.end.as_vector())?,
    ])
}
