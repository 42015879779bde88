//! Solar simulation box.
//!
//! A box is anchored tangent to the solar surface at an origin point and
//! described in the heliocentric frame whose `z` axis passes through that
//! origin. This crate derives its corners and edges, projects them onto an
//! observer's sky plane, and builds the CEA header that maps imagery onto
//! the box's bottom face.
//!
//! # Example
//!
//! ```ignore
//! use gxbox::{BoxDimensions, SimBox};
//! use projection::{Frame, SkyCoord};
//!
//! let frame = Frame::earth_view(time);
//! let origin = SkyCoord::helioprojective(frame, -632.0, -135.0)?;
//! let dims = BoxDimensions::from_mm(150.0, 150.0, 100.0)?;
//! let simbox = SimBox::new(frame, &origin, dims, 0.6e6)?;
//!
//! let fov = simbox.bl_tr_pad_coords()?;
//! let header = simbox.bottom_cea_header();
//! ```

pub mod bounds;
pub mod geometry;
pub mod header;
pub mod simbox;

pub use bounds::{CoordRange, CornerBounds, PadConfig};
pub use geometry::{BoxDimensions, Edge, EdgeCoords, Point3D};
pub use header::{CardValue, ProjectionCode, SurfaceHeader, MAX_GRID_SIDE};
pub use simbox::SimBox;
