//! Solar coordinate frames and projections.
//!
//! Implements the heliographic, heliocentric and helioprojective frames and
//! the transforms between them from scratch, without a frame-graph library.
//! Every transform is an explicit function of the two frame variants.

pub mod cea;
pub mod coord;
pub mod ephemeris;
pub mod frame;
pub mod transform;

pub use cea::CeaProjection;
pub use coord::{CoordData, SkyCoord};
pub use ephemeris::{b0, carrington_l0, sun_distance_au, Observer};
pub use frame::Frame;
pub use transform::transform_to;
