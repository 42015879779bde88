//! Solar imagery consumed by the box viewer.
//!
//! Images are row-major `f32` grids tagged with a world coordinate system:
//! either a linear helioprojective grid (full-disk telescope images) or a
//! cylindrical equal-area grid on the solar surface (the box's bottom face).
//! This crate crops images to a sky-plane field of view, resamples them onto
//! a box's surface header, derives HMI vector-field products and caches
//! loaded maps for the lifetime of a viewing session.

pub mod cache;
pub mod hmi;
pub mod image;
pub mod interpolation;
pub mod reproject;
pub mod synthetic;

pub use cache::{CacheStats, MapCache, MapLoader, HMI_B_PRODUCTS, HMI_B_SEGMENTS};
pub use image::{ImageSummary, ImageWcs, MapMeta, SolarImage};
pub use interpolation::Interpolation;
pub use synthetic::{make_dummy_map, SyntheticLoader};
