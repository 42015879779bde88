//! Headless viewer for a gxbox simulation box.
//!
//! Builds a box from a YAML config, loads the context and bottom maps
//! cropped to the box's padded field of view, resamples the bottom map onto
//! the box's surface grid and describes the resulting overlay as a
//! serialisable [`scene::OverlayScene`].

pub mod config;
pub mod scene;
pub mod session;

pub use config::{load_config, parse_config, SessionConfig, ViewerConfig};
pub use scene::OverlayScene;
pub use session::ViewerSession;
