//! Common types and utilities shared across the gxbox crates.

pub mod bbox;
pub mod error;
pub mod time;
pub mod units;

pub use bbox::BoundingBox;
pub use error::{ErrorKind, GxError, GxResult};
pub use time::ObservationTime;
