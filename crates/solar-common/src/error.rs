//! Error types for the gxbox crates.

use thiserror::Error;

/// Result type alias using GxError.
pub type GxResult<T> = Result<T, GxError>;

/// Coarse classification of a [`GxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad geometry or frame setup, raised before any derivation runs.
    Configuration,
    /// A coordinate transform could not be carried out.
    Projection,
    /// The caller handed in an empty or degenerate input.
    Input,
    /// Image data was missing or malformed.
    Data,
}

/// Primary error type for box geometry, projection and imagery operations.
#[derive(Debug, Error)]
pub enum GxError {
    // === Configuration Errors ===
    #[error("Invalid box dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Frame '{0}' has no observation time")]
    MissingObservationTime(String),

    #[error("Frame '{0}' has no observer")]
    MissingObserver(String),

    #[error("Incompatible frames: {source_frame} -> {target_frame}: {message}")]
    IncompatibleFrames {
        source_frame: String,
        target_frame: String,
        message: String,
    },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid time specification: {0}")]
    InvalidTime(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // === Projection Errors ===
    #[error("Line of sight misses the solar sphere at Tx={tx_arcsec:.2}\", Ty={ty_arcsec:.2}\"")]
    OffDisk { tx_arcsec: f64, ty_arcsec: f64 },

    // === Input Errors ===
    #[error("Cannot project an empty edge list")]
    EmptyEdges,

    #[error("Degenerate pixel grid: {0}")]
    DegenerateGrid(String),

    #[error("Requested region does not overlap the image: {0}")]
    EmptyOverlap(String),

    // === Data Errors ===
    #[error("Map not available: {name}. Available maps: {available}")]
    MapNotAvailable { name: String, available: String },

    #[error("Invalid map data: {0}")]
    InvalidMapData(String),
}

impl GxError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            GxError::InvalidDimensions(_) => "InvalidDimensions",
            GxError::InvalidResolution(_) => "InvalidResolution",
            GxError::MissingObservationTime(_) => "MissingObservationTime",
            GxError::MissingObserver(_) => "MissingObserver",
            GxError::IncompatibleFrames { .. } => "IncompatibleFrames",
            GxError::InvalidParameter { .. } => "InvalidParameterValue",
            GxError::InvalidTime(_) => "InvalidTime",
            GxError::ConfigError(_) => "ConfigError",
            GxError::OffDisk { .. } => "OffDisk",
            GxError::EmptyEdges => "EmptyEdges",
            GxError::DegenerateGrid(_) => "DegenerateGrid",
            GxError::EmptyOverlap(_) => "EmptyOverlap",
            GxError::MapNotAvailable { .. } => "MapNotAvailable",
            GxError::InvalidMapData(_) => "InvalidMapData",
        }
    }

    /// Which class of failure this is.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GxError::InvalidDimensions(_)
            | GxError::InvalidResolution(_)
            | GxError::MissingObservationTime(_)
            | GxError::MissingObserver(_)
            | GxError::InvalidParameter { .. }
            | GxError::InvalidTime(_)
            | GxError::ConfigError(_) => ErrorKind::Configuration,

            GxError::IncompatibleFrames { .. } | GxError::OffDisk { .. } => ErrorKind::Projection,

            GxError::EmptyEdges | GxError::DegenerateGrid(_) | GxError::EmptyOverlap(_) => {
                ErrorKind::Input
            }

            GxError::MapNotAvailable { .. } | GxError::InvalidMapData(_) => ErrorKind::Data,
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an IncompatibleFrames error.
    pub fn incompatible_frames(
        source_frame: impl Into<String>,
        target_frame: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::IncompatibleFrames {
            source_frame: source_frame.into(),
            target_frame: target_frame.into(),
            message: message.into(),
        }
    }

    /// Create a MapNotAvailable error listing what could have been asked for.
    pub fn map_not_available<S: AsRef<str>>(name: impl Into<String>, available: &[S]) -> Self {
        let available = available
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(", ");
        Self::MapNotAvailable {
            name: name.into(),
            available,
        }
    }
}
