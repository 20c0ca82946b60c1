//! Environment validation and loading errors.

use std::fmt;

/// Which rule table a validation error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    TerrainLayer,
    SurfaceTexture,
    SurfaceColor,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TerrainLayer => write!(f, "terrain layer"),
            Self::SurfaceTexture => write!(f, "surface texture"),
            Self::SurfaceColor => write!(f, "surface color"),
        }
    }
}

/// Errors raised when an environment is built or loaded.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    /// A threshold range is inverted or non-finite.
    #[error("{rule} {index}: invalid threshold range [{min}, {max}]")]
    InvalidRange {
        rule: RuleKind,
        index: usize,
        min: f32,
        max: f32,
    },

    /// A rule parameter is out of its domain.
    #[error("{rule} {index}: {reason}")]
    InvalidParameter {
        rule: RuleKind,
        index: usize,
        reason: String,
    },

    /// Failed to read an environment file.
    #[error("failed to read environment: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse environment: {0}")]
    Parse(#[source] ron::error::SpannedError),
}
