//! Terrain engine error types.

/// Errors raised while constructing or combining tiles.
///
/// All of these are structural problems with the request and are reported
/// before any field buffer is allocated.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// Width or depth is zero.
    #[error("tile dimensions must be positive, got {width}x{depth}")]
    InvalidDimensions { width: usize, depth: usize },

    /// A sampling stride is not a positive finite number.
    #[error("tile strides must be positive and finite, got ({stride_x}, {stride_z})")]
    InvalidStride { stride_x: f64, stride_z: f64 },

    /// A world offset is NaN or infinite.
    #[error("tile offsets must be finite, got ({offset_x}, {offset_z})")]
    InvalidOffset { offset_x: f64, offset_z: f64 },

    /// The composite constructor received the wrong number of environments.
    #[error("invalid configuration: expected exactly 4 environments, got {0}")]
    InvalidConfiguration(usize),

    /// An externally supplied field does not match the tile size.
    #[error("field has {actual} cells, expected {expected}")]
    FieldSizeMismatch { expected: usize, actual: usize },

    /// Combinator inputs do not share the same grid shape.
    #[error("tile shapes differ: {expected:?} vs {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// A generation worker thread could not be started.
    #[error("failed to spawn tile generation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
