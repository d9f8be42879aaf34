//! Error types for collision shape construction.

use thiserror::Error;

/// Errors raised while building a collision shape from raw geometry.
///
/// These are registration-time failures: a malformed geometry descriptor is
/// a level-authoring bug and should fail fast rather than be caught and
/// hidden.
#[derive(Debug, Clone, Error)]
pub enum GeometryError {
    /// The vertex buffer is empty.
    #[error("empty vertex buffer")]
    EmptyGeometry,

    /// The index count is not a multiple of 3.
    #[error("index count {0} is not a multiple of 3")]
    IndexCountNotTriangles(usize),

    /// An index references a vertex outside the buffer.
    #[error("index {index} out of range: {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index value.
        index: u32,
        /// Number of vertices in the buffer.
        vertex_count: usize,
    },
}
