//! Error types for mesh generation.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised while building terrain or wind meshes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Grid has no cells
    #[error("cannot build a mesh from an empty grid")]
    EmptyGrid,

    /// A drawable mesh needs at least one triangle's worth of vertices
    #[error("mesh needs at least 3 vertices, grid yields {0}")]
    TooFewVertices(usize),

    /// Two grids that must overlay each other have different shapes
    #[error("{what} grid is {found:?}, expected {expected:?} (rows, cols)")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Vertex count would collide with the 32-bit index range
    #[error("{0} vertices do not fit 32-bit indices")]
    TooManyVertices(usize),
}

impl MeshError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            found,
        }
    }
}
