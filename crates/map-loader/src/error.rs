//! Error types for the map-loader crate.

use std::path::PathBuf;

use asc_parser::AscError;
use terrain_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while loading a map.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Not a map directory (no config.txt): {0}")]
    NotAMap(PathBuf),

    #[error("Failed to parse map input: {0}")]
    Parse(#[from] AscError),

    #[error("Failed to build mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("{what} raster is {found:?}, config declares {expected:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Load task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for LoadError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::TaskFailed(e.to_string())
    }
}

/// Result type for map loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;
