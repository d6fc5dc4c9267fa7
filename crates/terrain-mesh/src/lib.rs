//! Procedural meshes for terrain and wind visualization.
//!
//! Implements the CPU side of the viewer's geometry:
//! - Elevation normalization (NODATA removal, cell scaling, zero minimum)
//! - Terrain vertices with estimated normals and palette colors
//! - Triangle strip / triangle list index generation over a grid
//! - Wind streamlines integrated through a bilinearly sampled vector field,
//!   emitted as one primitive-restart line strip buffer
//!
//! Vertex structs are `#[repr(C)]` and `Pod`, ready for a byte upload.

pub mod color;
pub mod elevation;
pub mod error;
pub mod interpolation;
pub mod terrain;
pub mod wind;

pub use asc_parser::{RasterGrid, Rgb};
pub use color::{hue_gradient, wind_speed_color, WindPalette};
pub use elevation::{elevation_range, normalize_elevation};
pub use error::{MeshError, MeshResult};
pub use interpolation::{bilinear, CellCorners};
pub use terrain::{
    strip_index_count, strip_indices, triangle_list_indices, MeshTopology, TerrainMesh,
    TerrainVertex,
};
pub use wind::{
    integrate_streamline, seed_points, SeedStrategy, StreamlineConfig, VelocityInterpolation, WindField, WindMesh,
    WindVertex, PRIMITIVE_RESTART,
};
