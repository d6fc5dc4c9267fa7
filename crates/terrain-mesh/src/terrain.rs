//! Terrain mesh generation.
//!
//! One vertex per grid cell, laid out row-major (`index = row * cols + col`).
//! The vertex carries no planar position: the shader derives `x = index % cols`
//! and `z = index / cols`, the same `(col, row)` plane the wind streamlines
//! live in.

use std::time::Instant;

use asc_parser::{RasterGrid, Rgb};
use bytemuck::{Pod, Zeroable};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::hue_gradient;
use crate::error::{MeshError, MeshResult};

/// GPU vertex for the terrain surface.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// Negated normalized elevation (the renderer's up axis points down)
    pub elevation: f32,
    pub color: Rgb,
    /// Finite-difference normal in `(col, row, elevation)` space, not unit length
    pub normal: [f32; 3],
}

/// Primitive topology of the terrain index buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshTopology {
    /// One continuous zig-zag strip over the whole grid.
    #[default]
    TriangleStrip,
    /// Two independent triangles per grid cell.
    TriangleList,
}

impl MeshTopology {
    /// Parse from string (case-insensitive). Unknown values fall back to the strip.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "list" | "triangle_list" => Self::TriangleList,
            _ => Self::TriangleStrip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TriangleStrip => "strip",
            Self::TriangleList => "list",
        }
    }
}

/// Vertex and index buffers of a terrain surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    pub rows: usize,
    pub cols: usize,
    pub topology: MeshTopology,
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Build the mesh for a normalized elevation grid.
    ///
    /// `colors` must match the elevation shape; without it every vertex gets
    /// the diagonal [`hue_gradient`].
    pub fn build(
        elevation: &RasterGrid<f32>,
        colors: Option<&RasterGrid<Rgb>>,
        topology: MeshTopology,
    ) -> MeshResult<Self> {
        let (rows, cols) = elevation.shape();
        if elevation.is_empty() {
            return Err(MeshError::EmptyGrid);
        }
        if elevation.len() < 3 {
            return Err(MeshError::TooFewVertices(elevation.len()));
        }
        if elevation.len() >= u32::MAX as usize {
            return Err(MeshError::TooManyVertices(elevation.len()));
        }
        if let Some(colors) = colors {
            if colors.shape() != (rows, cols) {
                return Err(MeshError::shape_mismatch(
                    "vegetation color",
                    (rows, cols),
                    colors.shape(),
                ));
            }
        }

        let started = Instant::now();

        let mut vertices = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let color = match colors {
                    Some(colors) => colors[(row, col)],
                    None => hue_gradient(row, col, rows, cols),
                };
                vertices.push(TerrainVertex {
                    elevation: -elevation[(row, col)],
                    color,
                    normal: vertex_normal(elevation, row, col).into(),
                });
            }
        }

        let indices = match topology {
            MeshTopology::TriangleStrip => strip_indices(cols, rows),
            MeshTopology::TriangleList => triangle_list_indices(cols, rows),
        };

        debug!(
            rows,
            cols,
            vertices = vertices.len(),
            indices = indices.len(),
            topology = topology.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built terrain mesh"
        );

        Ok(Self {
            rows,
            cols,
            topology,
            vertices,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Averaged cross products of the four edges to the axis neighbors.
///
/// Border cells use themselves as the missing neighbor, which zeroes the
/// edges (and cross products) on that side.
pub fn vertex_normal(elevation: &RasterGrid<f32>, row: usize, col: usize) -> Vector3<f32> {
    let (rows, cols) = elevation.shape();
    let point = |r: usize, c: usize| Vector3::new(c as f32, r as f32, elevation[(r, c)]);

    let here = point(row, col);
    let next_col = if col + 1 < cols { col + 1 } else { col };
    let prev_col = col.saturating_sub(1);
    let next_row = if row + 1 < rows { row + 1 } else { row };
    let prev_row = row.saturating_sub(1);

    let a = here - point(row, next_col);
    let b = here - point(next_row, col);
    let c = here - point(row, prev_col);
    let d = here - point(prev_row, col);

    (a.cross(&b) + b.cross(&c) + c.cross(&d) + d.cross(&a)) / 4.0
}

/// Number of indices [`strip_indices`] produces.
pub fn strip_index_count(width: usize, height: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    height + (width - 1) * (2 * height - 2)
}

/// Index buffer for a single triangle strip covering a `width x height` grid.
///
/// `width` is the index stride (vertices per strip line) and `height` the
/// number of lines; vertex `(x, y)` has index `x + y * width`. The strip
/// zig-zags between lines `0` and `1` left to right, between `1` and `2`
/// right to left, and so on, so each band shares its first vertex with the
/// previous band and direction changes only produce zero-area triangles.
///
/// For a flat counter `i`: `n = 4w - 2`, `r = i mod n`, `c = r / 2`,
/// `d = (c / w) mod 2`, `s = 1 - 2d`,
/// `y = s(i mod 2) + 2(c / w) + 2(i / n)`,
/// `x = d(w - 1) + s(((r + d) / 2) mod w)`.
pub fn strip_indices(width: usize, height: usize) -> Vec<u32> {
    let total = strip_index_count(width, height) as i64;
    let w = width as i64;
    let n = 4 * w - 2;

    (0..total)
        .map(|i| {
            let r = i % n;
            let c = r / 2;
            let d = (c / w) % 2;
            let s = 1 - 2 * d;
            let y = s * (i % 2) + (c / w) * 2 + (i / n) * 2;
            let x = d * (w - 1) + s * (((r + d) / 2) % w);
            (x + y * w) as u32
        })
        .collect()
}

/// Index buffer drawing every cell as two independent triangles.
pub fn triangle_list_indices(width: usize, height: usize) -> Vec<u32> {
    if width < 2 || height < 2 {
        return Vec::new();
    }

    let mut indices = Vec::with_capacity((width - 1) * (height - 1) * 6);
    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let i00 = (y * width + x) as u32;
            let i01 = i00 + 1;
            let i10 = i00 + width as u32;
            let i11 = i10 + 1;
            indices.extend_from_slice(&[i00, i10, i01, i01, i10, i11]);
        }
    }
    indices
}
