//! Wind streamline meshes.
//!
//! A direction (degrees) raster and a magnitude raster become a 2D vector
//! field over the elevation grid. Streamlines are seeded on grid cells and
//! advected forward through the field with a fixed Euler step, hugging the
//! terrain at a constant offset. All streamlines land in one vertex buffer
//! drawn as a line strip with primitive restart between them.

use std::time::Instant;

use asc_parser::{RasterGrid, Rgb};
use bytemuck::{Pod, Zeroable};
use nalgebra::Vector2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::{normalize_in_range, WindPalette};
use crate::error::{MeshError, MeshResult};
use crate::interpolation::{bilinear, inverse_distance, CellCorners};

/// Index value that ends one line strip and starts the next.
pub const PRIMITIVE_RESTART: u32 = 0xFFFF_FFFF;

/// GPU vertex of a streamline sample.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct WindVertex {
    /// `(col, height, row)`
    pub position: [f32; 3],
    pub color: Rgb,
}

/// Per-cell wind velocity in grid units (`x` along columns, `y` along rows).
#[derive(Debug, Clone)]
pub struct WindField {
    rows: usize,
    cols: usize,
    vectors: Vec<Vector2<f32>>,
    min_speed: f32,
    max_speed: f32,
}

impl WindField {
    /// Combine direction and magnitude rasters.
    ///
    /// Each cell becomes `(cos θ, sin θ) * magnitude` with `θ` in degrees.
    /// The speed range used for coloring is the magnitude raster's range.
    pub fn from_polar(directions: &RasterGrid<i32>, magnitudes: &RasterGrid<f32>) -> MeshResult<Self> {
        if directions.shape() != magnitudes.shape() {
            return Err(MeshError::shape_mismatch(
                "wind magnitude",
                directions.shape(),
                magnitudes.shape(),
            ));
        }

        let vectors = directions
            .data()
            .iter()
            .zip(magnitudes.data())
            .map(|(&degrees, &magnitude)| {
                let angle = (degrees as f32).to_radians();
                Vector2::new(angle.cos(), angle.sin()) * magnitude
            })
            .collect();

        let (min_speed, max_speed) = min_max(magnitudes.data().iter().copied());

        Ok(Self {
            rows: directions.rows(),
            cols: directions.cols(),
            vectors,
            min_speed,
            max_speed,
        })
    }

    /// Wrap precomputed vectors; the speed range is taken from their lengths.
    pub fn from_vectors(rows: usize, cols: usize, vectors: Vec<Vector2<f32>>) -> MeshResult<Self> {
        if vectors.len() != rows * cols {
            return Err(MeshError::shape_mismatch(
                "wind vector",
                (rows, cols),
                (vectors.len() / cols.max(1), cols),
            ));
        }
        let (min_speed, max_speed) = min_max(vectors.iter().map(|v| v.norm()));
        Ok(Self {
            rows,
            cols,
            vectors,
            min_speed,
            max_speed,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn speed_range(&self) -> (f32, f32) {
        (self.min_speed, self.max_speed)
    }

    pub fn vector(&self, row: usize, col: usize) -> Vector2<f32> {
        self.vectors[row * self.cols + col]
    }

    fn corners(&self, corners: &CellCorners) -> [Vector2<f32>; 4] {
        corners.indices(self.cols).map(|i| self.vectors[i])
    }
}

fn min_max(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Where streamlines start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    /// Every `stride`-th cell along both axes, starting at the origin.
    Grid { stride: usize },
    /// Every border cell once, clockwise from the origin.
    Border,
}

impl Default for SeedStrategy {
    fn default() -> Self {
        Self::Grid { stride: 20 }
    }
}

/// How the velocity between grid nodes is reconstructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityInterpolation {
    /// Corner weights `clamp(1 - distance, 0, 1)`.
    #[default]
    InverseDistance,
    /// Standard bilinear weights.
    Bilinear,
}

impl VelocityInterpolation {
    /// Parse from string (case-insensitive). Unknown values fall back to inverse distance.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "bilinear" => Self::Bilinear,
            _ => Self::InverseDistance,
        }
    }

    fn sample(&self, corners: [Vector2<f32>; 4], fx: f32, fy: f32) -> Vector2<f32> {
        match self {
            Self::InverseDistance => inverse_distance(corners, fx, fy),
            Self::Bilinear => bilinear(corners, fx, fy),
        }
    }
}

/// Streamline integration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamlineConfig {
    pub seeding: SeedStrategy,
    pub interpolation: VelocityInterpolation,
    /// Euler step multiplier applied to the sampled velocity
    pub step_size: f32,
    /// Hard cap on samples per streamline
    pub max_samples: usize,
    /// Distance kept between a streamline and the terrain surface
    pub height_offset: f32,
    /// Color map applied to normalized speed
    pub palette: WindPalette,
}

impl Default for StreamlineConfig {
    fn default() -> Self {
        Self {
            seeding: SeedStrategy::default(),
            interpolation: VelocityInterpolation::default(),
            step_size: 0.05,
            max_samples: 10_000,
            height_offset: 2.0,
            palette: WindPalette::default(),
        }
    }
}

/// Starting positions `(col, row)` for a `rows x cols` grid.
pub fn seed_points(rows: usize, cols: usize, strategy: SeedStrategy) -> Vec<Vector2<f32>> {
    if rows == 0 || cols == 0 {
        return Vec::new();
    }
    let at = |row: usize, col: usize| Vector2::new(col as f32, row as f32);

    match strategy {
        SeedStrategy::Grid { stride } => {
            let stride = stride.max(1);
            (0..rows)
                .step_by(stride)
                .flat_map(|row| (0..cols).step_by(stride).map(move |col| at(row, col)))
                .collect()
        }
        SeedStrategy::Border => {
            let last_row = rows - 1;
            let last_col = cols - 1;
            let mut seeds: Vec<_> = (0..cols).map(|col| at(0, col)).collect();
            seeds.extend((1..rows).map(|row| at(row, last_col)));
            if rows > 1 {
                seeds.extend((0..last_col).rev().map(|col| at(last_row, col)));
            }
            if cols > 1 {
                seeds.extend((1..last_row).rev().map(|row| at(row, 0)));
            }
            seeds
        }
    }
}

/// Streamline vertices and restart-separated line strip indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindMesh {
    pub vertices: Vec<WindVertex>,
    pub indices: Vec<u32>,
    /// Number of streamlines (equals the number of restart markers)
    pub streamlines: usize,
}

impl WindMesh {
    /// Integrate one streamline per seed and assemble the mesh.
    ///
    /// `elevation` must be the normalized grid the field overlays.
    pub fn build(
        elevation: &RasterGrid<f32>,
        field: &WindField,
        config: &StreamlineConfig,
    ) -> MeshResult<Self> {
        if elevation.is_empty() {
            return Err(MeshError::EmptyGrid);
        }
        if field.shape() != elevation.shape() {
            return Err(MeshError::shape_mismatch(
                "wind",
                elevation.shape(),
                field.shape(),
            ));
        }

        let started = Instant::now();
        let seeds = seed_points(elevation.rows(), elevation.cols(), config.seeding);

        let lines = seeds
            .par_iter()
            .map(|&seed| integrate_streamline(seed, elevation, field, config))
            .collect::<MeshResult<Vec<_>>>()?;

        let mesh = Self::assemble(lines)?;
        debug!(
            streamlines = mesh.streamlines,
            vertices = mesh.vertices.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Built wind mesh"
        );
        Ok(mesh)
    }

    /// Concatenate streamlines into one buffer pair.
    pub fn assemble(lines: Vec<Vec<WindVertex>>) -> MeshResult<Self> {
        let total: usize = lines.iter().map(Vec::len).sum();
        if total >= PRIMITIVE_RESTART as usize {
            return Err(MeshError::TooManyVertices(total));
        }

        let mut vertices = Vec::with_capacity(total);
        let mut indices = Vec::with_capacity(total + lines.len());
        let streamlines = lines.len();

        for line in lines {
            for vertex in line {
                indices.push(vertices.len() as u32);
                vertices.push(vertex);
            }
            indices.push(PRIMITIVE_RESTART);
        }

        Ok(Self {
            vertices,
            indices,
            streamlines,
        })
    }

    /// Vertex ranges of each streamline, split at the restart markers.
    pub fn lines(&self) -> impl Iterator<Item = &[u32]> {
        self.indices
            .split(|&i| i == PRIMITIVE_RESTART)
            .take(self.streamlines)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Advect one streamline from `seed` until it leaves the grid, stalls, or
/// reaches `max_samples`.
///
/// Every emitted sample lies inside `[0, cols-1] x [0, rows-1]`; the step
/// that would leave the grid is dropped. A sample whose interpolated
/// velocity is zero ends the streamline. `field` must cover `elevation`
/// cell for cell.
pub fn integrate_streamline(
    seed: Vector2<f32>,
    elevation: &RasterGrid<f32>,
    field: &WindField,
    config: &StreamlineConfig,
) -> MeshResult<Vec<WindVertex>> {
    if elevation.is_empty() {
        return Err(MeshError::EmptyGrid);
    }
    if field.shape() != elevation.shape() {
        return Err(MeshError::shape_mismatch(
            "wind",
            elevation.shape(),
            field.shape(),
        ));
    }

    let (rows, cols) = elevation.shape();
    let max_x = cols.saturating_sub(1) as f32;
    let max_y = rows.saturating_sub(1) as f32;
    let (min_speed, max_speed) = field.speed_range();

    let mut samples = Vec::new();
    let mut position = seed;

    while samples.len() < config.max_samples.max(1) {
        let corners = CellCorners::locate(position, rows, cols);

        let heights = corners.indices(cols).map(|i| elevation.data()[i]);
        let ground = bilinear(heights, corners.fx, corners.fy);
        let height = -ground - config.height_offset;

        let velocity = config
            .interpolation
            .sample(field.corners(&corners), corners.fx, corners.fy);
        let speed = velocity.norm();
        let color = config
            .palette
            .color(normalize_in_range(speed, min_speed, max_speed));

        samples.push(WindVertex {
            position: [position.x, height, position.y],
            color,
        });

        if speed <= f32::EPSILON {
            break;
        }

        let next = position + velocity * config.step_size;
        if next.x < 0.0 || next.x > max_x || next.y < 0.0 || next.y > max_y {
            break;
        }
        position = next;
    }

    Ok(samples)
}
