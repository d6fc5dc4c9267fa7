//! Sub-cell sampling of grid data.

use nalgebra::Vector2;

/// The four grid nodes around a planar position, plus the offset inside the cell.
///
/// Positions are `(x, y) = (col, row)`. Corner indices are `floor`/`ceil`
/// of each axis clamped into the grid, so on the last row/column the
/// "far" corner coincides with the near one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCorners {
    pub col0: usize,
    pub col1: usize,
    pub row0: usize,
    pub row1: usize,
    /// Fractional offset along columns, `0.0..1.0`
    pub fx: f32,
    /// Fractional offset along rows, `0.0..1.0`
    pub fy: f32,
}

impl CellCorners {
    /// Locate `position` in a `rows x cols` grid.
    pub fn locate(position: Vector2<f32>, rows: usize, cols: usize) -> Self {
        let clamp = |v: f32, len: usize| (v.max(0.0) as usize).min(len.saturating_sub(1));

        Self {
            col0: clamp(position.x.floor(), cols),
            col1: clamp(position.x.ceil(), cols),
            row0: clamp(position.y.floor(), rows),
            row1: clamp(position.y.ceil(), rows),
            fx: position.x - position.x.floor(),
            fy: position.y - position.y.floor(),
        }
    }

    /// Flat row-major indices `[v00, v01, v10, v11]` where the first digit
    /// is the row corner and the second the column corner.
    pub fn indices(&self, cols: usize) -> [usize; 4] {
        [
            self.row0 * cols + self.col0,
            self.row0 * cols + self.col1,
            self.row1 * cols + self.col0,
            self.row1 * cols + self.col1,
        ]
    }
}

/// Bilinear blend of four corner values `[v00, v01, v10, v11]`.
pub fn bilinear<T>(corners: [T; 4], fx: f32, fy: f32) -> T
where
    T: Copy + std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    let [v00, v01, v10, v11] = corners;
    let top = v00 * (1.0 - fx) + v01 * fx;
    let bottom = v10 * (1.0 - fx) + v11 * fx;
    top * (1.0 - fy) + bottom * fy
}

/// Inverse-distance blend of four corner vectors.
///
/// Each corner weighs `clamp(1 - distance, 0, 1)` where distance is measured
/// from the in-cell offset to that corner of the unit cell. Weights do not
/// sum to one, so the blend is dimmer than bilinear away from nodes.
pub fn inverse_distance(corners: [Vector2<f32>; 4], fx: f32, fy: f32) -> Vector2<f32> {
    let offset = Vector2::new(fx, fy);
    let nodes = [
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.0, 1.0),
        Vector2::new(1.0, 1.0),
    ];

    nodes
        .iter()
        .zip(corners.iter())
        .fold(Vector2::zeros(), |acc, (node, value)| {
            let weight = (1.0 - (node - offset).norm()).clamp(0.0, 1.0);
            acc + value * weight
        })
}
