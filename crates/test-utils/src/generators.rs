//! Test data generators for synthetic terrain and wind rasters.
//!
//! All grids are returned as `Vec` in row-major order (row 0 first).

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `row * 1000 + col`
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(5, 10);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1.0);     // row=0, col=1
/// assert_eq!(grid[10], 1000.0); // row=1, col=0
/// ```
pub fn create_test_grid(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push((row * 1000 + col) as f32);
        }
    }
    data
}

/// Creates a grid filled with one value.
pub fn create_constant_grid(rows: usize, cols: usize, value: f32) -> Vec<f32> {
    vec![value; rows * cols]
}

/// Creates an elevation grid shaped like a single hill.
///
/// Peak of `peak` meters in the middle, falling off to `base` at the corners.
pub fn create_hill_grid(rows: usize, cols: usize, base: f32, peak: f32) -> Vec<f32> {
    let center_row = (rows as f32 - 1.0) / 2.0;
    let center_col = (cols as f32 - 1.0) / 2.0;
    let max_dist = (center_row * center_row + center_col * center_col).sqrt().max(1.0);

    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let dr = row as f32 - center_row;
            let dc = col as f32 - center_col;
            let t = 1.0 - (dr * dr + dc * dc).sqrt() / max_dist;
            data.push(base + (peak - base) * t);
        }
    }
    data
}

/// Creates a vegetation grid cycling through `codes` along the diagonal.
pub fn create_vegetation_grid(rows: usize, cols: usize, codes: &[i32]) -> Vec<i32> {
    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            data.push(codes[(row + col) % codes.len()]);
        }
    }
    data
}

/// Creates a wind direction grid (degrees) swirling around the grid center.
///
/// Each cell points 90° from the direction to the center, so integrated
/// streamlines circle without leaving the grid.
pub fn create_vortex_direction_grid(rows: usize, cols: usize) -> Vec<i32> {
    let center_row = (rows as f32 - 1.0) / 2.0;
    let center_col = (cols as f32 - 1.0) / 2.0;

    let mut data = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        for col in 0..cols {
            let dx = col as f32 - center_col;
            let dy = row as f32 - center_row;
            let radial = dy.atan2(dx).to_degrees();
            data.push((radial + 90.0).round() as i32);
        }
    }
    data
}

/// Creates a direction grid with a single heading everywhere.
pub fn create_uniform_direction_grid(rows: usize, cols: usize, degrees: i32) -> Vec<i32> {
    vec![degrees; rows * cols]
}
