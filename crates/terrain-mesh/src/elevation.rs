//! Elevation normalization.

use asc_parser::RasterGrid;
use tracing::debug;

/// Bring a raw elevation raster to cell-relative units with a zero floor.
///
/// 1. NODATA samples become `0`
/// 2. Every sample is divided by the raster's `cell_size`
/// 3. The grid minimum is subtracted, so the result's minimum is exactly `0`
///
/// An empty grid is left untouched.
pub fn normalize_elevation(grid: &mut RasterGrid<f32>) {
    if grid.is_empty() {
        return;
    }

    let nodata = grid.nodata_value as f32;
    let cell_size = grid.cell_size as f32;

    let mut min = f32::INFINITY;
    for sample in grid.data_mut() {
        if *sample == nodata {
            *sample = 0.0;
        }
        *sample /= cell_size;
        min = min.min(*sample);
    }

    for sample in grid.data_mut() {
        *sample -= min;
    }

    debug!(
        rows = grid.rows(),
        cols = grid.cols(),
        shift = min,
        "Normalized elevation"
    );
}

/// `(min, max)` of a grid, `None` when empty.
pub fn elevation_range(grid: &RasterGrid<f32>) -> Option<(f32, f32)> {
    grid.data().iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
