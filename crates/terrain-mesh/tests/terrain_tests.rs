//! Tests for terrain mesh construction and grid index buffers.

use std::collections::{BTreeSet, HashMap};

use asc_parser::read_raster;
use terrain_mesh::{
    hue_gradient, normalize_elevation, strip_index_count, strip_indices, triangle_list_indices,
    MeshTopology, RasterGrid, TerrainMesh,
};
use test_utils::{assert_vec3_approx_eq, create_hill_grid, NODATA_3X3_ASC};

fn coords(index: u32, width: usize) -> (i64, i64) {
    let index = index as usize;
    ((index % width) as i64, (index / width) as i64)
}

fn is_degenerate(tri: [u32; 3], width: usize) -> bool {
    let [a, b, c] = tri.map(|i| coords(i, width));
    let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
    cross == 0
}

/// Group the non-degenerate strip triangles by the grid cell they fall in.
fn strip_cells(width: usize, height: usize) -> HashMap<(i64, i64), BTreeSet<[u32; 3]>> {
    let indices = strip_indices(width, height);
    let mut cells: HashMap<(i64, i64), BTreeSet<[u32; 3]>> = HashMap::new();

    for window in indices.windows(3) {
        let tri = [window[0], window[1], window[2]];
        if is_degenerate(tri, width) {
            continue;
        }
        let points = tri.map(|i| coords(i, width));
        let min_x = points.iter().map(|p| p.0).min().unwrap();
        let max_x = points.iter().map(|p| p.0).max().unwrap();
        let min_y = points.iter().map(|p| p.1).min().unwrap();
        let max_y = points.iter().map(|p| p.1).max().unwrap();
        assert_eq!(max_x - min_x, 1, "triangle {:?} spans more than one cell", points);
        assert_eq!(max_y - min_y, 1, "triangle {:?} spans more than one cell", points);

        let mut sorted = tri;
        sorted.sort();
        cells.entry((min_x, min_y)).or_default().insert(sorted);
    }
    cells
}

// ============================================================================
// strip_indices
// ============================================================================

#[test]
fn test_strip_count_matches_closed_form() {
    for width in 1..8 {
        for height in 1..8 {
            let indices = strip_indices(width, height);
            assert_eq!(indices.len(), strip_index_count(width, height));
            assert_eq!(indices.len(), (height - 1) * (2 * width - 1) + 1);
        }
    }
}

#[test]
fn test_strip_indices_stay_in_range() {
    for width in 2..8 {
        for height in 2..8 {
            let max = (width * height) as u32;
            assert!(strip_indices(width, height).iter().all(|&i| i < max));
        }
    }
}

#[test]
fn test_strip_covers_every_cell_with_two_triangles() {
    for (width, height) in [(2, 2), (3, 3), (4, 5), (5, 4), (7, 2), (2, 7)] {
        let cells = strip_cells(width, height);
        assert_eq!(cells.len(), (width - 1) * (height - 1));

        for ((x, y), triangles) in &cells {
            assert_eq!(triangles.len(), 2, "cell ({}, {}) of {}x{}", x, y, width, height);
            let corners: BTreeSet<u32> = triangles.iter().flatten().copied().collect();
            assert_eq!(corners.len(), 4);
        }
    }
}

#[test]
fn test_strip_only_degenerates_at_band_turns() {
    let (width, height) = (4, 5);
    let indices = strip_indices(width, height);
    let degenerate = indices
        .windows(3)
        .filter(|w| is_degenerate([w[0], w[1], w[2]], width))
        .count();
    assert_eq!(degenerate, height - 2);
}

// ============================================================================
// triangle_list_indices
// ============================================================================

#[test]
fn test_triangle_list_counts() {
    for width in 2..6 {
        for height in 2..6 {
            let indices = triangle_list_indices(width, height);
            assert_eq!(indices.len(), (width - 1) * (height - 1) * 6);
            assert!(indices.chunks(3).all(|t| !is_degenerate([t[0], t[1], t[2]], width)));
        }
    }
}

// ============================================================================
// TerrainMesh
// ============================================================================

#[test]
fn test_nodata_grid_end_to_end() {
    let mut grid: RasterGrid<f32> = read_raster(NODATA_3X3_ASC.as_bytes()).unwrap();
    normalize_elevation(&mut grid);

    let mesh = TerrainMesh::build(&grid, None, MeshTopology::TriangleStrip).unwrap();

    assert_eq!(mesh.vertex_count(), 9);
    assert_eq!(mesh.index_count(), 11);
    assert_eq!(mesh.vertices[4].elevation, 0.0);
    assert_eq!(mesh.vertices[8].elevation, -9.0);
    assert_vec3_approx_eq!(mesh.vertices[0].color, [1.0, 0.0, 1.0], 1e-5);
    assert_vec3_approx_eq!(mesh.vertices[8].color, [1.0, 0.0, 0.0], 1e-5);
}

#[test]
fn test_vegetation_colors_are_used_verbatim() {
    let grid = RasterGrid::from_fn(2, 3, |_, _| 0.0);
    let colors = RasterGrid::from_fn(2, 3, |r, c| [r as f32, c as f32, 0.5]);

    let mesh = TerrainMesh::build(&grid, Some(&colors), MeshTopology::TriangleList).unwrap();

    assert_eq!(mesh.vertices[5].color, [1.0, 2.0, 0.5]);
    assert_eq!(mesh.index_count(), 12);
}

#[test]
fn test_gradient_fills_missing_colors() {
    let grid = RasterGrid::from_fn(4, 6, |_, _| 0.0);
    let mesh = TerrainMesh::build(&grid, None, MeshTopology::TriangleStrip).unwrap();

    for row in 0..4 {
        for col in 0..6 {
            assert_eq!(mesh.vertices[row * 6 + col].color, hue_gradient(row, col, 4, 6));
        }
    }
}

#[test]
fn test_hill_normals_lean_outward() {
    let data = create_hill_grid(9, 9, 0.0, 8.0);
    let grid = RasterGrid::new(9, 9, data, 1, -9999).unwrap();
    let mesh = TerrainMesh::build(&grid, None, MeshTopology::TriangleStrip).unwrap();

    // West flank rises toward +x, so its normal tips to -x.
    let west = mesh.vertices[4 * 9 + 2].normal;
    let east = mesh.vertices[4 * 9 + 6].normal;
    assert!(west[0] < 0.0);
    assert!(east[0] > 0.0);
    assert!(west[2] > 0.0 && east[2] > 0.0);
}

#[test]
fn test_vertex_buffer_casts_to_bytes() {
    let grid = RasterGrid::from_fn(3, 3, |r, c| (r + c) as f32);
    let mesh = TerrainMesh::build(&grid, None, MeshTopology::TriangleStrip).unwrap();

    let bytes: &[u8] = bytemuck::cast_slice(&mesh.vertices);
    assert_eq!(bytes.len(), 9 * 28);
}
