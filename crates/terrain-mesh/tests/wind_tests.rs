//! Tests for wind fields and streamline meshes.

use nalgebra::Vector2;
use terrain_mesh::{
    integrate_streamline, seed_points, RasterGrid, SeedStrategy, StreamlineConfig,
    VelocityInterpolation, WindField, WindMesh, PRIMITIVE_RESTART,
};
use test_utils::{
    create_constant_grid, create_hill_grid, create_uniform_direction_grid,
    create_vortex_direction_grid,
};

fn field(rows: usize, cols: usize, directions: Vec<i32>, speed: f32) -> WindField {
    let dirs = RasterGrid::new(rows, cols, directions, 1, -9999).unwrap();
    let mags = RasterGrid::new(rows, cols, create_constant_grid(rows, cols, speed), 1, -9999).unwrap();
    WindField::from_polar(&dirs, &mags).unwrap()
}

fn flat(rows: usize, cols: usize) -> RasterGrid<f32> {
    RasterGrid::from_fn(rows, cols, |_, _| 0.0)
}

fn in_bounds(mesh: &WindMesh, rows: usize, cols: usize) -> bool {
    mesh.vertices.iter().all(|v| {
        let [x, _, z] = v.position;
        (0.0..=(cols - 1) as f32).contains(&x) && (0.0..=(rows - 1) as f32).contains(&z)
    })
}

#[test]
fn test_calm_field_emits_one_sample_per_seed() {
    let (rows, cols) = (41, 41);
    let wind = field(rows, cols, create_uniform_direction_grid(rows, cols, 0), 0.0);
    let mesh = WindMesh::build(&flat(rows, cols), &wind, &StreamlineConfig::default()).unwrap();

    // Stride 20 over 41 cells: 3 x 3 seeds
    assert_eq!(mesh.streamlines, 9);
    assert_eq!(mesh.vertices.len(), 9);
    assert_eq!(mesh.indices.len(), 18);
}

#[test]
fn test_one_restart_per_streamline() {
    let (rows, cols) = (30, 30);
    let wind = field(rows, cols, create_vortex_direction_grid(rows, cols), 5.0);
    let config = StreamlineConfig {
        seeding: SeedStrategy::Grid { stride: 7 },
        max_samples: 200,
        ..Default::default()
    };
    let mesh = WindMesh::build(&flat(rows, cols), &wind, &config).unwrap();

    let restarts = mesh.indices.iter().filter(|&&i| i == PRIMITIVE_RESTART).count();
    assert_eq!(restarts, mesh.streamlines);
    assert_eq!(mesh.indices.last(), Some(&PRIMITIVE_RESTART));
    assert_eq!(mesh.indices.len(), mesh.vertices.len() + mesh.streamlines);
}

#[test]
fn test_vortex_respects_sample_cap() {
    let (rows, cols) = (40, 40);
    let wind = field(rows, cols, create_vortex_direction_grid(rows, cols), 20.0);
    let config = StreamlineConfig {
        seeding: SeedStrategy::Grid { stride: 10 },
        max_samples: 64,
        ..Default::default()
    };
    let mesh = WindMesh::build(&flat(rows, cols), &wind, &config).unwrap();

    assert!(mesh.lines().all(|line| !line.is_empty() && line.len() <= 64));
    assert!(in_bounds(&mesh, rows, cols));
}

#[test]
fn test_streamlines_never_leave_the_grid() {
    let (rows, cols) = (25, 35);
    for degrees in [0, 45, 90, 135, 180, 225, 270, 315] {
        let wind = field(rows, cols, create_uniform_direction_grid(rows, cols, degrees), 40.0);
        for interpolation in [VelocityInterpolation::InverseDistance, VelocityInterpolation::Bilinear] {
            let config = StreamlineConfig {
                seeding: SeedStrategy::Border,
                interpolation,
                ..Default::default()
            };
            let mesh = WindMesh::build(&flat(rows, cols), &wind, &config).unwrap();
            assert!(in_bounds(&mesh, rows, cols), "heading {}", degrees);
            assert_eq!(mesh.streamlines, 2 * (rows + cols) - 4);
        }
    }
}

#[test]
fn test_eastward_wind_stops_at_right_edge() {
    let (rows, cols) = (5, 5);
    let wind = field(rows, cols, create_uniform_direction_grid(rows, cols, 0), 10.0);
    let config = StreamlineConfig {
        interpolation: VelocityInterpolation::Bilinear,
        ..Default::default()
    };

    let from_right = integrate_streamline(Vector2::new(4.0, 2.0), &flat(rows, cols), &wind, &config)
        .unwrap();
    assert_eq!(from_right.len(), 1);

    let from_left = integrate_streamline(Vector2::new(0.0, 2.0), &flat(rows, cols), &wind, &config)
        .unwrap();
    assert!(from_left.len() > 1);
    assert!(from_left.last().unwrap().position[0] <= 4.0);
}

#[test]
fn test_streamline_hovers_over_hill() {
    let (rows, cols) = (21, 21);
    let hill = RasterGrid::new(rows, cols, create_hill_grid(rows, cols, 0.0, 10.0), 1, -9999).unwrap();
    let wind = field(rows, cols, create_uniform_direction_grid(rows, cols, 0), 4.0);
    let config = StreamlineConfig {
        interpolation: VelocityInterpolation::Bilinear,
        height_offset: 1.5,
        ..Default::default()
    };

    let line = integrate_streamline(Vector2::new(0.0, 10.0), &hill, &wind, &config)
        .unwrap();
    let highest = line
        .iter()
        .map(|v| v.position[1])
        .fold(f32::INFINITY, f32::min);

    // Up is negative: the peak of 10 plus the offset
    assert!((highest + 11.5).abs() < 0.1);
}

#[test]
fn test_speed_range_drives_colors() {
    let (rows, cols) = (3, 3);
    let dirs = RasterGrid::new(rows, cols, vec![0; 9], 1, -9999).unwrap();
    let mags = RasterGrid::new(
        rows,
        cols,
        vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0],
        1,
        -9999,
    )
    .unwrap();
    let wind = WindField::from_polar(&dirs, &mags).unwrap();
    let config = StreamlineConfig::default();

    let calm = integrate_streamline(Vector2::new(0.0, 0.0), &flat(rows, cols), &wind, &config)
        .unwrap();
    assert_eq!(calm[0].color, [1.0, 0.0, 0.0]);

    let fast = integrate_streamline(Vector2::new(0.0, 2.0), &flat(rows, cols), &wind, &config)
        .unwrap();
    assert_eq!(fast[0].color, [0.0, 0.0, 1.0]);
}

#[test]
fn test_mismatched_field_is_rejected() {
    let wind = field(3, 4, create_uniform_direction_grid(3, 4, 0), 1.0);
    assert!(WindMesh::build(&flat(4, 3), &wind, &StreamlineConfig::default()).is_err());
}

#[test]
fn test_seed_points_border_order() {
    let seeds = seed_points(3, 3, SeedStrategy::Border);
    let cells: Vec<(f32, f32)> = seeds.iter().map(|s| (s.x, s.y)).collect();
    assert_eq!(
        cells,
        vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (2.0, 2.0),
            (1.0, 2.0),
            (0.0, 2.0),
            (0.0, 1.0),
        ]
    );
}
