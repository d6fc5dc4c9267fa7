//! End-to-end tests for the load pipeline, orchestrator and frame loop.

use std::path::Path;
use std::time::Duration;

use map_loader::{
    load_map, FrameEvent, FrameLoop, LoadError, LoadRequest, LoadStatus, LoadedMap,
    LoaderConfig, MapLoader, MeshUpload,
};
use terrain_mesh::{TerrainMesh, WindMesh, WindPalette, PRIMITIVE_RESTART};
use test_utils::{
    create_hill_grid, create_vegetation_grid, create_vortex_direction_grid, poll_until,
    MapFixture, TempMap, NODATA_3X3_ASC, SAMPLE_PALETTE,
};
use tokio::runtime::Handle;

const TIMEOUT: Duration = Duration::from_secs(10);
const FRAME: Duration = Duration::from_millis(5);

fn nodata_map() -> TempMap {
    MapFixture::new(3, 3)
        .unwrap()
        .with_file("elev.asc", NODATA_3X3_ASC)
        .unwrap()
        .with_entry("ELEV_MAP", "elev.asc")
        .build()
        .unwrap()
}

fn full_map(size: usize) -> TempMap {
    let speeds = vec![6.0; size * size];
    MapFixture::new(size, size)
        .unwrap()
        .with_elevation(10, &create_hill_grid(size, size, 100.0, 400.0))
        .unwrap()
        .with_vegetation(&create_vegetation_grid(size, size, &[1, 2]), SAMPLE_PALETTE)
        .unwrap()
        .with_wind(&create_vortex_direction_grid(size, size), &speeds)
        .unwrap()
        .build()
        .unwrap()
}

async fn wait_for(loader: &mut MapLoader) -> LoadStatus {
    poll_until(TIMEOUT, FRAME, || match loader.poll() {
        LoadStatus::Pending => None,
        status => Some(status),
    })
    .await
    .expect("load did not finish in time")
}

fn ready(status: LoadStatus) -> LoadedMap {
    match status {
        LoadStatus::Ready(map) => *map,
        other => panic!("expected a ready map, got {:?}", other),
    }
}

// ============================================================================
// load_map
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_nodata_map_end_to_end() {
    let map = nodata_map();
    let loaded = load_map(map.path_buf(), LoaderConfig::default()).await.unwrap();

    assert_eq!((loaded.rows, loaded.cols), (3, 3));
    assert_eq!(loaded.elevation[(1, 1)], 0.0);
    assert!(loaded.elevation.data().iter().all(|&v| v >= 0.0));
    assert_eq!(loaded.terrain.index_count(), 11);
    assert!(loaded.wind.is_empty());
    assert!(loaded.wind.indices.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_map_builds_both_meshes() {
    let map = full_map(31);
    let loaded = load_map(map.path_buf(), LoaderConfig::default()).await.unwrap();

    // Hill from 100 to 400 at cellsize 10: normalized range 0..30
    let max = loaded.elevation.data().iter().cloned().fold(0.0f32, f32::max);
    assert!((max - 30.0).abs() < 1e-3);

    assert_eq!(loaded.terrain.vertex_count(), 961);
    assert_eq!(loaded.terrain.vertices[0].color, [0.0, 1.0, 0.0]);

    // Stride 20 over 31 cells: seeds at rows/cols 0 and 20
    assert_eq!(loaded.wind.streamlines, 4);
    let restarts = loaded
        .wind
        .indices
        .iter()
        .filter(|&&i| i == PRIMITIVE_RESTART)
        .count();
    assert_eq!(restarts, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_loader_config_is_applied() {
    let map = full_map(12);
    let mut config = LoaderConfig::from_lookup(|key| match key {
        "WIND_SEEDING" => Some("border".to_string()),
        "TERRAIN_TOPOLOGY" => Some("list".to_string()),
        _ => None,
    });
    config.wind.max_samples = 16;

    let loaded = load_map(map.path_buf(), config).await.unwrap();
    assert_eq!(loaded.terrain.index_count(), 11 * 11 * 6);
    assert_eq!(loaded.wind.streamlines, 2 * (12 + 12) - 4);
    assert!(loaded.wind.lines().all(|line| line.len() <= 16));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dimension_mismatch_is_reported() {
    let map = MapFixture::new(3, 3)
        .unwrap()
        .with_file("elev.asc", NODATA_3X3_ASC)
        .unwrap()
        .with_entry("ELEV_MAP", "elev.asc")
        .with_entry("ROWS", "4")
        .build()
        .unwrap();

    let err = load_map(map.path_buf(), LoaderConfig::default()).await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::DimensionMismatch {
            expected: (4, 3),
            found: (3, 3),
            ..
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_raster_file_fails() {
    let map = MapFixture::new(2, 2)
        .unwrap()
        .with_entry("ELEV_MAP", "nowhere.asc")
        .build()
        .unwrap();

    let err = load_map(map.path_buf(), LoaderConfig::default()).await.unwrap_err();
    assert!(matches!(err, LoadError::Parse(asc_parser::AscError::Io { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_vegetation_code_fails() {
    let map = MapFixture::new(2, 2)
        .unwrap()
        .with_elevation(1, &[0.0, 1.0, 2.0, 3.0])
        .unwrap()
        .with_vegetation(&[1, 2, 3, 1], SAMPLE_PALETTE)
        .unwrap()
        .build()
        .unwrap();

    let err = load_map(map.path_buf(), LoaderConfig::default()).await.unwrap_err();
    assert!(matches!(
        err,
        LoadError::Parse(asc_parser::AscError::UnknownPaletteType(3))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_directory_without_config_is_not_a_map() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_map(dir.path().to_path_buf(), LoaderConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::NotAMap(_)));
}

// ============================================================================
// MapLoader
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_second_request_is_deferred() {
    let first = full_map(40);
    let second = nodata_map();
    let mut loader = MapLoader::new(Handle::current(), LoaderConfig::default());

    assert_eq!(loader.begin_load(first.path()), LoadRequest::Started);
    assert!(loader.is_loading());
    assert_eq!(loader.begin_load(second.path()), LoadRequest::Deferred);
    assert_eq!(loader.last_attempted(), Some(first.path()));
    assert_eq!(loader.in_flight(), Some(first.path()));

    let loaded = ready(wait_for(&mut loader).await);
    assert_eq!(loaded.path, first.path());
    assert!(!loader.is_loading());
    assert_eq!(loader.in_flight(), None);
    assert!(matches!(loader.poll(), LoadStatus::Idle));

    // The deferred selection is picked up on the next frame check.
    assert_eq!(loader.sync_selection(second.path()), Some(LoadRequest::Started));
    let loaded = ready(wait_for(&mut loader).await);
    assert_eq!(loaded.path, second.path());

    let known: Vec<&Path> = loader.known_maps().collect();
    assert_eq!(known.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_same_selection_is_not_reloaded() {
    let map = nodata_map();
    let mut loader = MapLoader::new(Handle::current(), LoaderConfig::default());

    assert_eq!(loader.sync_selection(map.path()), Some(LoadRequest::Started));
    ready(wait_for(&mut loader).await);
    assert_eq!(loader.sync_selection(map.path()), None);
    assert!(matches!(loader.poll(), LoadStatus::Idle));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_palette_change_reloads_selection() {
    let map = full_map(31);
    let mut loader = MapLoader::new(Handle::current(), LoaderConfig::default());

    assert_eq!(loader.sync_selection(map.path()), Some(LoadRequest::Started));
    let loaded = ready(wait_for(&mut loader).await);
    // Constant speed: a flat range normalizes every sample to 0
    assert_eq!(loaded.wind.vertices[0].color, [1.0, 0.0, 0.0]);

    assert!(!loader.set_wind_palette(WindPalette::Speed));
    assert_eq!(loader.sync_selection(map.path()), None);

    assert!(loader.set_wind_palette(WindPalette::Jet));
    assert_eq!(loader.config().wind.palette, WindPalette::Jet);
    assert_eq!(loader.sync_selection(map.path()), Some(LoadRequest::Started));
    let reloaded = ready(wait_for(&mut loader).await);
    assert_eq!(reloaded.path, map.path());
    assert_eq!(reloaded.wind.vertices[0].color, WindPalette::Jet.color(0.0));
    assert_eq!(reloaded.wind.streamlines, loaded.wind.streamlines);

    // One reload per change
    assert_eq!(loader.sync_selection(map.path()), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_palette_change_during_load_waits_for_it() {
    let map = full_map(40);
    let mut loader = MapLoader::new(Handle::current(), LoaderConfig::default());

    assert_eq!(loader.sync_selection(map.path()), Some(LoadRequest::Started));
    assert!(loader.set_wind_palette(WindPalette::Magma));
    assert_eq!(loader.sync_selection(map.path()), None);

    let first = ready(wait_for(&mut loader).await);
    assert_eq!(first.wind.vertices[0].color, [1.0, 0.0, 0.0]);

    assert_eq!(loader.sync_selection(map.path()), Some(LoadRequest::Started));
    let second = ready(wait_for(&mut loader).await);
    assert_eq!(second.wind.vertices[0].color, WindPalette::Magma.color(0.0));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_not_a_map_request_is_recorded_without_work() {
    let dir = tempfile::tempdir().unwrap();
    let mut loader = MapLoader::new(Handle::current(), LoaderConfig::default());

    assert_eq!(loader.begin_load(dir.path()), LoadRequest::NotAMap);
    assert_eq!(loader.last_attempted(), Some(dir.path()));
    assert!(!loader.is_loading());
    assert!(matches!(loader.poll(), LoadStatus::Idle));
    assert_eq!(loader.sync_selection(dir.path()), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_load_is_reported_once() {
    let map = MapFixture::new(2, 2)
        .unwrap()
        .with_entry("ELEV_MAP", "nowhere.asc")
        .build()
        .unwrap();
    let mut loader = MapLoader::new(Handle::current(), LoaderConfig::default());

    loader.begin_load(map.path());
    assert!(matches!(wait_for(&mut loader).await, LoadStatus::Failed(_)));
    assert!(matches!(loader.poll(), LoadStatus::Idle));
    assert_eq!(loader.known_maps().count(), 0);
}

// ============================================================================
// FrameLoop
// ============================================================================

/// Records uploads; handles are `(vertex count, index count)`.
#[derive(Default)]
struct RecordingUploader {
    uploads: usize,
}

impl MeshUpload for RecordingUploader {
    type Handle = (usize, usize);

    fn upload_terrain(&mut self, mesh: &TerrainMesh) -> Self::Handle {
        self.uploads += 1;
        (mesh.vertex_count(), mesh.index_count())
    }

    fn upload_wind(&mut self, mesh: &WindMesh) -> Self::Handle {
        self.uploads += 1;
        (mesh.vertices.len(), mesh.indices.len())
    }
}

async fn run_frames(
    frame: &mut FrameLoop<RecordingUploader>,
    selected: &Path,
) -> Result<map_loader::ActiveMap, LoadError> {
    poll_until(TIMEOUT, FRAME, || match frame.tick(Some(selected)) {
        FrameEvent::Promoted(active) => Some(Ok(active)),
        FrameEvent::LoadFailed(e) => Some(Err(e)),
        FrameEvent::NotAMap(path) => Some(Err(LoadError::NotAMap(path))),
        FrameEvent::Idle | FrameEvent::Loading => None,
    })
    .await
    .expect("frame loop did not settle in time")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_frame_loop_promotes_and_keeps_stale_meshes_on_failure() {
    let good = nodata_map();
    let broken = MapFixture::new(2, 2)
        .unwrap()
        .with_entry("ELEV_MAP", "nowhere.asc")
        .build()
        .unwrap();

    let loader = MapLoader::new(Handle::current(), LoaderConfig::default());
    let mut frame = FrameLoop::new(loader, RecordingUploader::default());
    assert!(frame.terrain().is_none());

    let active = run_frames(&mut frame, good.path()).await.unwrap();
    assert_eq!(active.path, good.path());
    assert_eq!(frame.terrain(), Some(&(9, 11)));
    assert_eq!(frame.wind(), Some(&(0, 0)));
    assert_eq!(frame.uploader().uploads, 2);

    assert!(run_frames(&mut frame, broken.path()).await.is_err());
    assert_eq!(frame.active().map(|a| a.path.as_path()), Some(good.path()));
    assert_eq!(frame.terrain(), Some(&(9, 11)));
    assert_eq!(frame.uploader().uploads, 2);
    assert!(!frame.is_loading());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_frame_loop_repromotes_after_palette_change() {
    let map = nodata_map();
    let loader = MapLoader::new(Handle::current(), LoaderConfig::default());
    let mut frame = FrameLoop::new(loader, RecordingUploader::default());

    run_frames(&mut frame, map.path()).await.unwrap();
    assert_eq!(frame.uploader().uploads, 2);
    assert!(matches!(frame.tick(Some(map.path())), FrameEvent::Idle));

    assert!(frame.set_wind_palette(WindPalette::Plasma));
    let active = run_frames(&mut frame, map.path()).await.unwrap();
    assert_eq!(active.path, map.path());
    assert_eq!(frame.uploader().uploads, 4);
    assert_eq!(frame.loader().config().wind.palette, WindPalette::Plasma);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_frame_loop_reports_non_map_selection() {
    let dir = tempfile::tempdir().unwrap();
    let loader = MapLoader::new(Handle::current(), LoaderConfig::default());
    let mut frame = FrameLoop::new(loader, RecordingUploader::default());

    assert!(matches!(frame.tick(Some(dir.path())), FrameEvent::NotAMap(_)));
    // Recorded as attempted: the next frame does not ask again.
    assert!(matches!(frame.tick(Some(dir.path())), FrameEvent::Idle));
    assert!(frame.active().is_none());
}
