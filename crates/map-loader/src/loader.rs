//! The load pipeline: map directory in, finished meshes out.
//!
//! ```text
//! config.txt ─┬─ elevation ──── normalize ─┐
//!             ├─ vegetation + palette ─────┼─ join ─┬─ terrain mesh ─┐
//!             └─ wind direction + speed ───┘        └─ wind mesh ────┴─ LoadedMap
//! ```
//!
//! Parsing and mesh generation are CPU bound and run on the blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use asc_parser::{
    is_map_dir, load_float_raster, load_int_raster, AscError, ConfigFile, PaletteDatabase,
    RasterGrid, Rgb, CONFIG_FILE_NAME,
};
use terrain_mesh::{normalize_elevation, TerrainMesh, WindField, WindMesh};
use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};

/// Everything produced by one successful load.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    /// Map directory the load was requested for
    pub path: PathBuf,
    pub rows: usize,
    pub cols: usize,
    /// Normalized elevation grid shared by both mesh builders
    pub elevation: Arc<RasterGrid<f32>>,
    pub terrain: TerrainMesh,
    /// Empty when the map has no wind rasters
    pub wind: WindMesh,
}

/// File locations named by a map's `config.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSources {
    pub rows: usize,
    pub cols: usize,
    pub elevation: PathBuf,
    /// `(VEGETATION_MAP, PALETA)`
    pub vegetation: Option<(PathBuf, PathBuf)>,
    /// `(WIND_MAP, INT_WIND)`
    pub wind: Option<(PathBuf, PathBuf)>,
}

impl MapSources {
    /// Resolve and validate the keys a load needs.
    ///
    /// `ROWS`, `COLS` and `ELEV_MAP` are required. The vegetation and wind
    /// keys are optional but only as complete pairs.
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let rows: usize = config.require_parsed("ROWS")?;
        let cols: usize = config.require_parsed("COLS")?;
        if rows == 0 || cols == 0 {
            return Err(LoadError::InvalidConfig(format!(
                "map must be at least 1x1, got {}x{}",
                rows, cols
            )));
        }

        Ok(Self {
            rows,
            cols,
            elevation: config.require_path("ELEV_MAP")?,
            vegetation: optional_pair(config, "VEGETATION_MAP", "PALETA")?,
            wind: optional_pair(config, "WIND_MAP", "INT_WIND")?,
        })
    }
}

fn optional_pair(config: &ConfigFile, first: &str, second: &str) -> Result<Option<(PathBuf, PathBuf)>> {
    match (config.path(first), config.path(second)) {
        (Some(a), Some(b)) => Ok(Some((a, b))),
        (None, None) => Ok(None),
        _ => Err(LoadError::InvalidConfig(format!(
            "{} and {} must be given together",
            first, second
        ))),
    }
}

/// Load a map directory and build its terrain and wind meshes.
pub async fn load_map(path: PathBuf, config: LoaderConfig) -> Result<LoadedMap> {
    let started = Instant::now();

    if !is_map_dir(&path) {
        return Err(LoadError::NotAMap(path));
    }
    config.validate().map_err(LoadError::InvalidConfig)?;

    let config_path = path.join(CONFIG_FILE_NAME);
    let text = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|e| AscError::io(&config_path, e))?;
    let sources = MapSources::from_config(&ConfigFile::parse(&path, &text))?;
    let (rows, cols) = (sources.rows, sources.cols);

    debug!(
        path = %path.display(),
        rows,
        cols,
        vegetation = sources.vegetation.is_some(),
        wind = sources.wind.is_some(),
        "Loading map"
    );

    let MapSources {
        elevation,
        vegetation,
        wind,
        ..
    } = sources;

    let (elevation, colors, field) = tokio::try_join!(
        blocking(move || load_elevation(&elevation, rows, cols)),
        blocking(move || load_vegetation(vegetation, rows, cols)),
        blocking(move || load_wind(wind, rows, cols)),
    )?;
    let elevation = Arc::new(elevation);
    let parsed_ms = started.elapsed().as_millis() as u64;

    let topology = config.terrain.topology;
    let streamline = config.wind.streamline_config();
    let terrain_elevation = Arc::clone(&elevation);
    let wind_elevation = Arc::clone(&elevation);

    let (terrain, wind) = tokio::try_join!(
        blocking(move || {
            let started = Instant::now();
            let mesh = TerrainMesh::build(&terrain_elevation, colors.as_ref(), topology)?;
            Ok((mesh, started.elapsed().as_millis() as u64))
        }),
        blocking(move || {
            let started = Instant::now();
            let mesh = match field {
                Some(field) => WindMesh::build(&wind_elevation, &field, &streamline)?,
                None => WindMesh::default(),
            };
            Ok((mesh, started.elapsed().as_millis() as u64))
        }),
    )?;
    let (terrain, terrain_ms) = terrain;
    let (wind, wind_ms) = wind;

    info!(
        path = %path.display(),
        rows,
        cols,
        terrain_vertices = terrain.vertex_count(),
        wind_vertices = wind.vertices.len(),
        streamlines = wind.streamlines,
        parse_ms = parsed_ms,
        terrain_ms,
        wind_ms,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Map loaded"
    );

    Ok(LoadedMap {
        path,
        rows,
        cols,
        elevation,
        terrain,
        wind,
    })
}

/// Run CPU-bound work on the blocking pool.
async fn blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

fn load_elevation(path: &Path, rows: usize, cols: usize) -> Result<RasterGrid<f32>> {
    let mut grid = load_float_raster(path)?;
    check_shape("elevation", &grid, rows, cols)?;
    normalize_elevation(&mut grid);
    Ok(grid)
}

fn load_vegetation(
    sources: Option<(PathBuf, PathBuf)>,
    rows: usize,
    cols: usize,
) -> Result<Option<RasterGrid<Rgb>>> {
    let Some((raster, palette)) = sources else {
        return Ok(None);
    };
    let codes = load_int_raster(&raster)?;
    check_shape("vegetation", &codes, rows, cols)?;
    let palette = PaletteDatabase::open(&palette)?;
    Ok(Some(palette.colorize(&codes)?))
}

fn load_wind(
    sources: Option<(PathBuf, PathBuf)>,
    rows: usize,
    cols: usize,
) -> Result<Option<WindField>> {
    let Some((directions, magnitudes)) = sources else {
        return Ok(None);
    };
    let directions = load_int_raster(&directions)?;
    check_shape("wind direction", &directions, rows, cols)?;
    let magnitudes = load_float_raster(&magnitudes)?;
    check_shape("wind magnitude", &magnitudes, rows, cols)?;
    Ok(Some(WindField::from_polar(&directions, &magnitudes)?))
}

fn check_shape<T>(what: &'static str, grid: &RasterGrid<T>, rows: usize, cols: usize) -> Result<()> {
    if grid.shape() != (rows, cols) {
        return Err(LoadError::DimensionMismatch {
            what,
            expected: (rows, cols),
            found: grid.shape(),
        });
    }
    Ok(())
}
