//! Writing promoted mesh buffers to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use map_loader::ActiveMap;
use serde::Serialize;
use tracing::info;

use crate::upload::{BufferStats, CpuBuffers};

/// JSON description written next to the raw buffers.
#[derive(Debug, Serialize)]
pub struct MeshSummary<'a> {
    pub map: &'a Path,
    pub rows: usize,
    pub cols: usize,
    pub terrain: &'a BufferStats,
    pub wind: &'a BufferStats,
}

/// Write `terrain.vertices.bin`, `terrain.indices.bin`, `wind.vertices.bin`,
/// `wind.indices.bin` and `summary.json` into `out_dir`.
pub fn export_meshes(
    out_dir: &Path,
    active: &ActiveMap,
    terrain: &CpuBuffers,
    wind: &CpuBuffers,
) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    write(out_dir, "terrain.vertices.bin", &terrain.vertex_bytes)?;
    write(out_dir, "terrain.indices.bin", &terrain.index_bytes)?;
    write(out_dir, "wind.vertices.bin", &wind.vertex_bytes)?;
    write(out_dir, "wind.indices.bin", &wind.index_bytes)?;

    let summary = MeshSummary {
        map: &active.path,
        rows: active.rows,
        cols: active.cols,
        terrain: &terrain.stats,
        wind: &wind.stats,
    };
    let summary_path = out_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&summary_path, json)
        .with_context(|| format!("writing {}", summary_path.display()))?;

    info!(dir = %out_dir.display(), "Exported mesh buffers");
    Ok(summary_path)
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))
}
