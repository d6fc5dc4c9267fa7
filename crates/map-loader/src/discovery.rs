//! Finding map directories on disk.

use std::path::{Path, PathBuf};

use asc_parser::{is_map_dir, AscError};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;

/// All directories under `root` (including `root`) that hold a `config.txt`,
/// sorted by path.
pub fn discover_maps(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut maps = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            AscError::io(path, e.into())
        })?;

        if entry.file_type().is_dir() && is_map_dir(entry.path()) {
            debug!(path = %entry.path().display(), "Found map");
            maps.push(entry.into_path());
        }
    }

    maps.sort();
    Ok(maps)
}
