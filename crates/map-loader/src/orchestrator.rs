//! Non-blocking front end to the load pipeline.
//!
//! [`MapLoader`] is owned by the render thread. `begin_load` hands the work
//! to the tokio runtime and returns immediately; `poll` is called once per
//! frame and never waits. At most one load is in flight at a time.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use asc_parser::is_map_dir;
use futures::FutureExt;
use terrain_mesh::WindPalette;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::error::{LoadError, Result};
use crate::loader::{load_map, LoadedMap};

/// Outcome of a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest {
    /// Work was spawned for the path.
    Started,
    /// Another load is still in flight; nothing was recorded.
    Deferred,
    /// The path has no `config.txt`; it is recorded as attempted.
    NotAMap,
}

/// Result of one non-blocking poll.
#[derive(Debug)]
pub enum LoadStatus {
    /// Nothing in flight.
    Idle,
    /// A load is running.
    Pending,
    /// The in-flight load finished; the map is handed over exactly once.
    Ready(Box<LoadedMap>),
    /// The in-flight load failed. Whatever was live before stays live.
    Failed(LoadError),
}

struct PendingLoad {
    path: PathBuf,
    handle: JoinHandle<Result<LoadedMap>>,
    started: Instant,
}

/// Load state machine: `Idle -> Loading -> {Ready | Failed} -> Idle`.
pub struct MapLoader {
    runtime: Handle,
    config: LoaderConfig,
    last_attempted: Option<PathBuf>,
    pending: Option<PendingLoad>,
    known_maps: BTreeSet<PathBuf>,
    /// Settings changed since the last request; reload even if the path did not.
    reload_requested: bool,
}

impl MapLoader {
    /// Create a loader that spawns its work on `runtime`.
    pub fn new(runtime: Handle, config: LoaderConfig) -> Self {
        Self {
            runtime,
            config,
            last_attempted: None,
            pending: None,
            known_maps: BTreeSet::new(),
            reload_requested: false,
        }
    }

    /// Start loading `path` unless a load is already in flight.
    ///
    /// A started (or rejected) request becomes the last attempted path
    /// before any work happens.
    pub fn begin_load(&mut self, path: impl Into<PathBuf>) -> LoadRequest {
        let path = path.into();

        if let Some(pending) = &self.pending {
            debug!(
                requested = %path.display(),
                in_flight = %pending.path.display(),
                "Load deferred"
            );
            return LoadRequest::Deferred;
        }

        self.last_attempted = Some(path.clone());
        self.reload_requested = false;

        if !is_map_dir(&path) {
            debug!(path = %path.display(), "Not a map directory");
            return LoadRequest::NotAMap;
        }

        info!(path = %path.display(), "Starting map load");
        let handle = self
            .runtime
            .spawn(load_map(path.clone(), self.config.clone()));
        self.pending = Some(PendingLoad {
            path,
            handle,
            started: Instant::now(),
        });
        LoadRequest::Started
    }

    /// Frame-side re-request check.
    ///
    /// Issues a load when nothing is in flight and either `selected`
    /// differs from the last attempted path or a setting changed since then.
    /// Returns `None` when no request was made.
    pub fn sync_selection(&mut self, selected: &Path) -> Option<LoadRequest> {
        if self.pending.is_some() {
            return None;
        }
        if !self.reload_requested && self.last_attempted.as_deref() == Some(selected) {
            return None;
        }
        Some(self.begin_load(selected))
    }

    /// Switch the streamline color map.
    ///
    /// A change applies to the next load and makes `sync_selection` rebuild
    /// the current selection. A load already in flight keeps its palette.
    /// Returns whether the palette changed.
    pub fn set_wind_palette(&mut self, palette: WindPalette) -> bool {
        if self.config.wind.palette == palette {
            return false;
        }
        info!(palette = %palette, "Wind palette changed");
        self.config.wind.palette = palette;
        self.reload_requested = true;
        true
    }

    /// Check the in-flight load without blocking.
    pub fn poll(&mut self) -> LoadStatus {
        let Some(pending) = self.pending.take() else {
            return LoadStatus::Idle;
        };

        if !pending.handle.is_finished() {
            self.pending = Some(pending);
            return LoadStatus::Pending;
        }

        let PendingLoad {
            path,
            mut handle,
            started,
        } = pending;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let outcome = (&mut handle).now_or_never();
        match outcome {
            Some(Ok(Ok(map))) => {
                info!(path = %path.display(), elapsed_ms, "Map ready");
                self.known_maps.insert(path);
                LoadStatus::Ready(Box::new(map))
            }
            Some(Ok(Err(e))) => {
                warn!(path = %path.display(), error = %e, elapsed_ms, "Map load failed");
                LoadStatus::Failed(e)
            }
            Some(Err(e)) => {
                warn!(path = %path.display(), error = %e, "Map load task aborted");
                LoadStatus::Failed(LoadError::from(e))
            }
            None => {
                self.pending = Some(PendingLoad {
                    path,
                    handle,
                    started,
                });
                LoadStatus::Pending
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Path of the most recent started or rejected request.
    pub fn last_attempted(&self) -> Option<&Path> {
        self.last_attempted.as_deref()
    }

    /// Path of the load currently in flight.
    pub fn in_flight(&self) -> Option<&Path> {
        self.pending.as_ref().map(|p| p.path.as_path())
    }

    /// Every map that loaded successfully or was registered by discovery.
    pub fn known_maps(&self) -> impl Iterator<Item = &Path> {
        self.known_maps.iter().map(PathBuf::as_path)
    }

    /// Add discovered map directories to the known set.
    pub fn register_maps(&mut self, maps: impl IntoIterator<Item = PathBuf>) {
        self.known_maps.extend(maps);
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}
