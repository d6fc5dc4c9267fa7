//! Render-loop side of a load: promote ready meshes into live handles.

use std::path::{Path, PathBuf};

use terrain_mesh::{TerrainMesh, WindMesh, WindPalette};
use tracing::info;

use crate::error::LoadError;
use crate::orchestrator::{LoadRequest, LoadStatus, MapLoader};

/// Hands finished meshes to whatever draws them.
pub trait MeshUpload {
    /// Opaque drawable owned by the frame loop.
    type Handle;

    fn upload_terrain(&mut self, mesh: &TerrainMesh) -> Self::Handle;

    fn upload_wind(&mut self, mesh: &WindMesh) -> Self::Handle;
}

/// The map whose meshes are currently live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMap {
    pub path: PathBuf,
    pub rows: usize,
    pub cols: usize,
}

/// What happened during one [`FrameLoop::tick`].
#[derive(Debug)]
pub enum FrameEvent {
    Idle,
    Loading,
    /// The selected path is not a map directory; nothing was started.
    NotAMap(PathBuf),
    /// New meshes were uploaded and replaced the previous ones.
    Promoted(ActiveMap),
    /// The load failed; previous meshes (if any) are still live.
    LoadFailed(LoadError),
}

/// Per-frame driver owning the live mesh handles.
pub struct FrameLoop<U: MeshUpload> {
    loader: MapLoader,
    uploader: U,
    terrain: Option<U::Handle>,
    wind: Option<U::Handle>,
    active: Option<ActiveMap>,
}

impl<U: MeshUpload> FrameLoop<U> {
    pub fn new(loader: MapLoader, uploader: U) -> Self {
        Self {
            loader,
            uploader,
            terrain: None,
            wind: None,
            active: None,
        }
    }

    /// Run one frame's worth of load handling.
    ///
    /// Re-requests `selected` if it changed, then polls the in-flight load.
    /// Never blocks.
    pub fn tick(&mut self, selected: Option<&Path>) -> FrameEvent {
        if let Some(selected) = selected {
            if self.loader.sync_selection(selected) == Some(LoadRequest::NotAMap) {
                return FrameEvent::NotAMap(selected.to_path_buf());
            }
        }

        match self.loader.poll() {
            LoadStatus::Idle => FrameEvent::Idle,
            LoadStatus::Pending => FrameEvent::Loading,
            LoadStatus::Failed(e) => FrameEvent::LoadFailed(e),
            LoadStatus::Ready(map) => {
                self.terrain = Some(self.uploader.upload_terrain(&map.terrain));
                self.wind = Some(self.uploader.upload_wind(&map.wind));

                let active = ActiveMap {
                    path: map.path,
                    rows: map.rows,
                    cols: map.cols,
                };
                info!(
                    path = %active.path.display(),
                    rows = active.rows,
                    cols = active.cols,
                    "Promoted map meshes"
                );
                self.active = Some(active.clone());
                FrameEvent::Promoted(active)
            }
        }
    }

    /// Switch the wind palette; the selection reloads on a later tick.
    pub fn set_wind_palette(&mut self, palette: WindPalette) -> bool {
        self.loader.set_wind_palette(palette)
    }

    pub fn terrain(&self) -> Option<&U::Handle> {
        self.terrain.as_ref()
    }

    pub fn wind(&self) -> Option<&U::Handle> {
        self.wind.as_ref()
    }

    pub fn active(&self) -> Option<&ActiveMap> {
        self.active.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn loader(&self) -> &MapLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut MapLoader {
        &mut self.loader
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }
}
