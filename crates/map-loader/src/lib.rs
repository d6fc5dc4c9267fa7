//! Background map loading for the terrain viewer.
//!
//! A map load parses a map directory, normalizes its elevation and builds
//! the terrain and wind meshes on the tokio runtime, while the render
//! thread keeps drawing:
//!
//! - [`load_map`]: the async pipeline itself
//! - [`MapLoader`]: one-at-a-time orchestration with a non-blocking `poll`
//! - [`FrameLoop`]: promotes finished loads into uploaded mesh handles
//! - [`discover_maps`]: finds map directories under a root
//!
//! A failed load never disturbs the live meshes; it is logged and reported
//! through [`LoadStatus::Failed`].

pub mod config;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod loader;
pub mod orchestrator;

// Re-exports
pub use config::{LoaderConfig, SeedingMode, TerrainConfig, WindConfig};
pub use discovery::discover_maps;
pub use error::{LoadError, Result};
pub use frame::{ActiveMap, FrameEvent, FrameLoop, MeshUpload};
pub use loader::{load_map, LoadedMap, MapSources};
pub use orchestrator::{LoadRequest, LoadStatus, MapLoader};
