//! Headless terrain viewer.
//!
//! Runs the viewer's frame loop without a window: selects a map, lets the
//! background loader build its meshes, "uploads" them into CPU buffers and
//! optionally exports those buffers for inspection.

mod export;
mod upload;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use map_loader::{discover_maps, FrameEvent, FrameLoop, LoaderConfig, MapLoader};
use terrain_mesh::WindPalette;
use tokio::runtime::Handle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use upload::CpuUploader;

#[derive(Parser, Debug)]
#[command(name = "terrain-viewer")]
#[command(about = "Load terrain maps in the background and export their mesh buffers")]
struct Args {
    /// Map directory (containing config.txt)
    map: Option<PathBuf>,

    /// Directory searched for maps when no map is given
    #[arg(long, env = "MAPS_ROOT")]
    maps_root: Option<PathBuf>,

    /// Load every discovered map in turn
    #[arg(long)]
    cycle: bool,

    /// Frames per second of the frame loop
    #[arg(long, default_value = "60", env = "VIEWER_FPS")]
    fps: u32,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Streamline color map (speed, jet, hot, cool, viridis, magma, plasma, ...)
    #[arg(long, env = "WIND_PALETTE")]
    wind_palette: Option<String>,

    /// Write vertex/index buffers and a JSON summary here after each load
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.log_level, args.json)?;

    let mut config = LoaderConfig::from_env();
    if let Some(name) = &args.wind_palette {
        config.wind.palette = WindPalette::from_str(name);
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid loader configuration: {}", e))?;
    info!(
        topology = config.terrain.topology.as_str(),
        seeding = %config.wind.seeding,
        palette = %config.wind.palette,
        seed_stride = config.wind.seed_stride,
        max_samples = config.wind.max_samples,
        "Starting terrain viewer"
    );

    let mut queue = Vec::new();
    if let Some(map) = &args.map {
        queue.push(map.clone());
    }
    let mut discovered = Vec::new();
    if let Some(root) = &args.maps_root {
        discovered = discover_maps(root)
            .with_context(|| format!("searching {} for maps", root.display()))?;
        info!(root = %root.display(), count = discovered.len(), "Discovered maps");
        if queue.is_empty() || args.cycle {
            let extra: Vec<PathBuf> = discovered
                .iter()
                .filter(|m| !queue.contains(*m))
                .cloned()
                .collect();
            queue.extend(extra);
        }
    }
    if !args.cycle {
        queue.truncate(1);
    }
    if queue.is_empty() {
        bail!("no map given and none discovered (pass a map directory or --maps-root)");
    }

    let mut loader = MapLoader::new(Handle::current(), config);
    loader.register_maps(discovered);

    let mut frame = FrameLoop::new(loader, CpuUploader::default());
    let failures = run(&mut frame, &queue, &args).await?;

    info!(
        loaded = frame.loader().known_maps().count(),
        failures,
        uploaded_bytes = frame.uploader().uploaded_bytes,
        "Terrain viewer finished"
    );
    if failures == queue.len() {
        bail!("no map could be loaded");
    }
    Ok(())
}

/// Drive the frame loop until every queued map has resolved.
///
/// Returns the number of failed loads.
async fn run(frame: &mut FrameLoop<CpuUploader>, queue: &[PathBuf], args: &Args) -> Result<usize> {
    let period = Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1)));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut current = 0;
    let mut failures = 0;
    let mut frames = 0u64;

    while current < queue.len() {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                warn!("Interrupted");
                break;
            }
        }

        match frame.tick(Some(&queue[current])) {
            FrameEvent::Promoted(active) => {
                if let (Some(terrain), Some(wind)) = (frame.terrain(), frame.wind()) {
                    info!(
                        map = %active.path.display(),
                        frames,
                        terrain_vertices = terrain.stats.vertex_count,
                        terrain_indices = terrain.stats.index_count,
                        wind_vertices = wind.stats.vertex_count,
                        streamlines = wind.stats.restarts,
                        "Map on screen"
                    );
                    if let Some(out) = &args.output {
                        let dir = if queue.len() > 1 {
                            out.join(format!("map-{}", current))
                        } else {
                            out.clone()
                        };
                        export::export_meshes(&dir, &active, terrain, wind)?;
                    }
                }
                current += 1;
            }
            FrameEvent::NotAMap(path) => {
                warn!(path = %path.display(), "Skipping directory without config.txt");
                failures += 1;
                current += 1;
            }
            FrameEvent::LoadFailed(_) => {
                // Already logged by the loader; previous meshes stay live.
                failures += 1;
                current += 1;
            }
            FrameEvent::Idle | FrameEvent::Loading => {}
        }

        frames += 1;
        if args.max_frames.is_some_and(|max| frames >= max) {
            warn!(frames, "Frame limit reached");
            break;
        }
    }

    Ok(failures)
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
