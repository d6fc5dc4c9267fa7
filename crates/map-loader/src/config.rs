//! Configuration for the map loader.

use serde::{Deserialize, Serialize};
use terrain_mesh::{MeshTopology, SeedStrategy, StreamlineConfig, VelocityInterpolation, WindPalette};

/// Configuration for map loading and mesh generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub terrain: TerrainConfig,
    pub wind: WindConfig,
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup, falling back to defaults
    /// for absent or unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("TERRAIN_TOPOLOGY") {
            config.terrain.topology = MeshTopology::from_str(&val);
        }

        if let Some(val) = lookup("WIND_SEED_STRIDE") {
            if let Ok(stride) = val.parse() {
                config.wind.seed_stride = stride;
            }
        }

        if let Some(val) = lookup("WIND_STEP_SIZE") {
            if let Ok(step) = val.parse() {
                config.wind.step_size = step;
            }
        }

        if let Some(val) = lookup("WIND_MAX_SAMPLES") {
            if let Ok(samples) = val.parse() {
                config.wind.max_samples = samples;
            }
        }

        if let Some(val) = lookup("WIND_SEEDING") {
            config.wind.seeding = SeedingMode::from_str(&val);
        }

        if let Some(val) = lookup("WIND_INTERPOLATION") {
            config.wind.interpolation = VelocityInterpolation::from_str(&val);
        }

        if let Some(val) = lookup("WIND_PALETTE") {
            config.wind.palette = WindPalette::from_str(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.wind.validate()
    }
}

/// Terrain mesh settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Index buffer layout.
    pub topology: MeshTopology,
}

/// Wind streamline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindConfig {
    /// Distance between seeds along both axes (grid seeding only).
    pub seed_stride: usize,

    /// Euler step multiplier.
    pub step_size: f32,

    /// Sample cap per streamline.
    pub max_samples: usize,

    /// Distance kept from the terrain surface.
    pub height_offset: f32,

    /// Where streamlines start.
    pub seeding: SeedingMode,

    /// Velocity reconstruction between grid nodes.
    pub interpolation: VelocityInterpolation,

    /// Color map for streamline speed.
    pub palette: WindPalette,
}

impl Default for WindConfig {
    fn default() -> Self {
        let streamline = StreamlineConfig::default();
        Self {
            seed_stride: 20,
            step_size: streamline.step_size,
            max_samples: streamline.max_samples,
            height_offset: streamline.height_offset,
            seeding: SeedingMode::Grid,
            interpolation: streamline.interpolation,
            palette: streamline.palette,
        }
    }
}

impl WindConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.seed_stride == 0 {
            return Err("wind.seed_stride must be > 0".to_string());
        }

        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err("wind.step_size must be a positive number".to_string());
        }

        if self.max_samples == 0 {
            return Err("wind.max_samples must be > 0".to_string());
        }

        if !self.height_offset.is_finite() {
            return Err("wind.height_offset must be finite".to_string());
        }

        Ok(())
    }

    /// Integration settings for the streamline builder.
    pub fn streamline_config(&self) -> StreamlineConfig {
        let seeding = match self.seeding {
            SeedingMode::Grid => SeedStrategy::Grid {
                stride: self.seed_stride,
            },
            SeedingMode::Border => SeedStrategy::Border,
        };
        StreamlineConfig {
            seeding,
            interpolation: self.interpolation,
            step_size: self.step_size,
            max_samples: self.max_samples,
            height_offset: self.height_offset,
            palette: self.palette,
        }
    }
}

/// Streamline seeding selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMode {
    /// Every `seed_stride`-th cell.
    #[default]
    Grid,
    /// Every border cell.
    Border,
}

impl SeedingMode {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "border" => Self::Border,
            _ => Self::Grid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Border => "border",
        }
    }
}

impl std::fmt::Display for SeedingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
