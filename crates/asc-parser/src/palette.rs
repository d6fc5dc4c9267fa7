//! Vegetation palette database.
//!
//! Two record kinds, one per line:
//!
//! ```text
//! R5=42                 type code 42 uses color id 5
//! I5="Grass",0,255,0    color id 5 is named "Grass", RGB 0-255
//! ```
//!
//! Lines matching neither record are ignored.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, trace};

use crate::error::{AscError, AscResult};
use crate::raster::RasterGrid;

/// Linear RGB in `0.0..=1.0`.
pub type Rgb = [f32; 3];

/// A named palette color.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteColor {
    pub name: String,
    pub color: Rgb,
}

/// Type code → color id → color lookup.
#[derive(Debug, Clone, Default)]
pub struct PaletteDatabase {
    types: HashMap<i32, u32>,
    colors: HashMap<u32, PaletteColor>,
}

impl PaletteDatabase {
    /// Read a palette file.
    pub fn open(path: impl AsRef<Path>) -> AscResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AscError::io(path, e))?;
        let db = Self::parse(&text);
        debug!(
            path = %path.display(),
            types = db.types.len(),
            colors = db.colors.len(),
            "Loaded palette"
        );
        Ok(db)
    }

    /// Parse palette text.
    pub fn parse(text: &str) -> Self {
        let mut db = Self::default();
        for line in text.lines() {
            let line = line.trim();
            if let Some((id, code)) = parse_redirect(line) {
                db.types.insert(code, id);
            } else if let Some((id, color)) = parse_color(line) {
                db.colors.insert(id, color);
            } else if !line.is_empty() {
                trace!(line, "skipping palette line");
            }
        }
        db
    }

    /// Register a redirection `code → id`.
    pub fn insert_type(&mut self, code: i32, id: u32) {
        self.types.insert(code, id);
    }

    /// Register a color definition.
    pub fn insert_color(&mut self, id: u32, name: impl Into<String>, rgb: [u8; 3]) {
        self.colors.insert(
            id,
            PaletteColor {
                name: name.into(),
                color: normalize_rgb(rgb.map(f32::from)),
            },
        );
    }

    /// Resolve a vegetation type code to its color.
    pub fn color(&self, code: i32) -> AscResult<&PaletteColor> {
        let id = *self
            .types
            .get(&code)
            .ok_or(AscError::UnknownPaletteType(code))?;
        self.colors
            .get(&id)
            .ok_or(AscError::UnknownPaletteId { code, id })
    }

    /// Number of type redirections.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Map every cell of a vegetation raster to its palette color.
    ///
    /// Cells holding the raster's NODATA sentinel become black without a
    /// lookup; any other unresolved code fails the whole grid.
    pub fn colorize(&self, vegetation: &RasterGrid<i32>) -> AscResult<RasterGrid<Rgb>> {
        let nodata = vegetation.nodata_value;
        let data = vegetation
            .data()
            .iter()
            .map(|&code| {
                if code == nodata {
                    Ok([0.0; 3])
                } else {
                    self.color(code).map(|c| c.color)
                }
            })
            .collect::<AscResult<Vec<_>>>()?;
        RasterGrid::new(
            vegetation.rows(),
            vegetation.cols(),
            data,
            vegetation.cell_size,
            vegetation.nodata_value,
        )
    }
}

fn parse_redirect(line: &str) -> Option<(u32, i32)> {
    let (id, code) = line.strip_prefix('R')?.split_once('=')?;
    Some((id.trim().parse().ok()?, code.trim().parse().ok()?))
}

fn parse_color(line: &str) -> Option<(u32, PaletteColor)> {
    let (id, rest) = line.strip_prefix('I')?.split_once('=')?;
    let id = id.trim().parse().ok()?;

    let rest = rest.trim().strip_prefix('"')?;
    let (name, rest) = rest.split_once('"')?;
    let mut channels = rest.strip_prefix(',')?.split(',').map(|c| c.trim().parse::<f32>());

    let mut rgb = [0.0f32; 3];
    for channel in rgb.iter_mut() {
        *channel = channels.next()?.ok()?;
    }

    Some((
        id,
        PaletteColor {
            name: name.to_string(),
            color: normalize_rgb(rgb),
        },
    ))
}

fn normalize_rgb(rgb: [f32; 3]) -> Rgb {
    rgb.map(|c| c.clamp(0.0, 255.0) / 255.0)
}
