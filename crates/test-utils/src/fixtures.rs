//! On-disk map fixtures.
//!
//! [`MapFixture`] writes a complete map directory (`config.txt`, ASC rasters,
//! palette) into a temporary directory that is removed on drop.

use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// NODATA sentinel used by the generated rasters.
pub const NODATA: i32 = -9999;

/// Palette with two vegetation types: 1 → "Grass" (green), 2 → "Rock" (gray).
pub const SAMPLE_PALETTE: &str = "\
R10=1
R20=2
I10=\"Grass\",0,255,0
I20=\"Rock\",128,128,128
";

/// The 3x3 raster with one NODATA cell used across the test suite.
pub const NODATA_3X3_ASC: &str = "\
ncols 3
nrows 3
xllcorner 0
yllcorner 0
NODATA_value -9999
cellsize 1
1 2 3
4 -9999 6
7 8 9
";

/// Render a row-major grid as ASC text.
pub fn format_asc<T: Display>(
    rows: usize,
    cols: usize,
    cell_size: i32,
    nodata: i32,
    data: &[T],
) -> String {
    assert_eq!(data.len(), rows * cols, "grid data does not match shape");

    let mut text = format!(
        "ncols {}\nnrows {}\nxllcorner 0\nyllcorner 0\ncellsize {}\nNODATA_value {}\n",
        cols, rows, cell_size, nodata
    );
    for row in data.chunks(cols) {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    text
}

/// Builder for a map directory on disk.
pub struct MapFixture {
    dir: TempDir,
    rows: usize,
    cols: usize,
    config: Vec<(String, String)>,
}

impl MapFixture {
    /// Start a map of `rows x cols` cells; writes `ROWS`/`COLS` into the config.
    pub fn new(rows: usize, cols: usize) -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
            rows,
            cols,
            config: vec![
                ("ROWS".to_string(), rows.to_string()),
                ("COLS".to_string(), cols.to_string()),
            ],
        })
    }

    fn write(&self, name: &str, contents: &str) -> io::Result<()> {
        fs::write(self.dir.path().join(name), contents)
    }

    /// Set an arbitrary config entry.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.config.push((key.to_string(), value.to_string()));
        self
    }

    /// Write an arbitrary file into the map directory.
    pub fn with_file(self, name: &str, contents: &str) -> io::Result<Self> {
        self.write(name, contents)?;
        Ok(self)
    }

    /// Write `elev.asc` and reference it as `ELEV_MAP`.
    pub fn with_elevation(self, cell_size: i32, data: &[f32]) -> io::Result<Self> {
        let text = format_asc(self.rows, self.cols, cell_size, NODATA, data);
        self.write("elev.asc", &text)?;
        Ok(self.with_entry("ELEV_MAP", "elev.asc"))
    }

    /// Write `vege.asc` + `paleta.txt` and reference them.
    pub fn with_vegetation(self, data: &[i32], palette: &str) -> io::Result<Self> {
        let text = format_asc(self.rows, self.cols, 1, NODATA, data);
        self.write("vege.asc", &text)?;
        self.write("paleta.txt", palette)?;
        Ok(self
            .with_entry("VEGETATION_MAP", "vege.asc")
            .with_entry("PALETA", "paleta.txt"))
    }

    /// Write `dir.asc` (degrees) + `vel.asc` (magnitude) and reference them.
    pub fn with_wind(self, directions: &[i32], magnitudes: &[f32]) -> io::Result<Self> {
        let dir_text = format_asc(self.rows, self.cols, 1, NODATA, directions);
        let vel_text = format_asc(self.rows, self.cols, 1, NODATA, magnitudes);
        self.write("dir.asc", &dir_text)?;
        self.write("vel.asc", &vel_text)?;
        Ok(self
            .with_entry("WIND_MAP", "dir.asc")
            .with_entry("INT_WIND", "vel.asc"))
    }

    /// Write `config.txt` and hand back the finished directory.
    pub fn build(self) -> io::Result<TempMap> {
        let mut text = String::new();
        for (key, value) in &self.config {
            text.push_str(&format!("{}={}\n", key, value));
        }
        self.write("config.txt", &text)?;
        Ok(TempMap { dir: self.dir })
    }
}

/// A map directory that is deleted when dropped.
pub struct TempMap {
    dir: TempDir,
}

impl TempMap {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}
