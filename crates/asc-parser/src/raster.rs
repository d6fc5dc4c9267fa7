//! ASC raster grids and their loaders.

use std::fmt::Debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use num_traits::{Num, NumCast};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AscError, AscResult};
use crate::lexer::{parse_metadata_line, tokenize, MetadataLine};

/// Number of metadata lines preceding the raster body.
pub const HEADER_LINES: usize = 6;

/// Sample types an ASC body can be parsed into.
pub trait RasterValue: Num + NumCast + Copy + PartialEq + PartialOrd + FromStr + Debug {}

impl RasterValue for f32 {}
impl RasterValue for i32 {}

/// Decoded metadata block of an ASC raster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterHeader {
    pub ncols: usize,
    pub nrows: usize,
    pub nodata_value: i32,
    pub cell_size: i32,
    /// Metadata lines with names other than the four above (corner offsets etc.)
    pub extra: Vec<MetadataLine>,
}

impl RasterHeader {
    /// Build a header from decoded metadata lines.
    ///
    /// Names match exactly and case-sensitively. Unknown names are kept in
    /// `extra`; a later duplicate overrides an earlier one.
    pub fn from_lines(lines: Vec<MetadataLine>) -> AscResult<Self> {
        let mut ncols = None;
        let mut nrows = None;
        let mut nodata_value = None;
        let mut cell_size = None;
        let mut extra = Vec::new();

        for line in lines {
            match line.name.as_str() {
                "ncols" => ncols = Some(line.value),
                "nrows" => nrows = Some(line.value),
                "NODATA_value" => nodata_value = Some(line.value),
                "cellsize" => cell_size = Some(line.value),
                _ => extra.push(line),
            }
        }

        let ncols = ncols.ok_or(AscError::MissingHeader("ncols"))?;
        let nrows = nrows.ok_or(AscError::MissingHeader("nrows"))?;
        let nodata_value = nodata_value.ok_or(AscError::MissingHeader("NODATA_value"))?;
        let cell_size = cell_size.ok_or(AscError::MissingHeader("cellsize"))?;

        if ncols < 1 || nrows < 1 {
            return Err(AscError::InvalidHeader(format!(
                "raster must be at least 1x1, got {}x{}",
                nrows, ncols
            )));
        }
        if cell_size <= 0 {
            return Err(AscError::InvalidHeader(format!(
                "cellsize must be positive, got {}",
                cell_size
            )));
        }

        Ok(Self {
            ncols: ncols as usize,
            nrows: nrows as usize,
            nodata_value,
            cell_size,
            extra,
        })
    }
}

/// Row-major `rows x cols` grid of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
    /// Linear ground units per cell
    pub cell_size: i32,
    /// Sentinel marking missing samples
    pub nodata_value: i32,
}

impl<T> RasterGrid<T> {
    /// Create a grid from row-major data.
    ///
    /// Fails when `data.len() != rows * cols`.
    pub fn new(
        rows: usize,
        cols: usize,
        data: Vec<T>,
        cell_size: i32,
        nodata_value: i32,
    ) -> AscResult<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(AscError::InvalidHeader(format!(
                "grid data has {} samples, expected {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            data,
            cell_size,
            nodata_value,
        })
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self {
            rows,
            cols,
            data,
            cell_size: 1,
            nodata_value: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(row, col)`, `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col)
    }

    /// Samples of one row.
    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Apply `f` to every sample, keeping shape and metadata.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> RasterGrid<U> {
        RasterGrid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
            cell_size: self.cell_size,
            nodata_value: self.nodata_value,
        }
    }
}

impl<T: Copy> std::ops::Index<(usize, usize)> for RasterGrid<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.cols + col]
    }
}

/// Read an ASC raster from any buffered reader.
///
/// Reads exactly [`HEADER_LINES`] metadata lines, then `nrows` body rows of
/// exactly `ncols` samples. Blank lines in the body are skipped; non-blank
/// lines after the last row are ignored.
pub fn read_raster<T: RasterValue, R: BufRead>(reader: R) -> AscResult<RasterGrid<T>> {
    let mut lines = reader.lines().enumerate();

    let mut metadata = Vec::with_capacity(HEADER_LINES);
    for found in 0..HEADER_LINES {
        let Some((index, line)) = lines.next() else {
            return Err(AscError::ShortHeader {
                expected: HEADER_LINES,
                found,
            });
        };
        let line = line.map_err(|e| AscError::io("<raster>", e))?;
        let parsed = parse_metadata_line(&line).map_err(|source| AscError::Lexical {
            line: index + 1,
            source,
        })?;
        metadata.push(parsed);
    }
    let header = RasterHeader::from_lines(metadata)?;

    // Grows with the body; the header's dimensions are untrusted until rows arrive.
    let mut data = Vec::new();
    let mut row = 0;
    for (index, line) in lines.by_ref() {
        let line = line.map_err(|e| AscError::io("<raster>", e))?;
        let tokens = tokenize(&line);
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != header.ncols {
            return Err(AscError::RowWidth {
                row,
                expected: header.ncols,
                found: tokens.len(),
            });
        }
        for token in tokens {
            let value = token.parse::<T>().map_err(|_| {
                AscError::lexical(index + 1, format!("unrecognized sample token '{}'", token))
            })?;
            data.push(value);
        }
        row += 1;
        if row == header.nrows {
            break;
        }
    }

    if row < header.nrows {
        return Err(AscError::ShortBody {
            expected: header.nrows,
            found: row,
        });
    }

    let trailing = lines
        .filter(|(_, line)| line.as_ref().map(|l| !l.trim().is_empty()).unwrap_or(false))
        .count();
    if trailing > 0 {
        warn!(trailing, "Ignoring lines after the last raster row");
    }

    RasterGrid::new(
        header.nrows,
        header.ncols,
        data,
        header.cell_size,
        header.nodata_value,
    )
}

fn load_raster<T: RasterValue>(path: &Path) -> AscResult<RasterGrid<T>> {
    let file = File::open(path).map_err(|e| AscError::io(path, e))?;
    let grid = read_raster(BufReader::new(file)).map_err(|e| match e {
        AscError::Io { source, .. } => AscError::io(path, source),
        other => other,
    })?;
    debug!(
        path = %path.display(),
        rows = grid.rows(),
        cols = grid.cols(),
        "Loaded ASC raster"
    );
    Ok(grid)
}

/// Load an ASC raster of 32-bit float samples.
pub fn load_float_raster(path: impl AsRef<Path>) -> AscResult<RasterGrid<f32>> {
    load_raster(path.as_ref())
}

/// Load an ASC raster of 32-bit signed integer samples.
pub fn load_int_raster(path: impl AsRef<Path>) -> AscResult<RasterGrid<i32>> {
    load_raster(path.as_ref())
}
