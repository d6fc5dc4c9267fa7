//! Parsers for the text inputs of a terrain map.
//!
//! A map directory holds a `config.txt` naming its rasters:
//!
//! - Elevation (`ELEV_MAP`): float ASC raster
//! - Vegetation (`VEGETATION_MAP`): integer ASC raster of palette type codes
//! - Wind direction (`WIND_MAP`): integer ASC raster, degrees
//! - Wind magnitude (`INT_WIND`): float ASC raster
//! - Palette (`PALETA`): `R<id>=<type>` / `I<id>="<name>",r,g,b` records
//!
//! ASC rasters carry six `key value` metadata lines followed by `nrows`
//! lines of `ncols` whitespace separated samples.

pub mod config;
pub mod error;
pub mod lexer;
pub mod palette;
pub mod raster;

pub use config::{is_map_dir, ConfigFile, CONFIG_FILE_NAME};
pub use error::{AscError, AscResult, LexicalError};
pub use lexer::{parse_metadata_line, tokenize, MetadataLine};
pub use palette::{PaletteColor, PaletteDatabase, Rgb};
pub use raster::{
    load_float_raster, load_int_raster, read_raster, RasterGrid, RasterHeader, RasterValue,
    HEADER_LINES,
};
