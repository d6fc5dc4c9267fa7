//! Error types for ASC parsing operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for ASC parser operations.
pub type AscResult<T> = Result<T, AscError>;

/// A token that could not be lexed into the expected shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("LexicalError: {message}")]
pub struct LexicalError {
    pub message: String,
}

impl LexicalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error types for raster, config and palette parsing.
#[derive(Error, Debug)]
pub enum AscError {
    /// File could not be opened or read
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unreadable token on a given (1-based) line
    #[error("line {line}: {source}")]
    Lexical {
        line: usize,
        #[source]
        source: LexicalError,
    },

    /// The six metadata lines did not provide a required key
    #[error("Missing required header key: {0}")]
    MissingHeader(&'static str),

    /// Header was present but unusable (zero dimensions, zero cellsize)
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The file ended inside the metadata block
    #[error("Header truncated: expected {expected} metadata lines, found {found}")]
    ShortHeader { expected: usize, found: usize },

    /// Fewer body rows than `nrows`
    #[error("Raster body truncated: expected {expected} rows, found {found}")]
    ShortBody { expected: usize, found: usize },

    /// A body row with the wrong number of samples
    #[error("Row {row} has {found} samples, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Config key required by the caller is absent or empty
    #[error("Missing required config key: {0}")]
    MissingKey(String),

    /// Config value present but not parseable
    #[error("Invalid value for config key '{key}': {value}")]
    InvalidValue { key: String, value: String },

    /// Vegetation code without an `R<id>=<type>` record
    #[error("Unknown palette type code: {0}")]
    UnknownPaletteType(i32),

    /// Redirection points to an id without an `I<id>=...` record
    #[error("Palette type {code} redirects to undefined color id {id}")]
    UnknownPaletteId { code: i32, id: u32 },
}

impl AscError {
    /// Wrap an I/O error with the path being read.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a Lexical error for a 1-based line number.
    pub fn lexical(line: usize, message: impl Into<String>) -> Self {
        Self::Lexical {
            line,
            source: LexicalError::new(message),
        }
    }
}
