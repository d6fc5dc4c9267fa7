//! Tokenizer and metadata line parser for ASC rasters.

use serde::{Deserialize, Serialize};

use crate::error::LexicalError;

/// A decoded `name value` metadata line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataLine {
    pub name: String,
    pub value: i32,
}

/// Split a line into whitespace delimited tokens.
///
/// Leading, trailing and repeated whitespace is ignored, so an empty or
/// blank line yields no tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Parse a metadata line such as `ncols 10` into its name and integer value.
///
/// The value follows C `stoi` semantics: a decimal token like
/// `xllcorner 402.5` is accepted and truncated toward zero. Anything after
/// the second token is ignored.
pub fn parse_metadata_line(line: &str) -> Result<MetadataLine, LexicalError> {
    let tokens = tokenize(line);
    let [name, value, ..] = tokens.as_slice() else {
        return Err(LexicalError::new(format!(
            "metadata line needs a name and a value, got {:?}",
            line.trim()
        )));
    };

    let value = parse_header_int(value).ok_or_else(|| {
        LexicalError::new(format!("metadata value for '{}' is not a number: {}", name, value))
    })?;

    Ok(MetadataLine {
        name: (*name).to_string(),
        value,
    })
}

fn parse_header_int(token: &str) -> Option<i32> {
    if let Ok(value) = token.parse::<i32>() {
        return Some(value);
    }

    let value = token.parse::<f64>().ok()?;
    if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i32)
}
