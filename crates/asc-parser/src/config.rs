//! `config.txt` map descriptor.
//!
//! One `KEY=value` pair per line; `#` starts a comment that is stripped
//! from the value. Relative file names are resolved against the directory
//! holding the config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::trace;

use crate::error::{AscError, AscResult};

/// File name a map directory must contain.
pub const CONFIG_FILE_NAME: &str = "config.txt";

/// Whether `dir` looks like a loadable map (contains `config.txt`).
pub fn is_map_dir(dir: impl AsRef<Path>) -> bool {
    dir.as_ref().join(CONFIG_FILE_NAME).is_file()
}

/// Parsed key/value map descriptor.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    dir: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Read `config.txt` beneath `dir`.
    pub fn open(dir: impl AsRef<Path>) -> AscResult<Self> {
        let dir = dir.as_ref();
        let path = dir.join(CONFIG_FILE_NAME);
        let text = std::fs::read_to_string(&path).map_err(|e| AscError::io(&path, e))?;
        Ok(Self::parse(dir, &text))
    }

    /// Parse config text as if it lived in `dir`.
    ///
    /// Lines without `=` are ignored. Keys and values are trimmed; a later
    /// duplicate key overrides an earlier one.
    pub fn parse(dir: impl Into<PathBuf>, text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() || key.starts_with('#') {
                continue;
            }
            let value = value.split('#').next().unwrap_or_default().trim();
            trace!(key, value, "config entry");
            entries.insert(key.to_string(), value.to_string());
        }
        Self {
            dir: dir.into(),
            entries,
        }
    }

    /// Stored value for `key`, or `""` when absent.
    pub fn value(&self, key: &str) -> &str {
        self.entries.get(key).map(String::as_str).unwrap_or("")
    }

    /// Whether `key` is present with a non-empty value.
    pub fn contains(&self, key: &str) -> bool {
        !self.value(key).is_empty()
    }

    /// Stored value for `key`, failing with `MissingKey` when absent or empty.
    pub fn require(&self, key: &str) -> AscResult<&str> {
        match self.value(key) {
            "" => Err(AscError::MissingKey(key.to_string())),
            value => Ok(value),
        }
    }

    /// Parse a required value.
    pub fn require_parsed<T: FromStr>(&self, key: &str) -> AscResult<T> {
        let value = self.require(key)?;
        value.parse().map_err(|_| AscError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// Resolve a required file name against the config directory.
    pub fn require_path(&self, key: &str) -> AscResult<PathBuf> {
        Ok(self.dir.join(self.require(key)?))
    }

    /// Resolve an optional file name against the config directory.
    pub fn path(&self, key: &str) -> Option<PathBuf> {
        match self.value(key) {
            "" => None,
            value => Some(self.dir.join(value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
