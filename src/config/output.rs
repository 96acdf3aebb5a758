//! Report output defaults

use crate::report::OutputFormat;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Output configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    /// Format used when `--format` is not given
    pub format: OutputFormat,
    /// Directory reports are saved to with `--save`
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            dir: PathBuf::from("./reports"),
        }
    }
}

/// Output settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileOutput {
    pub format: Option<String>,
    pub dir: Option<String>,
}

impl OutputConfig {
    /// Create from file config with defaults.
    ///
    /// An unknown format is an error rather than a silent fallback, since it
    /// changes what lands on disk.
    pub fn from_file(file: Option<FileOutput>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let format = match file.format {
            Some(s) => s
                .parse::<OutputFormat>()
                .map_err(|e| anyhow!("Invalid [output].format: {e}"))?,
            None => defaults.format,
        };

        Ok(Self {
            format,
            dir: file.dir.map(PathBuf::from).unwrap_or(defaults.dir),
        })
    }
}
