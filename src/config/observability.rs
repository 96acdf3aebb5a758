//! Logging configuration
//!
//! Console logs always go to stderr. The `[logging]` section picks the level
//! for this crate and, optionally, a JSON log file with rotation.

use anyhow::{anyhow, bail, Result};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Levels accepted for `[logging].level` and `COHORTS_LOG_LEVEL`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Normalize a log level, rejecting anything tracing would not understand
pub fn parse_level(level: &str) -> Result<String> {
    let level = level.trim().to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        bail!("unknown log level '{level}' (expected one of {})", LOG_LEVELS.join(", "));
    }
    Ok(level)
}

/// How often the JSON log file starts a new segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// A single file that grows forever
    Never,
}

impl LogRotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }
}

impl FromStr for LogRotation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "never" => Ok(Self::Never),
            other => Err(format!(
                "unknown log rotation '{other}' (expected hourly, daily or never)"
            )),
        }
    }
}

impl fmt::Display for LogRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON log file settings
#[derive(Debug, Clone, PartialEq)]
pub struct LogFileConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub rotation: LogRotation,
    /// File name prefix; the appender adds the date suffix
    pub prefix: String,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("./logs"),
            rotation: LogRotation::Daily,
            prefix: "commerce-cohorts".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level for this crate; dependencies stay at warn
    pub level: String,
    pub file: LogFileConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: LogFileConfig::default(),
        }
    }
}

/// `[logging]` as written in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Merge the `[logging]` section over the defaults.
    ///
    /// An unknown level or rotation is an error, same as any other bad value
    /// in the file.
    pub fn from_file(file: Option<FileLogging>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let level = match file.level {
            Some(level) => parse_level(&level).map_err(|e| anyhow!("Invalid [logging].level: {e}"))?,
            None => defaults.level,
        };
        let rotation = match file.file_rotation {
            Some(s) => s
                .parse::<LogRotation>()
                .map_err(|e| anyhow!("Invalid [logging].file_rotation: {e}"))?,
            None => defaults.file.rotation,
        };

        Ok(Self {
            level,
            file: LogFileConfig {
                enabled: file.file_enabled.unwrap_or(defaults.file.enabled),
                dir: file.file_dir.map(PathBuf::from).unwrap_or(defaults.file.dir),
                rotation,
                prefix: file.file_prefix.unwrap_or(defaults.file.prefix),
            },
        })
    }
}
