//! Configuration for the cohort reports
//!
//! Configuration is loaded in order of precedence:
//! 1. Command-line flags (per run, applied by the CLI)
//! 2. Environment variables
//! 3. Config file (~/.config/commerce-cohorts/config.toml)
//! 4. Built-in defaults (lowest priority)

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod analytics;
mod database;
mod observability;
mod output;
mod serialization;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use analytics::{parse_date, AnalyticsConfig, FileAnalytics};
pub use database::{DatabaseConfig, FileDatabase, FileSeed, SeedConfig};
pub use observability::{parse_level, FileLogging, LogFileConfig, LogRotation, LoggingConfig};
pub use output::{FileOutput, OutputConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variables read by [`Config::from_env`]
pub const ENV_DB: &str = "COHORTS_DB";
pub const ENV_MIN_COHORT_SIZE: &str = "COHORTS_MIN_COHORT_SIZE";
pub const ENV_AS_OF: &str = "COHORTS_AS_OF";
pub const ENV_FORMAT: &str = "COHORTS_FORMAT";
pub const ENV_LOG_LEVEL: &str = "COHORTS_LOG_LEVEL";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Where the commerce database lives
    pub database: DatabaseConfig,

    /// Report policy (floor, buckets, as-of date)
    pub analytics: AnalyticsConfig,

    /// Default output format and save directory
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Synthetic dataset sizing
    pub seed: SeedConfig,
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    /// Optional [database] section
    pub database: Option<FileDatabase>,

    /// Optional [analytics] section
    pub analytics: Option<FileAnalytics>,

    /// Optional [output] section
    pub output: Option<FileOutput>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,

    /// Optional [seed] section
    pub seed: Option<FileSeed>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/commerce-cohorts/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| {
            p.join(".config")
                .join("commerce-cohorts")
                .join("config.toml")
        })
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        // Don't overwrite existing config
        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        // Use Config::default().to_toml() as single source of truth
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be parsed exits the process with
    /// a boxed error. Falling back to defaults would silently produce reports
    /// under a policy the user did not ask for.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Negative numbers where counts are expected");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `commerce-cohorts config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Result<Self> {
        let file = Self::load_file_config();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Load the config file alone, ignoring environment overrides.
    ///
    /// Used when rewriting the file, so a one-off `COHORTS_*` variable never
    /// becomes a permanent setting.
    pub fn from_file_only() -> Result<Self> {
        Self::from_file_layer(Self::load_file_config())
    }

    pub(crate) fn from_file_layer(file: FileConfig) -> Result<Self> {
        Self::resolve(file, |_| None)
    }

    /// Merge a parsed config file with environment overrides.
    ///
    /// `env` looks up a variable by name; tests pass a map instead of the
    /// process environment.
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut database = DatabaseConfig::from_file(file.database);
        let mut analytics = AnalyticsConfig::from_file(file.analytics)?;
        let mut output = OutputConfig::from_file(file.output)?;
        let mut logging = LoggingConfig::from_file(file.logging)?;
        let seed = SeedConfig::from_file(file.seed);

        // Database path: env > file > default
        if let Some(path) = env(ENV_DB) {
            database.path = PathBuf::from(path);
        }

        // Significance floor: env > file > default
        if let Some(size) = env(ENV_MIN_COHORT_SIZE) {
            analytics.min_cohort_size = size
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MIN_COHORT_SIZE}='{size}' is not a count"))?;
        }

        // As-of date: env > file > today
        if let Some(date) = env(ENV_AS_OF) {
            analytics.as_of = Some(parse_date(&date).with_context(|| format!("Invalid {ENV_AS_OF}"))?);
        }

        // Output format: env > file > default
        if let Some(format) = env(ENV_FORMAT) {
            output.format = format
                .parse()
                .map_err(|e| anyhow!("Invalid {ENV_FORMAT}: {e}"))?;
        }

        // Log level: env > file > default (RUST_LOG still wins at init)
        if let Some(level) = env(ENV_LOG_LEVEL) {
            logging.level = parse_level(&level).with_context(|| format!("Invalid {ENV_LOG_LEVEL}"))?;
        }

        Ok(Self {
            database,
            analytics,
            output,
            logging,
            seed,
        })
    }
}
