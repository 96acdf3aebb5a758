//! Database location and synthetic dataset sizing

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Database Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Database configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// Read pool size for report runs
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/commerce.db"),
            pool_size: 4,
        }
    }
}

/// Database settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileDatabase {
    pub path: Option<String>,
    pub pool_size: Option<u32>,
}

impl DatabaseConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileDatabase>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            path: file.path.map(PathBuf::from).unwrap_or(defaults.path),
            pool_size: file.pool_size.unwrap_or(defaults.pool_size).max(1),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Seed Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Size and RNG seed of the synthetic dataset written by `seed`
#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    pub rng_seed: u64,
    pub customers: usize,
    pub products: usize,
    pub campaigns: usize,
    pub orders: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            customers: 10_000,
            products: 1_000,
            campaigns: 50,
            orders: 50_000,
        }
    }
}

/// Seed settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileSeed {
    pub rng_seed: Option<u64>,
    pub customers: Option<usize>,
    pub products: Option<usize>,
    pub campaigns: Option<usize>,
    pub orders: Option<usize>,
}

impl SeedConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileSeed>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            rng_seed: file.rng_seed.unwrap_or(defaults.rng_seed),
            customers: file.customers.unwrap_or(defaults.customers),
            products: file.products.unwrap_or(defaults.products),
            campaigns: file.campaigns.unwrap_or(defaults.campaigns),
            orders: file.orders.unwrap_or(defaults.orders),
        }
    }
}
