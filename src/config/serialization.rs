//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// Quote a value as a TOML string, escaping backslashes and quotes
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

impl Config {
    /// Serialize config to TOML string (single source of truth for format)
    pub fn to_toml(&self) -> String {
        format!(
            r#"# commerce-cohorts configuration
#
# Environment variables override this file:
#   COHORTS_DB, COHORTS_MIN_COHORT_SIZE, COHORTS_AS_OF, COHORTS_FORMAT, COHORTS_LOG_LEVEL

[database]
# SQLite file read by reports and written by `schema` / `seed`
path = {db_path}
# Read connections kept open during a report run
pool_size = {pool_size}

[analytics]
# Cohorts with fewer period-0 customers are left out of the retention table
min_cohort_size = {min_cohort_size}
# Distinct-order minimums for the frequency buckets (1 order is always one-time)
low_frequency_min = {low_min}
medium_frequency_min = {medium_min}
high_frequency_min = {high_min}
# Reference date for days-since-last-order (defaults to today, UTC)
{as_of}# Refuse to report when orders or order lines reference missing rows
strict_integrity = {strict}

[output]
format = {format}  # text, csv, json
# Directory used by `report --save`
dir = {output_dir}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}

# Synthetic dataset written by `seed`
[seed]
rng_seed = {rng_seed}
customers = {seed_customers}
products = {seed_products}
campaigns = {seed_campaigns}
orders = {seed_orders}
"#,
            db_path = toml_string(&self.database.path.display().to_string()),
            pool_size = self.database.pool_size,
            min_cohort_size = self.analytics.min_cohort_size,
            low_min = self.analytics.low_frequency_min,
            medium_min = self.analytics.medium_frequency_min,
            high_min = self.analytics.high_frequency_min,
            as_of = self
                .analytics
                .as_of
                .map(|d| format!("as_of = \"{}\"\n", d.format("%Y-%m-%d")))
                .unwrap_or_else(|| "# as_of = \"2024-12-31\"\n".to_string()),
            strict = self.analytics.strict_integrity,
            format = toml_string(self.output.format.as_str()),
            output_dir = toml_string(&self.output.dir.display().to_string()),
            log_level = toml_string(&self.logging.level),
            log_file_enabled = self.logging.file.enabled,
            log_file_dir = toml_string(&self.logging.file.dir.display().to_string()),
            log_file_rotation = toml_string(self.logging.file.rotation.as_str()),
            log_file_prefix = toml_string(&self.logging.file.prefix),
            rng_seed = self.seed.rng_seed,
            seed_customers = self.seed.customers,
            seed_products = self.seed.products,
            seed_campaigns = self.seed.campaigns,
            seed_orders = self.seed.orders,
        )
    }

    /// Save current configuration to file
    pub fn save(&self) -> Result<(), std::io::Error> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml())
    }
}
