//! Configuration tests
//!
//! These tests guard the config file format: every field written by
//! `to_toml()` must parse back into the same value. When you add a field,
//! the round-trip test fails until serialization is updated too.

use super::*;
use chrono::NaiveDate;
use std::collections::HashMap;

fn parse(toml_str: &str) -> FileConfig {
    toml::from_str(toml_str).unwrap_or_else(|e| panic!("TOML should parse: {e}\n{toml_str}"))
}

fn no_env(_: &str) -> Option<String> {
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// Verify that the default template parses back into the defaults.
#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let resolved = Config::resolve(parse(&toml_str), no_env).unwrap();
    assert_eq!(resolved, config);
}

/// Every field set to a non-default value survives serialization.
///
/// When you add a field, set it here; the equality check fails if
/// `to_toml()` forgets to write it.
#[test]
fn test_config_roundtrip_all_fields() {
    let mut config = Config::default();
    config.database.path = PathBuf::from("/tmp/shop/commerce.db");
    config.database.pool_size = 8;
    config.analytics.min_cohort_size = 25;
    config.analytics.low_frequency_min = 3;
    config.analytics.medium_frequency_min = 5;
    config.analytics.high_frequency_min = 10;
    config.analytics.as_of = NaiveDate::from_ymd_opt(2024, 12, 31);
    config.analytics.strict_integrity = true;
    config.output.format = crate::report::OutputFormat::Json;
    config.output.dir = PathBuf::from("/tmp/shop/reports");
    config.logging.level = "debug".to_string();
    config.logging.file.enabled = true;
    config.logging.file.dir = PathBuf::from("/tmp/shop/logs");
    config.logging.file.rotation = LogRotation::Hourly;
    config.logging.file.prefix = "shop".to_string();
    config.seed.rng_seed = 7;
    config.seed.customers = 11;
    config.seed.products = 12;
    config.seed.campaigns = 13;
    config.seed.orders = 14;

    let toml_str = config.to_toml();
    let resolved = Config::resolve(parse(&toml_str), no_env).unwrap();
    assert_eq!(resolved, config, "TOML:\n{toml_str}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_uses_defaults() {
    let config = Config::resolve(parse(""), no_env).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.analytics.min_cohort_size, 100);
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let file = parse(
        r#"
        [analytics]
        min_cohort_size = 10
        "#,
    );
    let config = Config::resolve(file, no_env).unwrap();
    assert_eq!(config.analytics.min_cohort_size, 10);
    assert_eq!(config.analytics.high_frequency_min, 7);
    assert_eq!(config.database, DatabaseConfig::default());
}

#[test]
fn test_env_overrides_file() {
    let file = parse(
        r#"
        [database]
        path = "from-file.db"

        [analytics]
        min_cohort_size = 10
        as_of = "2024-01-01"

        [output]
        format = "csv"
        "#,
    );
    let env: HashMap<&str, &str> = HashMap::from([
        (ENV_DB, "from-env.db"),
        (ENV_MIN_COHORT_SIZE, "50"),
        (ENV_AS_OF, "2024-06-30"),
        (ENV_FORMAT, "json"),
        (ENV_LOG_LEVEL, "warn"),
    ]);

    let config = Config::resolve(file, |k| env.get(k).map(|v| v.to_string())).unwrap();
    assert_eq!(config.database.path, PathBuf::from("from-env.db"));
    assert_eq!(config.analytics.min_cohort_size, 50);
    assert_eq!(config.analytics.as_of, NaiveDate::from_ymd_opt(2024, 6, 30));
    assert_eq!(config.output.format, crate::report::OutputFormat::Json);
    assert_eq!(config.logging.level, "warn");
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bad_env_values_rejected() {
    let bad_size = Config::resolve(parse(""), |k| {
        (k == ENV_MIN_COHORT_SIZE).then(|| "lots".to_string())
    });
    assert!(bad_size.is_err());

    let bad_format = Config::resolve(parse(""), |k| (k == ENV_FORMAT).then(|| "xml".to_string()));
    assert!(bad_format.is_err());
}

#[test]
fn test_bad_file_values_rejected() {
    let file = parse(
        r#"
        [output]
        format = "parquet"
        "#,
    );
    assert!(Config::resolve(file, no_env).is_err());

    let file = parse(
        r#"
        [analytics]
        low_frequency_min = 1
        "#,
    );
    assert!(Config::resolve(file, no_env).is_err());
}

#[test]
fn test_unknown_logging_values_rejected() {
    let file = parse(
        r#"
        [logging]
        file_rotation = "weekly"
        "#,
    );
    let err = Config::resolve(file, no_env).unwrap_err();
    assert!(format!("{err:#}").contains("file_rotation"), "{err:#}");

    let file = parse(
        r#"
        [logging]
        level = "verbose"
        "#,
    );
    assert!(Config::resolve(file, no_env).is_err());

    let bad_level = Config::resolve(parse(""), |k| (k == ENV_LOG_LEVEL).then(|| "loud".to_string()));
    assert!(bad_level.is_err());
}

#[test]
fn test_rotation_and_level_are_case_insensitive() {
    let file = parse(
        r#"
        [logging]
        level = "DEBUG"
        file_rotation = "Never"
        "#,
    );
    let config = Config::resolve(file, no_env).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file.rotation, LogRotation::Never);
}

// ─────────────────────────────────────────────────────────────────────────────
// Rewriting the file
// ─────────────────────────────────────────────────────────────────────────────

/// Backslashes and quotes in paths must survive the template.
#[test]
fn test_windows_paths_roundtrip() {
    let mut config = Config::default();
    config.database.path = PathBuf::from(r"C:\Users\shop\commerce.db");
    config.output.dir = PathBuf::from(r#"D:\reports\"q4""#);
    config.logging.file.dir = PathBuf::from(r"C:\logs");

    let toml_str = config.to_toml();
    let resolved = Config::resolve(parse(&toml_str), no_env).unwrap();
    assert_eq!(resolved, config, "TOML:\n{toml_str}");
}

/// `config --update` rewrites the file layer; env overrides stay out of it.
#[test]
fn test_file_layer_ignores_env_overrides() {
    std::env::set_var(ENV_DB, "/tmp/one-off.db");
    std::env::set_var(ENV_MIN_COHORT_SIZE, "5");

    let mut saved = Config::default();
    saved.analytics.min_cohort_size = 40;
    let rewritten = Config::from_file_layer(parse(&saved.to_toml())).unwrap();

    std::env::remove_var(ENV_DB);
    std::env::remove_var(ENV_MIN_COHORT_SIZE);

    assert_eq!(rewritten, saved);
    let written = rewritten.to_toml();
    assert!(!written.contains("one-off"), "{written}");
    assert!(written.contains("min_cohort_size = 40"), "{written}");
}
