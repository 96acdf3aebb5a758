//! Analytics policy: significance floor, frequency buckets, as-of date
//!
//! These are the knobs that change report numbers, so they are validated
//! when the config is loaded rather than when a report runs.

use crate::pipeline::ltv::FrequencyThresholds;
use crate::pipeline::PipelinePolicy;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

/// Analytics configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsConfig {
    /// Cohorts with fewer period-0 customers are left out of the retention table
    pub min_cohort_size: u64,
    /// Minimum distinct orders for the Low Frequency bucket
    pub low_frequency_min: u64,
    /// Minimum distinct orders for the Medium Frequency bucket
    pub medium_frequency_min: u64,
    /// Minimum distinct orders for the High Frequency bucket
    pub high_frequency_min: u64,
    /// Reference date for recency; `None` means today (UTC)
    pub as_of: Option<NaiveDate>,
    /// Refuse to report when orphaned rows exist
    pub strict_integrity: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        let thresholds = FrequencyThresholds::default();
        Self {
            min_cohort_size: 100,
            low_frequency_min: thresholds.low_min(),
            medium_frequency_min: thresholds.medium_min(),
            high_frequency_min: thresholds.high_min(),
            as_of: None,
            strict_integrity: false,
        }
    }
}

/// Analytics settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileAnalytics {
    pub min_cohort_size: Option<u64>,
    pub low_frequency_min: Option<u64>,
    pub medium_frequency_min: Option<u64>,
    pub high_frequency_min: Option<u64>,
    /// `YYYY-MM-DD`
    pub as_of: Option<String>,
    pub strict_integrity: Option<bool>,
}

impl AnalyticsConfig {
    /// Create from file config with defaults.
    ///
    /// # Errors
    /// Fails on an unparseable `as_of` date or thresholds that are not
    /// strictly increasing.
    pub fn from_file(file: Option<FileAnalytics>) -> Result<Self> {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let as_of = file
            .as_of
            .as_deref()
            .map(parse_date)
            .transpose()
            .context("Invalid [analytics].as_of")?;

        let config = Self {
            min_cohort_size: file.min_cohort_size.unwrap_or(defaults.min_cohort_size),
            low_frequency_min: file.low_frequency_min.unwrap_or(defaults.low_frequency_min),
            medium_frequency_min: file
                .medium_frequency_min
                .unwrap_or(defaults.medium_frequency_min),
            high_frequency_min: file.high_frequency_min.unwrap_or(defaults.high_frequency_min),
            as_of,
            strict_integrity: file.strict_integrity.unwrap_or(defaults.strict_integrity),
        };
        config.thresholds().context("Invalid [analytics] frequency thresholds")?;
        Ok(config)
    }

    /// Validated frequency thresholds
    pub fn thresholds(&self) -> Result<FrequencyThresholds> {
        FrequencyThresholds::new(
            self.low_frequency_min,
            self.medium_frequency_min,
            self.high_frequency_min,
        )
    }

    /// The configured as-of date, or today (UTC) when unset
    pub fn as_of_or_today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Policy handed to the pipeline for one run
    pub fn policy(&self) -> Result<PipelinePolicy> {
        Ok(PipelinePolicy {
            min_cohort_size: self.min_cohort_size,
            thresholds: self.thresholds()?,
            as_of: self.as_of_or_today(),
        })
    }
}

/// Parse a `YYYY-MM-DD` date from config, env or CLI
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("'{s}' is not a YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_pipeline_defaults() {
        let config = AnalyticsConfig::from_file(None).unwrap();
        assert_eq!(config.min_cohort_size, 100);
        assert_eq!(config.thresholds().unwrap(), FrequencyThresholds::default());
        assert!(!config.strict_integrity);
    }

    #[test]
    fn test_as_of_parsed_from_file() {
        let config = AnalyticsConfig::from_file(Some(FileAnalytics {
            as_of: Some("2024-06-30".to_string()),
            ..Default::default()
        }))
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        assert_eq!(config.as_of, Some(date));
        assert_eq!(config.as_of_or_today(), date);
        assert_eq!(config.policy().unwrap().as_of, date);
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = AnalyticsConfig::from_file(Some(FileAnalytics {
            as_of: Some("30/06/2024".to_string()),
            ..Default::default()
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_increasing_thresholds_rejected() {
        let result = AnalyticsConfig::from_file(Some(FileAnalytics {
            medium_frequency_min: Some(7),
            high_frequency_min: Some(7),
            ..Default::default()
        }));
        assert!(result.is_err());
    }
}
