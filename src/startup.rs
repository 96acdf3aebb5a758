// Startup module - run banner and dataset summaries
//
// Everything here writes to stderr or the log. Stdout belongs to report
// output, so nothing printed here can end up inside a piped CSV or JSON file.

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// Log the effective configuration at the start of a run
pub fn log_startup(config: &Config, command: &str) {
    tracing::info!("commerce-cohorts v{} ({})", VERSION, command);

    match Config::config_path() {
        Some(path) if path.exists() => tracing::debug!("Config: {}", path.display()),
        _ => tracing::debug!("Config: defaults (no config file)"),
    }

    let analytics = &config.analytics;
    tracing::debug!(
        db = %config.database.path.display(),
        min_cohort_size = analytics.min_cohort_size,
        low_frequency_min = analytics.low_frequency_min,
        medium_frequency_min = analytics.medium_frequency_min,
        high_frequency_min = analytics.high_frequency_min,
        as_of = %analytics.as_of_or_today(),
        strict_integrity = analytics.strict_integrity,
        "Effective policy"
    );
}

/// Print per-table row counts after `schema` or `seed`
pub fn print_data_summary(config: &Config, counts: &[(&'static str, i64)]) {
    use colors::*;

    eprintln!();
    eprintln!("  {BOLD}{CYAN}commerce-cohorts{RESET} {DIM}v{VERSION}{RESET}");
    eprintln!(
        "  {DIM}Database:{RESET} {}",
        config.database.path.display()
    );
    eprintln!();

    for (table, count) in counts {
        let icon = if *count > 0 {
            format!("{GREEN}✓{RESET}")
        } else {
            format!("{DIM}○{RESET}")
        };
        eprintln!("    {icon} {:<22} {DIM}{:>10} rows{RESET}", table, count);
    }

    let total: i64 = counts.iter().map(|(_, n)| n).sum();
    eprintln!();
    if total == 0 {
        eprintln!("  {YELLOW}▸{RESET} Empty dataset. Run {BOLD}commerce-cohorts seed{RESET} to generate one.");
    } else {
        eprintln!("  {GREEN}▸{RESET} Ready. Try {BOLD}commerce-cohorts report all{RESET}");
    }
    eprintln!();
}
