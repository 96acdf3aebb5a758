// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - report <kind>: Run the pipeline and render one or all report tables
// - schema: Create the tables in the configured database
// - seed: Replace the database contents with a synthetic dataset
// - config --show|--reset|--edit|--update|--path: Manage the config file
//
// Flags override env vars and the config file for a single run only.

use crate::config::{parse_date, Config, VERSION};
use crate::pipeline::CohortPipeline;
use crate::report::{self, OutputFormat, ReportKind, ReportSink, TableOptions};
use crate::startup;
use crate::store::{schema, seed, CommerceStore};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

/// Commerce Cohorts - cohort retention, revenue and lifetime value reports
#[derive(Parser)]
#[command(name = "commerce-cohorts")]
#[command(version = VERSION)]
#[command(
    about = "Cohort retention, cumulative revenue and LTV segmentation over a commerce database",
    long_about = None
)]
pub struct Cli {
    /// SQLite database (overrides COHORTS_DB and [database].path)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Data(DataCommand),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Commands that work on the database and need logging
#[derive(Subcommand)]
pub enum DataCommand {
    /// Run the pipeline and render a report
    Report(ReportArgs),

    /// Create the database schema (safe to re-run)
    Schema,

    /// Replace all data with a deterministic synthetic dataset
    Seed(SeedArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Show effective configuration
    #[arg(long)]
    pub show: bool,

    /// Reset config file to defaults
    #[arg(long)]
    pub reset: bool,

    /// Open config file in $EDITOR
    #[arg(long)]
    pub edit: bool,

    /// Update config with new defaults (preserves file values, ignores env overrides)
    #[arg(long)]
    pub update: bool,

    /// Show config file path
    #[arg(long)]
    pub path: bool,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Which report to produce
    #[arg(value_enum)]
    pub kind: ReportKind,

    /// Output format (defaults to [output].format)
    #[arg(long, short, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write to this file instead of stdout
    #[arg(long, short, value_name = "FILE", conflicts_with = "save")]
    pub output: Option<PathBuf>,

    /// Save to <[output].dir>/<kind>.<ext> instead of stdout
    #[arg(long)]
    pub save: bool,

    /// Reference date for recency, YYYY-MM-DD (defaults to today)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,

    /// Minimum period-0 cohort size for the retention table
    #[arg(long, value_name = "N")]
    pub min_cohort_size: Option<u64>,

    /// Limit the customer listing to the top N customers by revenue
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Fail if any order or order line references a missing row
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct SeedArgs {
    /// RNG seed (same seed and sizes give the same dataset)
    #[arg(long)]
    pub rng_seed: Option<u64>,

    #[arg(long)]
    pub customers: Option<usize>,

    #[arg(long)]
    pub products: Option<usize>,

    #[arg(long)]
    pub campaigns: Option<usize>,

    #[arg(long)]
    pub orders: Option<usize>,

    /// Latest date generated rows may carry, YYYY-MM-DD (defaults to [analytics].as_of or today)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Run a data command (report, schema, seed) against the loaded config
pub fn run(command: DataCommand, mut config: Config, db: Option<PathBuf>) -> Result<()> {
    if let Some(path) = db {
        config.database.path = path;
    }

    match command {
        DataCommand::Report(args) => handle_report(config, args),
        DataCommand::Schema => handle_schema(&config),
        DataCommand::Seed(args) => handle_seed(config, args),
    }
}

/// Short name for log lines
pub fn command_name(command: &DataCommand) -> &'static str {
    match command {
        DataCommand::Report(args) => match args.kind {
            ReportKind::Retention => "report retention",
            ReportKind::Revenue => "report revenue",
            ReportKind::Ltv => "report ltv",
            ReportKind::Customers => "report customers",
            ReportKind::Trends => "report trends",
            ReportKind::All => "report all",
        },
        DataCommand::Schema => "schema",
        DataCommand::Seed(_) => "seed",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Data commands
// ─────────────────────────────────────────────────────────────────────────────

fn handle_report(mut config: Config, args: ReportArgs) -> Result<()> {
    if let Some(date) = &args.as_of {
        config.analytics.as_of = Some(parse_date(date).context("Invalid --as-of")?);
    }
    if let Some(size) = args.min_cohort_size {
        config.analytics.min_cohort_size = size;
    }
    if args.strict {
        config.analytics.strict_integrity = true;
    }

    let policy = config.analytics.policy()?;
    let format = args.format.unwrap_or(config.output.format);

    let store = CommerceStore::open_read_only(&config.database.path, config.database.pool_size)?;
    if config.analytics.strict_integrity {
        store.ensure_integrity()?;
    }

    let output = CohortPipeline::new(policy).run(&store)?;
    let tables = report::tables(
        args.kind,
        &output,
        TableOptions {
            customer_limit: args.limit,
        },
    );

    // Render fully before touching the sink
    let rendered = report::render(&tables, format)?;

    let sink = match args.output {
        Some(path) => ReportSink::File(path),
        None if args.save => ReportSink::in_dir(&config.output.dir, args.kind, format),
        None => ReportSink::Stdout,
    };
    sink.write(&rendered)
}

fn handle_schema(config: &Config) -> Result<()> {
    let conn = schema::open_writable(&config.database.path)?;
    schema::create_schema(&conn)?;
    drop(conn);

    print_counts(config)
}

fn handle_seed(config: Config, args: SeedArgs) -> Result<()> {
    let as_of = match &args.as_of {
        Some(date) => parse_date(date).context("Invalid --as-of")?,
        None => config.analytics.as_of_or_today(),
    };

    let options = seed::SeedOptions {
        rng_seed: args.rng_seed.unwrap_or(config.seed.rng_seed),
        customers: args.customers.unwrap_or(config.seed.customers),
        products: args.products.unwrap_or(config.seed.products),
        campaigns: args.campaigns.unwrap_or(config.seed.campaigns),
        orders: args.orders.unwrap_or(config.seed.orders),
        as_of,
    };

    let mut conn = schema::open_writable(&config.database.path)?;
    schema::create_schema(&conn)?;
    let summary = seed::seed(&mut conn, &options)?;
    drop(conn);

    tracing::info!(
        rng_seed = options.rng_seed,
        as_of = %options.as_of,
        orders = summary.orders,
        order_items = summary.order_items,
        "Seeded {}",
        config.database.path.display()
    );

    print_counts(&config)
}

fn print_counts(config: &Config) -> Result<()> {
    let store = CommerceStore::open_read_only(&config.database.path, 1)?;
    let counts = store.table_counts()?;
    startup::print_data_summary(config, &counts);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Config command
// ─────────────────────────────────────────────────────────────────────────────

/// Handle `config`. Runs before logging is set up.
pub fn handle_config(args: &ConfigArgs) -> Result<()> {
    if args.path {
        handle_config_path()
    } else if args.show {
        handle_config_show()
    } else if args.reset {
        handle_config_reset()
    } else if args.edit {
        handle_config_edit()
    } else if args.update {
        handle_config_update()
    } else {
        // No flag provided, show help
        println!("Usage: commerce-cohorts config [--show|--reset|--edit|--update|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --update  Update config with new defaults (preserves file values)");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn config_path() -> Result<PathBuf> {
    Config::config_path().context("Could not determine config path")
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    // Show source info
    println!();
    let path = config_path()?;
    if path.exists() {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: defaults (no config file)");
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = config_path()?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    Config::default()
        .save()
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = config_path()?;

    // Ensure config exists
    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    // Get editor from environment
    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            // Platform-specific fallback
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!("Failed to launch editor '{editor}'. Set $EDITOR to your preferred editor")
    })?;

    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

fn handle_config_update() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        // No existing config, just create default
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return Ok(());
    }

    // Re-serialize the file alone so new keys appear with defaults
    let existing = Config::from_file_only()?;

    let backup_path = path.with_extension("toml.bak");
    match std::fs::copy(&path, &backup_path) {
        Ok(_) => println!("Backup created: {}", backup_path.display()),
        Err(e) => eprintln!("Warning: Could not create backup: {}", e),
    }

    existing
        .save()
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config updated with latest structure: {}", path.display());
    println!("Your file values have been preserved (COHORTS_* overrides were not written).");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_report_flags() {
        let cli = Cli::parse_from([
            "commerce-cohorts",
            "--db",
            "shop.db",
            "report",
            "customers",
            "--format",
            "csv",
            "--limit",
            "10",
            "--as-of",
            "2024-12-31",
        ]);
        assert_eq!(cli.db, Some(PathBuf::from("shop.db")));
        let Commands::Data(DataCommand::Report(args)) = cli.command else {
            panic!("expected report command");
        };
        assert_eq!(args.kind, ReportKind::Customers);
        assert_eq!(args.format, Some(OutputFormat::Csv));
        assert_eq!(args.limit, Some(10));
        assert_eq!(args.as_of.as_deref(), Some("2024-12-31"));
        assert!(!args.save);
    }

    #[test]
    fn test_parse_config_flags() {
        let cli = Cli::parse_from(["commerce-cohorts", "config", "--update"]);
        let Commands::Config(args) = cli.command else {
            panic!("expected config command");
        };
        assert!(args.update);
        assert!(!args.show && !args.reset && !args.edit && !args.path);

        let cli = Cli::parse_from(["commerce-cohorts", "schema"]);
        assert!(matches!(cli.command, Commands::Data(DataCommand::Schema)));
    }

    #[test]
    fn test_output_and_save_conflict() {
        let result = Cli::try_parse_from([
            "commerce-cohorts",
            "report",
            "all",
            "--output",
            "x.txt",
            "--save",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_end_to_end_against_seeded_file() {
        use crate::store::test_support::TempDb;

        let db = TempDb::new("cli-report");
        let out_dir = tempfile::tempdir().unwrap();
        let out = out_dir.path().join("all.json");

        let mut config = Config::default();
        config.database.path = db.path.clone();
        config.analytics.as_of = chrono::NaiveDate::from_ymd_opt(2024, 12, 31);
        config.seed.customers = 50;
        config.seed.products = 10;
        config.seed.campaigns = 3;
        config.seed.orders = 200;

        handle_seed(
            config.clone(),
            SeedArgs {
                rng_seed: None,
                customers: None,
                products: None,
                campaigns: None,
                orders: None,
                as_of: None,
            },
        )
        .unwrap();

        handle_report(
            config,
            ReportArgs {
                kind: ReportKind::All,
                format: Some(OutputFormat::Json),
                output: Some(out.clone()),
                save: false,
                as_of: None,
                min_cohort_size: Some(1),
                limit: Some(5),
                strict: true,
            },
        )
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert!(json["customer_ltv"].as_array().unwrap().len() <= 5);
        assert!(!json["cohort_retention"].as_array().unwrap().is_empty());
    }
}
