// Commerce Cohorts - cohort analytics over a commerce database
//
// Reads completed order lines from a SQLite snapshot and produces cohort
// retention, cumulative cohort revenue, customer lifetime value segments
// and a monthly revenue trend.
//
// Architecture:
// - Store (rusqlite + r2d2): read-only pool for reports, writable connection for schema/seed
// - Pipeline: pure in-memory stages from order lines to report rows
// - Report: typed tables rendered as text, CSV or JSON to stdout or a file
// - Config: env > ~/.config/commerce-cohorts/config.toml > defaults

mod cli;
mod config;
mod logging;
mod model;
mod pipeline;
mod report;
mod startup;
mod store;
mod util;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    let args = Cli::parse();

    // Config management never needs logging or a database
    let command = match args.command {
        Commands::Config(flags) => return cli::handle_config(&flags),
        Commands::Data(command) => command,
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env()?;

    // The guard must be kept alive for the duration of the run so file logs flush
    let _file_guard = logging::init(&config.logging);

    startup::log_startup(&config, cli::command_name(&command));

    let result = cli::run(command, config, args.db);
    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}
