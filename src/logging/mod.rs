// Logging module - tracing subscriber setup
//
// Console logs go to stderr so report output on stdout stays clean and can
// be piped. File logging is optional: JSON lines through a rolling appender,
// written from a background thread. The returned guard must stay alive for
// the whole run or buffered lines are lost on exit.
//
// Precedence for the filter: RUST_LOG env var > config level > "info".

use crate::config::{LogFileConfig, LogRotation, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used when RUST_LOG is not set
fn default_directive(level: &str) -> String {
    // Dependencies only surface warnings; our own crate follows the config
    format!("warn,commerce_cohorts={level}")
}

/// Rolling appender for the configured rotation
fn file_appender(file: &LogFileConfig) -> RollingFileAppender {
    match file.rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(&file.dir, &file.prefix),
        LogRotation::Daily => tracing_appender::rolling::daily(&file.dir, &file.prefix),
        LogRotation::Never => tracing_appender::rolling::never(&file.dir, &file.prefix),
    }
}

/// Install the global subscriber. Call once, before any work is done.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.level)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = if config.file.enabled {
        match std::fs::create_dir_all(&config.file.dir) {
            Ok(()) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(&config.file));
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                // Fall back to stderr-only logging
                eprintln!(
                    "Warning: Could not create log directory {:?}: {}",
                    config.file.dir, e
                );
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let directive = default_directive(level);
            assert!(EnvFilter::try_new(&directive).is_ok(), "{directive}");
        }
    }
}
