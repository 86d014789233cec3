//! Tracing subscriber setup.
//!
//! The chat view owns the terminal, so it logs to a daily rolling file under
//! `<PETAL_HOME>/logs`. Every other command logs to stderr. The filter comes
//! from `PETAL_LOG` and defaults to `warn`.

use anyhow::{Context, Result};
use petal_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_ENV: &str = "PETAL_LOG";
const DEFAULT_FILTER: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Logs to stderr.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs to a daily file. Keep the guard alive until exit so buffered
/// records are flushed.
pub fn init_file() -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("petal")
        .filename_suffix("log")
        .build(&dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(layer)
        .try_init();

    Ok(guard)
}
