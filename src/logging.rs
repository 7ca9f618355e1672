//! Log output for the quickchat binary.
//!
//! Console output always goes to stderr so stdout stays reserved for
//! confirmations. With file logging on, every event is also written as one
//! JSON object per line to a daily file under [`LoggingConfig::dir`].
//!
//! `RUST_LOG` wins over [`LoggingConfig::level`] when both are set.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// File name prefix of the rotated log; the date is appended per day.
pub const LOG_FILE_PREFIX: &str = "quickchat.log";

/// Fallback filter for file logging.
const FILE_DEFAULT_LEVEL: &str = "info";

/// Fallback filter for console-only logging.
const CONSOLE_DEFAULT_LEVEL: &str = "warn";

/// Keeps the background log writer alive.
///
/// Dropping it flushes buffered JSON lines to disk.
pub struct LoggingGuard {
    _writer: WorkerGuard,
}

/// Parse a filter directive such as `"debug"` or `"quickchat=trace,warn"`.
///
/// # Errors
///
/// Returns an error naming the directive when it does not parse.
pub fn level_filter(directive: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(directive).with_context(|| format!("invalid log level {directive:?}"))
}

/// `RUST_LOG` if set, else the configured level, else `fallback`.
fn filter_for(config: &LoggingConfig, fallback: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    level_filter(config.level.as_deref().unwrap_or(fallback))
}

/// Install the global subscriber described by `config`.
///
/// With `to_file` the logs directory is created and a guard is returned that
/// must outlive all logging. Without it output is stderr only, and an already
/// installed subscriber is left in place.
///
/// # Errors
///
/// Returns an error if the configured level does not parse. In file mode, also
/// if the logs directory cannot be created or a subscriber is already
/// installed.
pub fn init(config: &LoggingConfig, to_file: bool) -> anyhow::Result<Option<LoggingGuard>> {
    if !to_file {
        let filter = filter_for(config, CONSOLE_DEFAULT_LEVEL)?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        return Ok(None);
    }

    let filter = filter_for(config, FILE_DEFAULT_LEVEL)?;
    std::fs::create_dir_all(&config.dir)
        .with_context(|| format!("failed to create logs directory {}", config.dir.display()))?;

    let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(Some(LoggingGuard { _writer: guard }))
}
