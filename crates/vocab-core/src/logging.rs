use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::time::{LocalTime, UtcTime};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::config_directory;

const LOG_FILE_NAME: &str = "vocab.log";
const FILTER_ENV: &str = "VOCAB_LOG";

/// Controls where structured logs are published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingDestination {
    /// JSON lines in the log file plus human-readable lines on stderr.
    FileAndStderr,
    /// Only the persistent log file.
    FileOnly,
    /// Only stderr.
    StderrOnly,
}

#[derive(Debug)]
struct LoggingGuards {
    _guard: Option<WorkerGuard>,
    log_path: Option<PathBuf>,
}

static LOGGING_STATE: OnceLock<LoggingGuards> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to prepare log directory: {0}")]
    Io(#[from] io::Error),
    #[error("invalid logging filter: {0}")]
    Filter(#[from] ParseError),
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber, logging under `<config>/vocab/logs/`.
///
/// The first call wins; later calls return the path chosen by the first.
pub fn init_logging(
    destination: LoggingDestination,
) -> Result<Option<&'static PathBuf>, LoggingError> {
    init_logging_in(destination, &config_directory().join("logs"))
}

/// Same as [`init_logging`] with an explicit log directory.
pub fn init_logging_in(
    destination: LoggingDestination,
    log_dir: &Path,
) -> Result<Option<&'static PathBuf>, LoggingError> {
    if LOGGING_STATE.get().is_none() {
        let guards = install_logging(destination, log_dir)?;
        if let Err(guards) = LOGGING_STATE.set(guards) {
            drop(guards);
        }
    }
    Ok(current_log_path())
}

pub fn current_log_path() -> Option<&'static PathBuf> {
    LOGGING_STATE
        .get()
        .and_then(|guards| guards.log_path.as_ref())
}

fn install_logging(
    destination: LoggingDestination,
    log_dir: &Path,
) -> Result<LoggingGuards, LoggingError> {
    let filter = build_filter(env::var(FILTER_ENV).ok().as_deref())?;
    let registry = tracing_subscriber::registry().with(filter);

    let (file_layer, guard, log_path) = if destination == LoggingDestination::StderrOnly {
        (None, None, None)
    } else {
        fs::create_dir_all(log_dir)?;
        let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .event_format(
                tracing_subscriber::fmt::format()
                    .json()
                    .with_timer(UtcTime::rfc_3339())
                    .with_level(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with_writer(writer)
            .with_ansi(false)
            .boxed();
        (
            Some(layer),
            Some(worker_guard),
            Some(log_dir.join(LOG_FILE_NAME)),
        )
    };

    let stderr_layer = (destination != LoggingDestination::FileOnly).then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(
                tracing_subscriber::fmt::format()
                    .with_timer(LocalTime::rfc_3339())
                    .with_level(true)
                    .with_target(true)
                    .with_ansi(false),
            )
            .with_writer(io::stderr)
            .with_ansi(false)
            .boxed()
    });

    registry.with(file_layer).with(stderr_layer).try_init()?;

    if let Some(path) = log_path.as_ref() {
        info!(path = %path.display(), "Structured logging enabled");
    }

    Ok(LoggingGuards {
        _guard: guard,
        log_path,
    })
}

/// `VOCAB_LOG` wins over `RUST_LOG`; with neither set the level is `info`.
fn build_filter(override_spec: Option<&str>) -> Result<EnvFilter, ParseError> {
    if let Some(spec) = override_spec.filter(|spec| !spec.trim().is_empty()) {
        return EnvFilter::try_new(spec);
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new("info"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_is_honoured() {
        let filter = build_filter(Some("vocab_core=debug")).unwrap();
        assert_eq!(filter.to_string(), "vocab_core=debug");
    }

    #[test]
    fn malformed_filter_is_an_error() {
        assert!(build_filter(Some("vocab_core=loud")).is_err());
    }

    #[test]
    fn blank_filter_falls_through() {
        assert!(build_filter(Some("   ")).is_ok());
    }
}
