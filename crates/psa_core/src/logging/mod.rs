//! Logging infrastructure for the PSA tool.
//!
//! This module provides:
//! - Application-wide `tracing` setup (stderr, optionally a daily log file)
//! - Per-run loggers with file + event queue output
//! - Compact mode with progress filtering
//! - Tail buffer of external tool output for error diagnosis
//!
//! # Example
//!
//! ```no_run
//! use psa_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("Fall_Week_3", "/path/to/logs", LogConfig::default(), None).unwrap();
//! logger.phase("Stitching");
//! logger.command("ffmpeg -y -f concat ...");
//! logger.success("MS stitch complete");
//! ```

mod run_logger;
mod types;

pub use run_logger::RunLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// File name prefix of the daily application log.
pub const APP_LOG_PREFIX: &str = "psa-tool.log";

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}

/// Initialize the global tracing subscriber (stderr only).
///
/// `RUST_LOG` overrides `default_level`. Should be called once at startup.
pub fn init_tracing(default_level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(env_filter(default_level))
        .try_init();
}

/// Initialize tracing to stderr plus a daily rolling file in `logs_dir`.
///
/// Keep the returned guard alive for the life of the process so buffered
/// lines are flushed. If `logs_dir` cannot be created, falls back to
/// stderr only and returns `None`.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(logs_dir) {
        init_tracing(default_level);
        tracing::warn!("Cannot create logs folder {}: {}", logs_dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(logs_dir, APP_LOG_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .try_init();

    Some(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }

    #[test]
    fn test_tracing_init_is_repeatable() {
        init_test_tracing();
        init_test_tracing();
    }
}
