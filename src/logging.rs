//! Tracing initialisation.
//!
//! Verbosity comes from [`LogLevel`] only; `RUST_LOG` is not consulted.
//! The interactive UI owns the terminal, so it logs to the file alone.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogLevel;

/// Where log lines go besides the optional file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// File only.
    FileOnly,
    /// stderr, plus the file when one is given.
    Stderr,
}

pub fn to_level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

fn open_non_blocking(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
    Ok(tracing_appender::non_blocking(file))
}

/// Install the global subscriber. The returned guard flushes the file
/// writer on drop and must be held until shutdown.
pub fn init_tracing(
    level: LogLevel,
    log_file: Option<&Path>,
    target: LogTarget,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::new(to_level_filter(level).to_string());

    let mut guard = None;
    let file_layer = match log_file.map(open_non_blocking) {
        Some(Ok((writer, g))) => {
            guard = Some(g);
            Some(
                tsfmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .compact()
                    .with_writer(writer),
            )
        }
        Some(Err(err)) => {
            eprintln!("Warning: {err:#}; continuing without file logging.");
            None
        }
        None => None,
    };

    let stderr_layer = (target == LogTarget::Stderr).then(|| {
        tsfmt::layer()
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
    });

    registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_increasing_verbosity() {
        assert_eq!(to_level_filter(LogLevel::Quiet), LevelFilter::ERROR);
        assert_eq!(to_level_filter(LogLevel::Normal), LevelFilter::WARN);
        assert_eq!(to_level_filter(LogLevel::Info), LevelFilter::INFO);
        assert!(to_level_filter(LogLevel::Debug) > to_level_filter(LogLevel::Info));
    }
}
