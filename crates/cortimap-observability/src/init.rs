// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for cortimap
//!
//! Console output always; with the `file-logging` feature and a log directory, JSON files
//! per crate inside a timestamped run folder, pruned by a retention policy.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::LoggingOptions;

const RUN_PREFIX: &str = "run_";
const RUN_FORMAT: &str = "%Y%m%d_%H%M%S";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Logging initialization result; keep it alive for as long as logs should be flushed.
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Initialize logging
///
/// With file logging the folder structure is:
/// ```text
/// <log_dir>/
///   └── run_20250101_120000/
///       ├── cortimap-mapper.log
///       ├── cortimap-projection.log
///       └── cortimap.log (combined)
/// ```
pub fn init_logging(debug_flags: &CrateDebugFlags, options: &LoggingOptions) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&options.level);
    let env_filter =
        EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter)
        .boxed();
    layers.push(console_layer);

    let guard = match &options.log_dir {
        Some(base) => file_layers(base, debug_flags, options, &mut layers)?,
        None => LoggingGuard {
            #[cfg(feature = "file-logging")]
            _file_guards: Vec::new(),
            log_dir: None,
        },
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!(
        filter = %filter,
        log_dir = ?guard.log_dir(),
        "logging initialized"
    );
    Ok(guard)
}

#[cfg(feature = "file-logging")]
fn file_layers(
    base_log_dir: &Path,
    debug_flags: &CrateDebugFlags,
    options: &LoggingOptions,
    layers: &mut Vec<BoxedLayer>,
) -> Result<LoggingGuard> {
    use tracing_appender::rolling;

    let run_folder = base_log_dir.join(format!("{}{}", RUN_PREFIX, Utc::now().format(RUN_FORMAT)));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    cleanup_old_logs(base_log_dir, options.retention_days, options.retention_runs)?;

    let mut file_guards = Vec::new();
    for crate_name in crate::KNOWN_CRATES {
        let (writer, guard) =
            tracing_appender::non_blocking(rolling::never(&run_folder, format!("{}.log", crate_name)));
        file_guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::new(format!("{}=debug", crate::crate_target(crate_name))))
                .boxed(),
        );
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling::never(&run_folder, "cortimap.log"));
    file_guards.push(guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .json()
            .with_filter(EnvFilter::new(debug_flags.to_filter_string(&options.level)))
            .boxed(),
    );

    Ok(LoggingGuard {
        _file_guards: file_guards,
        log_dir: Some(run_folder),
    })
}

#[cfg(not(feature = "file-logging"))]
fn file_layers(
    base_log_dir: &Path,
    _debug_flags: &CrateDebugFlags,
    _options: &LoggingOptions,
    _layers: &mut Vec<BoxedLayer>,
) -> Result<LoggingGuard> {
    eprintln!(
        "Warning: log directory {} ignored, built without the file-logging feature",
        base_log_dir.display()
    );
    Ok(LoggingGuard { log_dir: None })
}

fn run_started(path: &Path) -> Option<DateTime<Utc>> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(RUN_PREFIX)?;
    let naive = NaiveDateTime::parse_from_str(stamp, RUN_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Remove run folders older than `retention_days`, then all but the newest `retention_runs`.
pub fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
    if !base_log_dir.exists() {
        return Ok(());
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);
    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(started) = run_started(&path) {
                runs.push((path, started));
            }
        }
    }
    // newest first
    runs.sort_by_key(|(_, started)| std::cmp::Reverse(*started));

    for (index, (path, started)) in runs.iter().enumerate() {
        if *started < cutoff || index >= retention_runs {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }
    Ok(())
}

/// Initialize console logging at `info` plus any debug flags
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    init_logging(debug_flags, &LoggingOptions::default())
}
