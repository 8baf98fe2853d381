//! Observability configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Log level for everything not raised by a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Base directory for run folders; console only when unset
    pub log_dir: Option<PathBuf>,

    /// Keep run folders for N days
    pub retention_days: u64,

    /// Keep the N most recent run folders
    pub retention_runs: usize,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        LoggingOptions {
            level: "info".to_string(),
            log_dir: None,
            retention_days: 30,
            retention_runs: 10,
        }
    }
}
