// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `cortimap.toml`.

use cortimap_projection::KernelDefaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CortimapConfig {
    pub database: DatabaseConfig,
    pub projection: ProjectionConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Subject database location
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding one folder per subject
    pub root: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./subjects"),
        }
    }
}

/// Projection selection and kernel defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Kind used when a caller does not name one
    pub default_kind: String,
    pub gaussian_std: f64,
    pub lanczos_window: usize,
    pub patch_samples: usize,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        let defaults = KernelDefaults::default();
        Self {
            default_kind: "nearest".to_string(),
            gaussian_std: defaults.gaussian_std,
            lanczos_window: defaults.lanczos_window,
            patch_samples: defaults.patch_samples,
        }
    }
}

impl ProjectionConfig {
    /// Kernel parameters used for keywords the caller leaves out.
    pub fn kernel_defaults(&self) -> KernelDefaults {
        KernelDefaults {
            gaussian_std: self.gaussian_std,
            lanczos_window: self.lanczos_window,
            patch_samples: self.patch_samples,
        }
    }
}

/// Projection cache behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Rebuild instead of failing when a fresh cache file cannot be decoded
    pub rebuild_on_corrupt: bool,
    /// LZ4-compress cache payloads
    pub compression: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            rebuild_on_corrupt: true,
            compression: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    /// Base directory for log files; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}
