// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for projection building.
*/

use cortimap_structures::CortimapDataError;
use std::collections::BTreeMap;

/// Result type for projection operations
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors that can occur while selecting or building a projection
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("Unknown projection kind: {0}")]
    UnknownKind(String),

    #[error("Projection '{kind}' does not accept keyword '{name}'")]
    UnexpectedParameter { kind: String, name: String },

    #[error("Invalid value {value} for '{name}' of projection '{kind}': {reason}")]
    InvalidParameter {
        kind: String,
        name: String,
        value: f64,
        reason: String,
    },

    #[error("Topology mismatch: {0}")]
    TopologyMismatch(String),

    #[error(transparent)]
    Structure(#[from] CortimapDataError),
}

/// Numeric keyword arguments for a projection kind (e.g. `std`, `window`).
///
/// Keys are kept sorted so the derived cache key is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelArgs(BTreeMap<String, f64>);

impl KernelArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// `key+value` pairs joined by `_`, e.g. `std1.5_window4`.
    pub fn suffix(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}{}", k, v))
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for KernelArgs {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Kernel parameters used when the caller does not pass a keyword.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelDefaults {
    /// Gaussian standard deviation, in voxels
    pub gaussian_std: f64,
    /// Lanczos half-width, in voxels
    pub lanczos_window: usize,
    /// Barycentric grid resolution per patch face
    pub patch_samples: usize,
}

impl Default for KernelDefaults {
    fn default() -> Self {
        Self {
            gaussian_std: 2.0,
            lanczos_window: 3,
            patch_samples: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_is_sorted() {
        let args = KernelArgs::new().with("window", 4.0).with("std", 1.5);
        assert_eq!(args.suffix(), "std1.5_window4");
    }

    #[test]
    fn test_empty_suffix() {
        assert_eq!(KernelArgs::new().suffix(), "");
    }
}
