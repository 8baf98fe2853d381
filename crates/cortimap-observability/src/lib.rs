// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! # cortimap-observability
//!
//! Logging setup shared by the cortimap tools, with per-crate debug flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in timestamped run folders, one per crate plus a
//!   combined file

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known cortimap crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "cortimap",
    "cortimap-structures",
    "cortimap-projection",
    "cortimap-serialization",
    "cortimap-mapper",
    "cortimap-config",
];

/// Tracing target of a crate: its library name, with `-` replaced by `_`.
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
