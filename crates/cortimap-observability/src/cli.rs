//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-cortimap-mapper`, `--debug-cortimap-projection`, etc.
//! to raise the log level of individual crates.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use cortimap_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(std::env::args());
/// if flags.is_enabled("cortimap-mapper") {
///     // Enable debug logging for the mapper crate
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Adds crates named in a `CORTIMAP_DEBUG`-style value: `all` or a comma-separated list.
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            self.enable(crate_name);
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Create a tracing filter from debug flags
    ///
    /// Format: `cortimap_mapper=debug,...,{default_level}`; just `{default_level}` if no
    /// crate is enabled.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_target(crate_name)))
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and the `CORTIMAP_DEBUG` environment variable.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var("CORTIMAP_DEBUG") {
        flags.merge_env_value(&value);
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  CORTIMAP_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  CORTIMAP_DEBUG=all                               Enable debug for all crates

Examples:
  --debug-cortimap-mapper
  --debug-cortimap-mapper --debug-cortimap-projection
  CORTIMAP_DEBUG=cortimap-mapper,cortimap-serialization
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-cortimap-mapper".to_string()]);
        assert!(flags.is_enabled("cortimap-mapper"));
        assert!(!flags.is_enabled("cortimap-projection"));
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_env_value() {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value(" cortimap-mapper, ,cortimap-config ");
        assert!(flags.is_enabled("cortimap-mapper"));
        assert!(flags.is_enabled("cortimap-config"));
        assert_eq!(flags.enabled_crates.len(), 2);
    }

    #[test]
    fn test_filter_string_uses_targets() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-cortimap-mapper".to_string()]);
        assert_eq!(flags.to_filter_string("warn"), "cortimap_mapper=debug,warn");
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }
}
