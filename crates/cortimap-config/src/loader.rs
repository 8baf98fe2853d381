// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, CortimapConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "cortimap.toml";

/// Find the cortimap configuration file
///
/// Search order:
/// 1. `CORTIMAP_CONFIG_PATH` environment variable
/// 2. Current working directory: `./cortimap.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("CORTIMAP_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        } else {
            return Err(ConfigError::FileNotFound(format!(
                "Config file specified by CORTIMAP_CONFIG_PATH not found: {}",
                path.display()
            )));
        }
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd.clone();
        for _ in 0..5 {
            if let Some(parent) = current.parent() {
                search_paths.push(parent.join(CONFIG_FILE_NAME));
                current = parent.to_path_buf();
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet CORTIMAP_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Returns
///
/// Complete, validated `CortimapConfig` with all overrides applied
///
/// # Errors
///
/// Returns error if config file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<CortimapConfig> {
    let config_file = if let Some(path) = config_path {
        path.to_path_buf()
    } else {
        find_config_file()?
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: CortimapConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CORTIMAP_DATABASE_ROOT` -> `database.root`
/// - `CORTIMAP_DEFAULT_PROJECTION` -> `projection.default_kind`
/// - `CORTIMAP_REBUILD_ON_CORRUPT_CACHE` -> `cache.rebuild_on_corrupt`
/// - `CORTIMAP_CACHE_COMPRESSION` -> `cache.compression`
/// - `CORTIMAP_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut CortimapConfig) {
    if let Ok(value) = env::var("CORTIMAP_DATABASE_ROOT") {
        config.database.root = PathBuf::from(value);
    }
    if let Ok(value) = env::var("CORTIMAP_DEFAULT_PROJECTION") {
        config.projection.default_kind = value;
    }
    if let Ok(value) = env::var("CORTIMAP_REBUILD_ON_CORRUPT_CACHE") {
        config.cache.rebuild_on_corrupt = parse_flag(&value);
    }
    if let Ok(value) = env::var("CORTIMAP_CACHE_COMPRESSION") {
        config.cache.compression = parse_flag(&value);
    }
    if let Ok(value) = env::var("CORTIMAP_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"database_root": "/data/subjects", "gaussian_std": "1.5"}`)
pub fn apply_cli_overrides(config: &mut CortimapConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("database_root") {
        config.database.root = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("default_projection") {
        config.projection.default_kind = value.clone();
    }
    if let Some(value) = cli_args.get("gaussian_std") {
        if let Ok(std) = value.parse::<f64>() {
            config.projection.gaussian_std = std;
        }
    }
    if let Some(value) = cli_args.get("lanczos_window") {
        if let Ok(window) = value.parse::<usize>() {
            config.projection.lanczos_window = window;
        }
    }
    if let Some(value) = cli_args.get("patch_samples") {
        if let Ok(samples) = value.parse::<usize>() {
            config.projection.patch_samples = samples;
        }
    }
    if let Some(value) = cli_args.get("rebuild_on_corrupt") {
        config.cache.rebuild_on_corrupt = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: &[&str] = &[
        "CORTIMAP_DATABASE_ROOT",
        "CORTIMAP_DEFAULT_PROJECTION",
        "CORTIMAP_REBUILD_ON_CORRUPT_CACHE",
        "CORTIMAP_CACHE_COMPRESSION",
        "CORTIMAP_LOG_LEVEL",
    ];

    fn clear_overrides() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("CORTIMAP_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("CORTIMAP_CONFIG_PATH");

        assert!(result.is_ok());
        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_find_config_file_env_var_missing() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("CORTIMAP_CONFIG_PATH", "/definitely/not/here/cortimap.toml");
        let result = find_config_file();
        env::remove_var("CORTIMAP_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_overrides();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[database]").unwrap();
        writeln!(file, "root = \"/data/subjects\"").unwrap();
        writeln!(file, "[projection]").unwrap();
        writeln!(file, "default_kind = \"trilinear\"").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.database.root, PathBuf::from("/data/subjects"));
        assert_eq!(config.projection.default_kind, "trilinear");
        // untouched sections keep their defaults
        assert_eq!(config.projection.lanczos_window, 3);
        assert!(config.cache.rebuild_on_corrupt);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_overrides();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[projection]\ngaussian_std = 0.0\n").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[projection\n").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = CortimapConfig::default();

        env::set_var("CORTIMAP_DATABASE_ROOT", "/mnt/db");
        env::set_var("CORTIMAP_REBUILD_ON_CORRUPT_CACHE", "false");
        env::set_var("CORTIMAP_CACHE_COMPRESSION", "0");

        apply_environment_overrides(&mut config);
        clear_overrides();

        assert_eq!(config.database.root, PathBuf::from("/mnt/db"));
        assert!(!config.cache.rebuild_on_corrupt);
        assert!(!config.cache.compression);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = CortimapConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("gaussian_std".to_string(), "1.25".to_string());
        cli_args.insert("lanczos_window".to_string(), "not-a-number".to_string());
        cli_args.insert("log_dir".to_string(), "/tmp/logs".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.projection.gaussian_std, 1.25);
        // unparseable values leave the previous setting in place
        assert_eq!(config.projection.lanczos_window, 3);
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("/tmp/logs")));
    }
}
