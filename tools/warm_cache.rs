// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Mapper Cache Warming Tool

Builds (or validates) the projection cache for one subject, transform and projection kind,
so later runs load the mapper instead of computing it.

Usage:
  cargo run --bin warm_cache -- <subject> <xfmname> [kind] [key=value ...] [--recache] [--debug-<crate>]

Example:
  cargo run --bin warm_cache -- S1 fullhead gaussian std=1.5
*/

use anyhow::{bail, Context, Result};
use cortimap::config::{load_config, ConfigError, CortimapConfig};
use cortimap::mapper::{CacheStatus, MapperOrigin, SurfaceDatabase};
use cortimap::observability::{debug_flags_help, init_logging, parse_debug_flags, LoggingOptions};
use cortimap::projection::KernelArgs;
use cortimap::structures::Hemisphere;
use std::env;
use tracing::info;

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <subject> <xfmname> [kind] [key=value ...] [--recache]\n\n{}",
        program,
        debug_flags_help()
    )
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("warm_cache");
    let positional: Vec<&String> = args.iter().skip(1).filter(|a| !a.starts_with("--")).collect();
    let recache = args.iter().any(|a| a == "--recache");

    if args.iter().any(|a| a == "--help") || positional.len() < 2 {
        eprintln!("{}", usage(program));
        std::process::exit(1);
    }

    let config = match load_config(None, None) {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) => CortimapConfig::default(),
        Err(e) => return Err(e).context("Failed to load cortimap configuration"),
    };
    let _logging = init_logging(
        &parse_debug_flags(),
        &LoggingOptions {
            level: config.logging.level.clone(),
            log_dir: config.logging.log_dir.clone(),
            ..LoggingOptions::default()
        },
    )?;

    let subject = positional[0].as_str();
    let xfmname = positional[1].as_str();
    let (kind, keywords) = match positional.get(2) {
        Some(kind) if !kind.contains('=') => (kind.as_str(), &positional[3..]),
        _ => (config.projection.default_kind.as_str(), &positional[2..]),
    };

    let mut kernel_args = KernelArgs::new();
    for keyword in keywords {
        let Some((key, value)) = keyword.split_once('=') else {
            bail!("Expected key=value, got '{}'", keyword);
        };
        let value: f64 = value
            .parse()
            .with_context(|| format!("Kernel parameter '{}' is not a number", key))?;
        kernel_args.insert(key, value);
    }

    let service = cortimap::service_from_config(&config);
    let status = service.cache_status(subject, xfmname, kind, recache, &kernel_args)?;
    match status {
        CacheStatus::Fresh => info!(subject, xfmname, kind, "cache is fresh, validating"),
        CacheStatus::Stale(reason) => info!(subject, xfmname, kind, %reason, "cache needs a rebuild"),
    }

    let mapper = service.get_mapper(subject, xfmname, kind, recache, &kernel_args)?;
    let cache_file = service
        .database()
        .files(subject)?
        .cache_path(xfmname, &cortimap::projection::cache_key(mapper.kind()));

    println!("{}", mapper);
    println!(
        "  {} from {}",
        match mapper.origin() {
            MapperOrigin::Built => "built",
            MapperOrigin::Cache => "loaded",
        },
        cache_file.display()
    );
    println!("  grid {}", mapper.shape());
    for side in Hemisphere::BOTH {
        let operator = mapper.operators().get(side);
        println!(
            "  {:>5}: {} vertices, {} weights",
            side.to_string(),
            operator.n_rows(),
            operator.nnz()
        );
    }
    println!(
        "  mask: {} voxels",
        mapper.mask().iter().filter(|&&m| m).count()
    );
    Ok(())
}
