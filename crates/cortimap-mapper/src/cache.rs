// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Build-or-load orchestration for mappers.

A cache file is reused only when [`cache_status`] reports [`CacheStatus::Fresh`]; every
other outcome rebuilds the operators and overwrites the file.
*/

use crate::database::{SurfaceDatabase, SurfaceKind, SurfaceOptions};
use crate::error::{MapperError, MapperResult};
use crate::mapper::{Mapper, MapperOrigin};
use cortimap_projection::{build_hemispheres, cache_key, KernelArgs, KernelDefaults, ProjectionKind};
use cortimap_serialization::{load_cache, save_cache, ProjectionCache};
use cortimap_structures::{Hemisphere, Hemispheres, SparseOperator, VolumeShape};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Name of the transform whose caches never go stale.
pub const IDENTITY_TRANSFORM: &str = "identity";

/// Why a cache file cannot be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    RecacheRequested,
    CacheMissing,
    /// The transform file's timestamp could not be read
    TransformUnreadable,
    /// The cache is not strictly newer than the transform
    OutOfDate,
}

impl Display for StaleReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            StaleReason::RecacheRequested => "recache requested",
            StaleReason::CacheMissing => "cache file missing",
            StaleReason::TransformUnreadable => "transform timestamp unreadable",
            StaleReason::OutOfDate => "cache older than transform",
        };
        write!(f, "{}", reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Stale(StaleReason),
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Decides whether the cache at `cache_path` may be reused.
///
/// Checked in order: an explicit recache request, a missing cache file, the identity
/// transform (always fresh), then cache mtime strictly greater than transform mtime.
pub fn cache_status(xfmname: &str, transform_path: &Path, cache_path: &Path, recache: bool) -> CacheStatus {
    if recache {
        return CacheStatus::Stale(StaleReason::RecacheRequested);
    }
    let Some(cache_time) = modified(cache_path) else {
        return CacheStatus::Stale(StaleReason::CacheMissing);
    };
    if xfmname == IDENTITY_TRANSFORM {
        return CacheStatus::Fresh;
    }
    match modified(transform_path) {
        None => CacheStatus::Stale(StaleReason::TransformUnreadable),
        Some(transform_time) if cache_time > transform_time => CacheStatus::Fresh,
        Some(_) => CacheStatus::Stale(StaleReason::OutOfDate),
    }
}

/// Knobs for [`MapperService`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheSettings {
    /// Kernel parameters for keywords the caller leaves out
    pub defaults: KernelDefaults,
    /// Rebuild when a fresh cache file fails to load instead of returning the error
    pub rebuild_on_corrupt: bool,
    /// Write LZ4-compressed cache files
    pub compress: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            defaults: KernelDefaults::default(),
            rebuild_on_corrupt: true,
            compress: true,
        }
    }
}

/// Hands out mappers for subjects in a [`SurfaceDatabase`], caching their operators on disk.
#[derive(Debug)]
pub struct MapperService<D> {
    database: D,
    settings: CacheSettings,
}

impl<D: SurfaceDatabase> MapperService<D> {
    pub fn new(database: D, settings: CacheSettings) -> Self {
        Self { database, settings }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Staleness of the cache a [`get_mapper`](Self::get_mapper) call would use.
    pub fn cache_status(
        &self,
        subject: &str,
        xfmname: &str,
        kind: &str,
        recache: bool,
        args: &KernelArgs,
    ) -> MapperResult<CacheStatus> {
        let kind = ProjectionKind::from_name_with_defaults(kind, args, &self.settings.defaults)?;
        let files = self.database.files(subject)?;
        Ok(cache_status(
            xfmname,
            &files.transform_path(xfmname),
            &files.cache_path(xfmname, &cache_key(&kind)),
            recache,
        ))
    }

    /// Returns the mapper for `(subject, xfmname, kind)`, loading it from cache when fresh
    /// and building (then caching) it otherwise.
    ///
    /// `args` are the kernel keywords; parameters they leave out come from the settings
    /// defaults, and the resolved parameters name the cache file.
    pub fn get_mapper(
        &self,
        subject: &str,
        xfmname: &str,
        kind: &str,
        recache: bool,
        args: &KernelArgs,
    ) -> MapperResult<Mapper> {
        let kind = ProjectionKind::from_name_with_defaults(kind, args, &self.settings.defaults)?;
        let files = self.database.files(subject)?;
        let transform_path = files.transform_path(xfmname);
        let cache_path = files.cache_path(xfmname, &cache_key(&kind));

        match cache_status(xfmname, &transform_path, &cache_path, recache) {
            CacheStatus::Fresh => match read_cache(&cache_path) {
                Ok((operators, shape)) => {
                    debug!(subject, xfmname, kind = %kind, path = %cache_path.display(), "mapper cache hit");
                    return Mapper::new(kind, operators, shape, MapperOrigin::Cache);
                }
                Err(err) if self.settings.rebuild_on_corrupt => {
                    warn!(
                        subject,
                        xfmname,
                        kind = %kind,
                        path = %cache_path.display(),
                        error = %err,
                        "unreadable mapper cache, rebuilding"
                    );
                }
                Err(err) => return Err(err),
            },
            CacheStatus::Stale(reason) => {
                debug!(subject, xfmname, kind = %kind, %reason, "mapper cache stale");
            }
        }

        info!(subject, xfmname, kind = %kind, path = %cache_path.display(), "Caching mapper");
        let (operators, shape) = self.build_operators(subject, xfmname, &kind)?;
        save_cache(
            &ProjectionCache::from_operators(&operators, &shape),
            &cache_path,
            self.settings.compress,
        )?;
        Mapper::new(kind, operators, shape, MapperOrigin::Built)
    }

    /// Computes both hemisphere operators from the subject's transform and surfaces.
    pub fn build_operators(
        &self,
        subject: &str,
        xfmname: &str,
        kind: &ProjectionKind,
    ) -> MapperResult<(Hemispheres<SparseOperator>, VolumeShape)> {
        let transform = self.database.transform(subject, xfmname)?;
        kind.check_grid(&transform.shape())?;
        let options = SurfaceOptions {
            merge: false,
            nudge: false,
        };
        let fiducial = self
            .database
            .surface(subject, SurfaceKind::Fiducial, options)?
            .into_hemispheres()?;
        let flat = self
            .database
            .surface(subject, SurfaceKind::Flat, options)?
            .into_hemispheres()?;

        for side in Hemisphere::BOTH {
            let (n_fiducial, n_flat) = (fiducial.get(side).n_points(), flat.get(side).n_points());
            if n_fiducial != n_flat {
                return Err(MapperError::Database(format!(
                    "{} hemisphere of '{}' has {} fiducial points but {} flat points",
                    side, subject, n_fiducial, n_flat
                )));
            }
        }

        let shape = transform.shape();
        let points = fiducial.map(|mesh| transform.apply(mesh.points()));
        let polygons = flat.map(|mesh| mesh.into_parts().1);
        let operators = build_hemispheres(kind, &points, &polygons, &shape)?;
        Ok((operators, shape))
    }
}

fn read_cache(path: &Path) -> MapperResult<(Hemispheres<SparseOperator>, VolumeShape)> {
    Ok(load_cache(path)?.into_operators()?)
}
