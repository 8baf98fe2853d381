// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! # Cortimap - volume-to-surface mapping
//!
//! Projects functional data sampled on a regular voxel grid onto a two-hemisphere cortical
//! surface mesh, and back. The projection operator is built once per
//! (subject, transform, projection kind), cached on disk as a pair of sparse matrices and
//! then applied cheaply to any number of volumes or time series.
//!
//! ## Feature Flags
//! - **`parallel`** (default): build projection rows on the rayon thread pool
//! - **`compression`** (default): LZ4-compress cache files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cortimap::prelude::*;
//!
//! let config = cortimap::config::load_config(None, None)?;
//! let service = cortimap::service_from_config(&config);
//! let mapper = service.get_mapper("S1", "fullhead", "trilinear", false, &KernelArgs::new())?;
//!
//! let series = ndarray::Array4::<f64>::zeros((5, 30, 100, 100));
//! let per_vertex = mapper.apply(series.view().into_dyn())?;
//! println!("{} -> {:?}", mapper, per_vertex.left.shape());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: cortimap-structures                        │
//! │  (VolumeShape, SurfaceMesh, SparseOperator)             │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: cortimap-projection                        │
//! │  (nearest, trilinear, gaussian, lanczos, patch kinds)   │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Persistence: cortimap-serialization                    │
//! │  (projection cache files)                               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Orchestration: cortimap-mapper                         │
//! │  (Mapper, subject database, build-or-load)              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use cortimap_config as config;
pub use cortimap_mapper as mapper;
pub use cortimap_observability as observability;
pub use cortimap_projection as projection;
pub use cortimap_serialization as serialization;
pub use cortimap_structures as structures;

use cortimap_config::CortimapConfig;
use cortimap_mapper::{CacheSettings, FilesystemDatabase, MapperService};

/// Cache behavior described by a loaded configuration.
pub fn cache_settings(config: &CortimapConfig) -> CacheSettings {
    CacheSettings {
        defaults: config.projection.kernel_defaults(),
        rebuild_on_corrupt: config.cache.rebuild_on_corrupt,
        compress: config.cache.compression,
    }
}

/// Mapper service over the configured subject directory.
pub fn service_from_config(config: &CortimapConfig) -> MapperService<FilesystemDatabase> {
    MapperService::new(
        FilesystemDatabase::new(config.database.root.clone()),
        cache_settings(config),
    )
}

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::mapper::{
        AffineTransform, CacheStatus, CoordinateTransform, FilesystemDatabase, Mapper,
        MapperError, MapperOrigin, MapperService, SurfaceDatabase, SurfaceKind, VertexInput,
    };
    pub use crate::projection::{KernelArgs, ProjectionKind};
    pub use crate::structures::{Hemisphere, Hemispheres, SurfaceMesh, VolumeShape};
}
