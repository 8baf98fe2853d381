// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
# Cortimap Mapper

Applies projection operators between a functional volume and a two-hemisphere cortical
surface, and manages the on-disk cache those operators are stored in.

## Architecture
- **Mapper**: forward (`apply`, `apply_raw`) and backward (`backwards`) application, masks
- **Database**: the subject files, transforms and surfaces a build consumes
- **Cache**: staleness checks and the build-or-load entry point

## Usage
```ignore
use cortimap_mapper::{CacheSettings, FilesystemDatabase, MapperService};
use cortimap_projection::KernelArgs;

let service = MapperService::new(FilesystemDatabase::new("/data/subjects"), CacheSettings::default());
let mapper = service.get_mapper("S1", "fullhead", "trilinear", false, &KernelArgs::new())?;
let per_vertex = mapper.apply(volume.view().into_dyn())?;
```
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cache;
pub mod database;
pub mod error;
pub mod mapper;
pub mod transform;

pub use cache::{cache_status, CacheSettings, CacheStatus, MapperService, StaleReason, IDENTITY_TRANSFORM};
pub use database::{
    FilesystemDatabase, MemoryDatabase, SubjectFiles, Surface, SurfaceDatabase, SurfaceKind,
    SurfaceOptions,
};
pub use error::{MapperError, MapperResult};
pub use mapper::{classify_layout, InputLayout, LayoutContext, Mapper, MapperOrigin, VertexInput};
pub use transform::{AffineTransform, CoordinateTransform};
