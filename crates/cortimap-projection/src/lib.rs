// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
# Cortimap Projection Builders

This crate computes the sparse operators that project voxel data onto surface vertices:
- Point kernels (nearest, trilinear, gaussian, lanczos) evaluated at each vertex
- Constant-patch variants that average a kernel over the vertex's flat-mesh 1-ring
- A single row builder shared by every kind, invoked once per vertex

## Architecture

All kinds reduce to "map a 3D location (or a small set of locations) to a weighted
multiset of voxel indices". [`ProjectionKind`] is a closed enum carrying its kernel
parameters; [`build_row`] dispatches on it and [`build_operator`] freezes the rows into a
[`cortimap_structures::SparseOperator`].

Rows are built in parallel with rayon when the `parallel` feature is enabled; the result
does not depend on it.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builder;
pub mod kernels;
pub mod kind;
pub mod patch;
pub mod types;

pub use builder::{build_hemispheres, build_operator, build_row, VertexTopology};
pub use kernels::PointKernel;
pub use kind::{cache_key, ProjectionKind, MAX_PATCH_SAMPLES, PROJECTION_NAMES};
pub use types::{KernelArgs, KernelDefaults, ProjectionError, ProjectionResult};
