// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! The core crate for cortimap. Defines the most common data structures used throughout
//! the mapping engine: voxel grid shapes, per-hemisphere pairs, triangulated surface
//! meshes and the row-compressed sparse operator that links them.

mod error;
pub mod hemisphere;
pub mod mesh;
pub mod shape;
pub mod sparse;

pub use error::CortimapDataError;
pub use hemisphere::{Hemisphere, Hemispheres};
pub use mesh::SurfaceMesh;
pub use shape::VolumeShape;
pub use sparse::{SparseOperator, SparseRow};

/// A 3D point (x, y, z). Used for anatomical and fractional voxel coordinates alike.
pub type Point3 = [f64; 3];

/// A triangle as three indices into a point list.
pub type Triangle = [usize; 3];
