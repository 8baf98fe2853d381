// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Point kernels - map one fractional voxel location to weighted voxel indices.

Every projection kind reduces to one of these kernels evaluated at a vertex position, or
at several positions across a patch whose rows are then averaged.
*/

pub mod gaussian;
pub mod lanczos;
pub mod nearest;
pub mod trilinear;

use cortimap_structures::{Point3, SparseRow, VolumeShape};

/// Kernel evaluated at a single location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointKernel {
    Nearest,
    Trilinear,
    Gaussian { std: f64 },
    Lanczos { window: usize },
}

impl PointKernel {
    /// Adds `scale` times this kernel's weights at `position` to `row`.
    ///
    /// `position` is a fractional voxel coordinate in (x, y, z) order. Voxels outside
    /// `shape` are skipped, so rows near the border may carry less than `scale` in total.
    pub fn accumulate(&self, position: Point3, shape: &VolumeShape, scale: f64, row: &mut SparseRow) {
        match *self {
            PointKernel::Nearest => nearest::accumulate(position, shape, scale, row),
            PointKernel::Trilinear => trilinear::accumulate(position, shape, scale, row),
            PointKernel::Gaussian { std } => gaussian::accumulate(position, shape, std, scale, row),
            PointKernel::Lanczos { window } => {
                lanczos::accumulate(position, shape, window, scale, row)
            }
        }
    }

    /// Weights for a single location as a fresh row.
    pub fn row_at(&self, position: Point3, shape: &VolumeShape) -> SparseRow {
        let mut row = SparseRow::new();
        self.accumulate(position, shape, 1.0, &mut row);
        row
    }
}

/// Lowest voxel index touched by a symmetric footprint of `radius` around `center`.
pub(crate) fn footprint_start(center: f64, radius: f64) -> i64 {
    (center - radius).ceil() as i64
}

/// Highest voxel index touched by a symmetric footprint of `radius` around `center`.
pub(crate) fn footprint_end(center: f64, radius: f64) -> i64 {
    (center + radius).floor() as i64
}
