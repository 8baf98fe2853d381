// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Gaussian kernel - every voxel within `CUTOFF_STDS` standard deviations, weighted by distance.
*/

use super::{footprint_end, footprint_start};
use cortimap_structures::{Point3, SparseRow, VolumeShape};

/// Footprint radius in units of the standard deviation.
pub const CUTOFF_STDS: f64 = 3.0;

/// Adds gaussian weights around `position`, scaled by `scale`.
///
/// Weights are normalized by the kernel sum over the full footprint, including voxels
/// outside the grid, so an unclipped row sums to `scale` and a clipped one to less.
pub fn accumulate(position: Point3, shape: &VolumeShape, std: f64, scale: f64, row: &mut SparseRow) {
    let radius = CUTOFF_STDS * std;
    let radius_sq = radius * radius;
    let denom = 2.0 * std * std;

    let mut total = 0.0;
    let mut local = SparseRow::new();

    for z in footprint_start(position[2], radius)..=footprint_end(position[2], radius) {
        let dz = z as f64 - position[2];
        for y in footprint_start(position[1], radius)..=footprint_end(position[1], radius) {
            let dy = y as f64 - position[1];
            for x in footprint_start(position[0], radius)..=footprint_end(position[0], radius) {
                let dx = x as f64 - position[0];
                let dist_sq = dx * dx + dy * dy + dz * dz;
                if dist_sq > radius_sq {
                    continue;
                }
                let weight = (-dist_sq / denom).exp();
                total += weight;
                if let Some(index) = shape.ravel([x, y, z]) {
                    local.push(index, weight);
                }
            }
        }
    }

    if total > 0.0 {
        row.extend_scaled(&local, scale / total);
    }
}
