// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Trilinear kernel - weight spread over the 8 surrounding integer voxel corners.
*/

use cortimap_structures::{Point3, SparseRow, VolumeShape};

/// Adds the trilinear corner weights of `position`, scaled by `scale`.
///
/// Each corner weight is the product of the per-axis linear fractions, so the eight weights
/// sum to `scale`; corners outside the grid are dropped.
pub fn accumulate(position: Point3, shape: &VolumeShape, scale: f64, row: &mut SparseRow) {
    let base = [
        position[0].floor(),
        position[1].floor(),
        position[2].floor(),
    ];
    let frac = [
        position[0] - base[0],
        position[1] - base[1],
        position[2] - base[2],
    ];

    for corner in 0..8u8 {
        let mut voxel = [0i64; 3];
        let mut weight = scale;
        for axis in 0..3 {
            let upper = (corner >> axis) & 1 == 1;
            voxel[axis] = base[axis] as i64 + i64::from(upper);
            weight *= if upper { frac[axis] } else { 1.0 - frac[axis] };
        }
        if weight == 0.0 {
            continue;
        }
        if let Some(index) = shape.ravel(voxel) {
            row.push(index, weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_grid_point_is_single_voxel() {
        let shape = VolumeShape::new(4, 4, 4).unwrap();
        let mut row = SparseRow::new();
        accumulate([1.0, 2.0, 3.0], &shape, 1.0, &mut row);
        assert_eq!(row.finish(), vec![(shape.ravel([1, 2, 3]).unwrap(), 1.0)]);
    }

    #[test]
    fn test_interior_weights_sum_to_one() {
        let shape = VolumeShape::new(4, 4, 4).unwrap();
        let mut row = SparseRow::new();
        accumulate([1.25, 0.5, 2.75], &shape, 1.0, &mut row);
        let entries = row.finish();
        assert_eq!(entries.len(), 8);
        let total: f64 = entries.iter().map(|&(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_splits_evenly() {
        let shape = VolumeShape::new(1, 1, 2).unwrap();
        let mut row = SparseRow::new();
        accumulate([0.5, 0.0, 0.0], &shape, 1.0, &mut row);
        assert_eq!(row.finish(), vec![(0, 0.5), (1, 0.5)]);
    }

    #[test]
    fn test_clipped_at_border() {
        let shape = VolumeShape::new(1, 1, 2).unwrap();
        let mut row = SparseRow::new();
        accumulate([1.5, 0.0, 0.0], &shape, 1.0, &mut row);
        assert_eq!(row.finish(), vec![(1, 0.5)]);
    }
}
