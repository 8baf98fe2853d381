// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Nearest-neighbor kernel - the single voxel containing the rounded position.
*/

use cortimap_structures::{Point3, SparseRow, VolumeShape};

/// Rounds each coordinate to the closest integer voxel.
pub fn nearest_voxel(position: Point3) -> [i64; 3] {
    [
        position[0].round() as i64,
        position[1].round() as i64,
        position[2].round() as i64,
    ]
}

/// Adds weight `scale` to the nearest voxel; positions rounding outside the grid add nothing.
pub fn accumulate(position: Point3, shape: &VolumeShape, scale: f64, row: &mut SparseRow) {
    if let Some(index) = shape.ravel(nearest_voxel(position)) {
        row.push(index, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_to_closest_voxel() {
        let shape = VolumeShape::new(4, 4, 4).unwrap();
        let mut row = SparseRow::new();
        accumulate([1.4, 2.6, 0.2], &shape, 1.0, &mut row);
        assert_eq!(row.finish(), vec![(shape.ravel([1, 3, 0]).unwrap(), 1.0)]);
    }

    #[test]
    fn test_outside_grid_is_empty() {
        let shape = VolumeShape::new(4, 4, 4).unwrap();
        let mut row = SparseRow::new();
        accumulate([3.6, 0.0, 0.0], &shape, 1.0, &mut row);
        accumulate([-0.6, 0.0, 0.0], &shape, 1.0, &mut row);
        assert!(row.is_empty());
    }
}
