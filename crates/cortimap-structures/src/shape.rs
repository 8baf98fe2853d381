//! Voxel grid geometry.

use crate::CortimapDataError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Shape of a functional volume, stored in array order (z, y, x).
///
/// Voxel coordinates handed around the engine are in (x, y, z) order; the flat voxel
/// index of `(x, y, z)` is `z * ny * nx + y * nx + x`, i.e. a row-major ravel over
/// `(z, y, x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolumeShape {
    pub z: usize,
    pub y: usize,
    pub x: usize,
}

impl VolumeShape {
    /// Creates a shape from (z, y, x); every dimension must be positive.
    pub fn new(z: usize, y: usize, x: usize) -> Result<Self, CortimapDataError> {
        if z == 0 || y == 0 || x == 0 {
            return Err(CortimapDataError::BadParameters(format!(
                "Volume dimensions must be positive, got ({}, {}, {})",
                z, y, x
            )));
        }
        Ok(Self { z, y, x })
    }

    pub fn from_array(dims: [usize; 3]) -> Result<Self, CortimapDataError> {
        Self::new(dims[0], dims[1], dims[2])
    }

    pub fn as_array(&self) -> [usize; 3] {
        [self.z, self.y, self.x]
    }

    /// Total number of voxels in the grid.
    pub fn n_voxels(&self) -> usize {
        self.z * self.y * self.x
    }

    /// Extent along each coordinate axis in (x, y, z) order.
    pub fn extent_xyz(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// Returns true when the integer voxel coordinate lies inside the grid.
    pub fn contains(&self, voxel: [i64; 3]) -> bool {
        let extent = self.extent_xyz();
        voxel
            .iter()
            .zip(extent.iter())
            .all(|(&v, &n)| v >= 0 && (v as u64) < n as u64)
    }

    /// Flat index of an integer voxel coordinate (x, y, z), or `None` outside the grid.
    pub fn ravel(&self, voxel: [i64; 3]) -> Option<usize> {
        if !self.contains(voxel) {
            return None;
        }
        let [x, y, z] = voxel;
        Some(z as usize * self.y * self.x + y as usize * self.x + x as usize)
    }

    /// Inverse of [`VolumeShape::ravel`].
    pub fn unravel(&self, index: usize) -> Option<[usize; 3]> {
        if index >= self.n_voxels() {
            return None;
        }
        let x = index % self.x;
        let y = (index / self.x) % self.y;
        let z = index / (self.x * self.y);
        Some([x, y, z])
    }
}

impl Display for VolumeShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.z, self.y, self.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(VolumeShape::new(0, 4, 4).is_err());
        assert!(VolumeShape::new(2, 3, 4).is_ok());
    }

    #[test]
    fn test_ravel_is_row_major_over_zyx() {
        let shape = VolumeShape::new(2, 3, 4).unwrap();
        assert_eq!(shape.ravel([0, 0, 0]), Some(0));
        assert_eq!(shape.ravel([1, 0, 0]), Some(1));
        assert_eq!(shape.ravel([0, 1, 0]), Some(4));
        assert_eq!(shape.ravel([0, 0, 1]), Some(12));
        assert_eq!(shape.ravel([3, 2, 1]), Some(23));
    }

    #[test]
    fn test_ravel_out_of_bounds() {
        let shape = VolumeShape::new(2, 3, 4).unwrap();
        assert_eq!(shape.ravel([4, 0, 0]), None);
        assert_eq!(shape.ravel([-1, 0, 0]), None);
        assert_eq!(shape.ravel([0, 0, 2]), None);
    }

    #[test]
    fn test_unravel_inverts_ravel() {
        let shape = VolumeShape::new(3, 5, 7).unwrap();
        for index in [0, 1, 6, 7, 34, 35, 104] {
            let [x, y, z] = shape.unravel(index).unwrap();
            assert_eq!(shape.ravel([x as i64, y as i64, z as i64]), Some(index));
        }
        assert_eq!(shape.unravel(105), None);
    }
}
