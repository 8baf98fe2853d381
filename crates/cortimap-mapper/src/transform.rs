// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Coordinate transforms from anatomical space into fractional voxel coordinates.
*/

use cortimap_structures::{CortimapDataError, Point3, VolumeShape};
use serde::{Deserialize, Serialize};

/// Maps anatomical points into the voxel space of a functional volume.
///
/// Output points are (x, y, z) fractional voxel coordinates; [`shape`](Self::shape) is the
/// target grid in (z, y, x) order.
pub trait CoordinateTransform: Send + Sync {
    fn apply(&self, points: &[Point3]) -> Vec<Point3>;

    fn shape(&self) -> VolumeShape;
}

/// Affine transform stored as a 4×4 row-major homogeneous matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransformFile", into = "TransformFile")]
pub struct AffineTransform {
    matrix: [[f64; 4]; 4],
    shape: VolumeShape,
}

impl AffineTransform {
    pub fn new(matrix: [[f64; 4]; 4], shape: VolumeShape) -> Result<Self, CortimapDataError> {
        if matrix.iter().flatten().any(|v| !v.is_finite()) {
            return Err(CortimapDataError::BadParameters(
                "Transform matrix contains non-finite entries".to_string(),
            ));
        }
        Ok(Self { matrix, shape })
    }

    /// Identity transform onto `shape`: anatomical coordinates already are voxel coordinates.
    pub fn identity(shape: VolumeShape) -> Self {
        let mut matrix = [[0.0; 4]; 4];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { matrix, shape }
    }

    pub fn matrix(&self) -> &[[f64; 4]; 4] {
        &self.matrix
    }

    fn apply_point(&self, point: Point3) -> Point3 {
        let [x, y, z] = point;
        let m = &self.matrix;
        let project = |row: &[f64; 4]| row[0] * x + row[1] * y + row[2] * z + row[3];
        let w = project(&m[3]);
        let w = if w != 0.0 { w } else { 1.0 };
        [project(&m[0]) / w, project(&m[1]) / w, project(&m[2]) / w]
    }
}

impl CoordinateTransform for AffineTransform {
    fn apply(&self, points: &[Point3]) -> Vec<Point3> {
        points.iter().map(|&p| self.apply_point(p)).collect()
    }

    fn shape(&self) -> VolumeShape {
        self.shape
    }
}

/// On-disk form of an [`AffineTransform`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransformFile {
    /// Target grid, (z, y, x)
    shape: [usize; 3],
    matrix: [[f64; 4]; 4],
}

impl TryFrom<TransformFile> for AffineTransform {
    type Error = CortimapDataError;

    fn try_from(file: TransformFile) -> Result<Self, Self::Error> {
        AffineTransform::new(file.matrix, VolumeShape::from_array(file.shape)?)
    }
}

impl From<AffineTransform> for TransformFile {
    fn from(xfm: AffineTransform) -> Self {
        TransformFile {
            shape: xfm.shape.as_array(),
            matrix: xfm.matrix,
        }
    }
}
