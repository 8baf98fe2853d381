// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

//! Serializable projection cache payload

use crate::{CacheError, Result};
use cortimap_structures::{Hemispheres, SparseOperator, VolumeShape};
use serde::{Deserialize, Serialize};

/// Everything needed to reconstruct a mapper: the CSR arrays of both hemisphere
/// operators plus the shared voxel-grid shape.
///
/// Indices and shapes are stored as `u64` so files are portable across pointer widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionCache {
    pub left_data: Vec<f64>,
    pub left_indices: Vec<u64>,
    pub left_indptr: Vec<u64>,
    pub left_shape: [u64; 2],
    pub right_data: Vec<f64>,
    pub right_indices: Vec<u64>,
    pub right_indptr: Vec<u64>,
    pub right_shape: [u64; 2],
    /// Voxel grid shape in (z, y, x) order
    pub shape: [u64; 3],
}

fn to_u64(values: &[usize]) -> Vec<u64> {
    values.iter().map(|&v| v as u64).collect()
}

fn to_usize(values: Vec<u64>, field: &str) -> Result<Vec<usize>> {
    values
        .into_iter()
        .map(|v| {
            usize::try_from(v).map_err(|_| {
                CacheError::Deserialization(format!("{} value {} does not fit in usize", field, v))
            })
        })
        .collect()
}

fn dim(value: u64, field: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        CacheError::Deserialization(format!("{} dimension {} does not fit in usize", field, value))
    })
}

impl ProjectionCache {
    /// Captures both operators verbatim.
    pub fn from_operators(operators: &Hemispheres<SparseOperator>, shape: &VolumeShape) -> Self {
        let left = &operators.left;
        let right = &operators.right;
        Self {
            left_data: left.data().to_vec(),
            left_indices: to_u64(left.indices()),
            left_indptr: to_u64(left.indptr()),
            left_shape: [left.n_rows() as u64, left.n_cols() as u64],
            right_data: right.data().to_vec(),
            right_indices: to_u64(right.indices()),
            right_indptr: to_u64(right.indptr()),
            right_shape: [right.n_rows() as u64, right.n_cols() as u64],
            shape: shape.as_array().map(|d| d as u64),
        }
    }

    /// Rebuilds and validates both operators and the grid shape.
    pub fn into_operators(self) -> Result<(Hemispheres<SparseOperator>, VolumeShape)> {
        let shape = VolumeShape::new(
            dim(self.shape[0], "shape")?,
            dim(self.shape[1], "shape")?,
            dim(self.shape[2], "shape")?,
        )?;

        let left = SparseOperator::from_raw_parts(
            (dim(self.left_shape[0], "left_shape")?, dim(self.left_shape[1], "left_shape")?),
            to_usize(self.left_indptr, "left_indptr")?,
            to_usize(self.left_indices, "left_indices")?,
            self.left_data,
        )?;
        let right = SparseOperator::from_raw_parts(
            (dim(self.right_shape[0], "right_shape")?, dim(self.right_shape[1], "right_shape")?),
            to_usize(self.right_indptr, "right_indptr")?,
            to_usize(self.right_indices, "right_indices")?,
            self.right_data,
        )?;

        for (side, op) in [("left", &left), ("right", &right)] {
            if op.n_cols() != shape.n_voxels() {
                return Err(CacheError::Deserialization(format!(
                    "{} operator has {} columns but the grid {} has {} voxels",
                    side,
                    op.n_cols(),
                    shape,
                    shape.n_voxels()
                )));
            }
        }

        Ok((Hemispheres::new(left, right), shape))
    }
}
