//! Row-compressed sparse operator linking surface vertices to voxels.
//!
//! Each row holds the interpolation weights that contribute to one surface vertex; each
//! column is one voxel of the flattened grid. The operator is built once and never mutated.

use crate::CortimapDataError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Weights accumulated for a single vertex before they are frozen into an operator row.
///
/// Entries for the same column are summed; zero weights are dropped on [`SparseRow::finish`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    entries: Vec<(usize, f64)>,
}

impl SparseRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// A row with a single weight.
    pub fn single(column: usize, weight: f64) -> Self {
        Self {
            entries: vec![(column, weight)],
        }
    }

    pub fn push(&mut self, column: usize, weight: f64) {
        self.entries.push((column, weight));
    }

    /// Adds every entry of `other` scaled by `scale`.
    pub fn extend_scaled(&mut self, other: &SparseRow, scale: f64) {
        self.entries
            .extend(other.entries.iter().map(|&(c, w)| (c, w * scale)));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights currently held.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w).sum()
    }

    /// Sorts by column, merges duplicate columns and removes zero weights.
    pub fn finish(mut self) -> Vec<(usize, f64)> {
        self.entries.sort_by_key(|&(c, _)| c);
        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(self.entries.len());
        for (column, weight) in self.entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == column => *acc += weight,
                _ => merged.push((column, weight)),
            }
        }
        merged.retain(|&(_, w)| w != 0.0);
        merged
    }
}

/// Sparse matrix of shape (n_vertices, n_voxels) in CSR layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseOperator {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl SparseOperator {
    /// An operator with no nonzero entries.
    pub fn empty(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            indptr: vec![0; n_rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Freezes one [`SparseRow`] per vertex into an operator with `n_cols` columns.
    pub fn from_rows(rows: Vec<SparseRow>, n_cols: usize) -> Result<Self, CortimapDataError> {
        let n_rows = rows.len();
        let mut indptr = Vec::with_capacity(n_rows + 1);
        let mut indices = Vec::new();
        let mut data = Vec::new();
        indptr.push(0);

        for (row_index, row) in rows.into_iter().enumerate() {
            for (column, weight) in row.finish() {
                if column >= n_cols {
                    return Err(CortimapDataError::InvalidSparseStructure(format!(
                        "Row {} has column {} but the operator has {} columns",
                        row_index, column, n_cols
                    )));
                }
                indices.push(column);
                data.push(weight);
            }
            indptr.push(indices.len());
        }

        Ok(Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        })
    }

    /// Rebuilds an operator from its raw CSR arrays, validating their structure.
    pub fn from_raw_parts(
        shape: (usize, usize),
        indptr: Vec<usize>,
        indices: Vec<usize>,
        data: Vec<f64>,
    ) -> Result<Self, CortimapDataError> {
        let (n_rows, n_cols) = shape;
        if indptr.len() != n_rows + 1 {
            return Err(CortimapDataError::InvalidSparseStructure(format!(
                "indptr has {} entries, expected {}",
                indptr.len(),
                n_rows + 1
            )));
        }
        if indices.len() != data.len() {
            return Err(CortimapDataError::InvalidSparseStructure(format!(
                "indices ({}) and data ({}) lengths differ",
                indices.len(),
                data.len()
            )));
        }
        if indptr[0] != 0 || indptr[n_rows] != indices.len() {
            return Err(CortimapDataError::InvalidSparseStructure(format!(
                "indptr must start at 0 and end at {}",
                indices.len()
            )));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(CortimapDataError::InvalidSparseStructure(
                "indptr is not monotonically non-decreasing".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&c| c >= n_cols) {
            return Err(CortimapDataError::InvalidSparseStructure(format!(
                "column index {} out of range for {} columns",
                bad, n_cols
            )));
        }

        Ok(Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        })
    }

    pub fn into_raw_parts(self) -> ((usize, usize), Vec<usize>, Vec<usize>, Vec<f64>) {
        ((self.n_rows, self.n_cols), self.indptr, self.indices, self.data)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored nonzero weights.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn indptr(&self) -> &[usize] {
        &self.indptr
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Column indices and weights of one row.
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let start = self.indptr[row];
        let end = self.indptr[row + 1];
        (&self.indices[start..end], &self.data[start..end])
    }

    /// Sum of weights in every row.
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.n_rows)
            .map(|r| self.row(r).1.iter().sum())
            .collect()
    }

    /// Sum of weights in every column (total weight each voxel contributes).
    pub fn column_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.n_cols];
        for (&c, &w) in self.indices.iter().zip(self.data.iter()) {
            sums[c] += w;
        }
        sums
    }

    /// `self · columns`: maps an (n_voxels × frames) matrix to (n_vertices × frames).
    pub fn mul_dense(&self, columns: ArrayView2<f64>) -> Result<Array2<f64>, CortimapDataError> {
        if columns.nrows() != self.n_cols {
            return Err(CortimapDataError::DimensionMismatch(format!(
                "operator has {} columns but the right-hand side has {} rows",
                self.n_cols,
                columns.nrows()
            )));
        }
        let mut out = Array2::<f64>::zeros((self.n_rows, columns.ncols()));
        for (r, mut out_row) in out.outer_iter_mut().enumerate() {
            let (cols, weights) = self.row(r);
            for (&c, &w) in cols.iter().zip(weights.iter()) {
                out_row.scaled_add(w, &columns.row(c));
            }
        }
        Ok(out)
    }

    /// `vector · self`: maps a per-vertex row vector to a per-voxel vector.
    pub fn transpose_mul(&self, vector: ArrayView1<f64>) -> Result<Array1<f64>, CortimapDataError> {
        if vector.len() != self.n_rows {
            return Err(CortimapDataError::DimensionMismatch(format!(
                "operator has {} rows but the vector has {} entries",
                self.n_rows,
                vector.len()
            )));
        }
        let mut out = Array1::<f64>::zeros(self.n_cols);
        for (r, &value) in vector.iter().enumerate() {
            if value == 0.0 {
                continue;
            }
            let (cols, weights) = self.row(r);
            for (&c, &w) in cols.iter().zip(weights.iter()) {
                out[c] += value * w;
            }
        }
        Ok(out)
    }
}
