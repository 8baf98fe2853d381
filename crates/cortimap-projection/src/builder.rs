// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Operator construction - one row of weights per vertex, frozen into a [`SparseOperator`].
*/

use crate::kind::ProjectionKind;
use crate::patch::patch_row;
use crate::types::{ProjectionError, ProjectionResult};
use cortimap_structures::mesh::incident_faces;
use cortimap_structures::{Hemispheres, Point3, SparseOperator, SparseRow, Triangle, VolumeShape};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Neighborhood structure of one hemisphere, taken from the flat mesh.
#[derive(Debug, Clone)]
pub struct VertexTopology<'a> {
    polygons: &'a [Triangle],
    incident: Vec<Vec<usize>>,
}

impl<'a> VertexTopology<'a> {
    /// Indexes `polygons` for `n_points` vertices, rejecting faces that reference
    /// missing vertices.
    pub fn new(n_points: usize, polygons: &'a [Triangle]) -> ProjectionResult<Self> {
        if let Some(tri) = polygons.iter().find(|tri| tri.iter().any(|&v| v >= n_points)) {
            return Err(ProjectionError::TopologyMismatch(format!(
                "face {:?} references a vertex outside 0..{}",
                tri, n_points
            )));
        }
        Ok(Self {
            polygons,
            incident: incident_faces(n_points, polygons),
        })
    }

    pub fn polygons(&self) -> &[Triangle] {
        self.polygons
    }

    pub fn incident_faces(&self, vertex: usize) -> &[usize] {
        &self.incident[vertex]
    }
}

/// Weights for one vertex.
///
/// `points` are the hemisphere's fiducial points already transformed into fractional
/// voxel coordinates.
pub fn build_row(
    kind: &ProjectionKind,
    vertex: usize,
    points: &[Point3],
    topology: &VertexTopology<'_>,
    shape: &VolumeShape,
) -> SparseRow {
    let kernel = kind.point_kernel();
    match kind.patch_samples() {
        Some(samples) => patch_row(
            &kernel,
            vertex,
            points,
            topology.polygons(),
            topology.incident_faces(vertex),
            samples,
            shape,
        ),
        None => kernel.row_at(points[vertex], shape),
    }
}

/// Builds the (n_vertices × n_voxels) operator for one hemisphere.
///
/// Kernel parameters too large for `shape` are rejected before any row is built.
pub fn build_operator(
    kind: &ProjectionKind,
    points: &[Point3],
    polygons: &[Triangle],
    shape: &VolumeShape,
) -> ProjectionResult<SparseOperator> {
    kind.check_grid(shape)?;
    let topology = VertexTopology::new(points.len(), polygons)?;
    debug!(
        kind = %kind,
        vertices = points.len(),
        faces = polygons.len(),
        shape = %shape,
        "building projection rows"
    );

    #[cfg(feature = "parallel")]
    let rows: Vec<SparseRow> = (0..points.len())
        .into_par_iter()
        .map(|vertex| build_row(kind, vertex, points, &topology, shape))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<SparseRow> = (0..points.len())
        .map(|vertex| build_row(kind, vertex, points, &topology, shape))
        .collect();

    Ok(SparseOperator::from_rows(rows, shape.n_voxels())?)
}

/// Builds both hemisphere operators from transformed fiducial points and flat topology.
pub fn build_hemispheres(
    kind: &ProjectionKind,
    points: &Hemispheres<Vec<Point3>>,
    polygons: &Hemispheres<Vec<Triangle>>,
    shape: &VolumeShape,
) -> ProjectionResult<Hemispheres<SparseOperator>> {
    Ok(Hemispheres::new(
        build_operator(kind, &points.left, &polygons.left, shape)?,
        build_operator(kind, &points.right, &polygons.right, shape)?,
    ))
}
