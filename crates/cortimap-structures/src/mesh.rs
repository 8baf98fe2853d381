//! Triangulated surface meshes.

use crate::{CortimapDataError, Point3, Triangle};
use serde::{Deserialize, Serialize};

/// One hemisphere of a surface representation: an ordered point list and the triangles
/// connecting them.
///
/// Fiducial and flat meshes of the same hemisphere share point count and indexing; the
/// flat mesh may contain fewer triangles (cuts), which is why neighborhood structure is
/// always taken from the flat topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    points: Vec<Point3>,
    polygons: Vec<Triangle>,
}

impl SurfaceMesh {
    /// Creates a mesh, checking that every triangle refers to an existing point.
    pub fn new(points: Vec<Point3>, polygons: Vec<Triangle>) -> Result<Self, CortimapDataError> {
        let n_points = points.len();
        if let Some((face, tri)) = polygons
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&v| v >= n_points))
        {
            return Err(CortimapDataError::InvalidMesh(format!(
                "Face {} {:?} references a vertex outside 0..{}",
                face, tri, n_points
            )));
        }
        Ok(Self { points, polygons })
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn polygons(&self) -> &[Triangle] {
        &self.polygons
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn into_parts(self) -> (Vec<Point3>, Vec<Triangle>) {
        (self.points, self.polygons)
    }

    /// For every vertex, the indices of the triangles that touch it (its 1-ring faces).
    pub fn incident_faces(&self) -> Vec<Vec<usize>> {
        incident_faces(self.points.len(), &self.polygons)
    }
}

/// Builds the vertex → incident-face adjacency for `n_points` vertices.
///
/// Triangles must already be validated against `n_points`.
pub fn incident_faces(n_points: usize, polygons: &[Triangle]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); n_points];
    for (face, tri) in polygons.iter().enumerate() {
        for &v in tri {
            if let Some(faces) = adjacency.get_mut(v) {
                faces.push(face);
            }
        }
    }
    adjacency
}
