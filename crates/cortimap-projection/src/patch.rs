// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Constant-patch sampling.

Instead of evaluating a kernel at the vertex alone, a patch kind samples the part of every
incident flat-mesh triangle that lies closest to the vertex (the sub-triangle spanned by
the vertex and the midpoints of its two edges), in fiducial voxel space, and averages the
resulting rows. This reduces aliasing from finely folded cortex.
*/

use crate::kernels::PointKernel;
use cortimap_structures::{Point3, SparseRow, Triangle, VolumeShape};

/// The two corners of `triangle` other than `vertex`, if `vertex` is one of its corners.
fn other_corners(triangle: &Triangle, vertex: usize) -> Option<(usize, usize)> {
    let position = triangle.iter().position(|&v| v == vertex)?;
    Some((triangle[(position + 1) % 3], triangle[(position + 2) % 3]))
}

fn lerp(a: Point3, b: Point3, t: f64) -> Point3 {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Sample locations of the patch around `vertex`.
///
/// The vertex position comes first; each incident face then contributes the points of a
/// barycentric grid of resolution `samples` over its vertex-nearest sub-triangle, excluding
/// the vertex itself.
pub fn patch_samples(
    vertex: usize,
    points: &[Point3],
    polygons: &[Triangle],
    incident_faces: &[usize],
    samples: usize,
) -> Vec<Point3> {
    let center = points[vertex];
    let n = samples.max(1);
    let per_face = (n + 1) * (n + 2) / 2 - 1;
    let mut locations = Vec::with_capacity(1 + incident_faces.len() * per_face);
    locations.push(center);

    for &face in incident_faces {
        let Some((u, w)) = other_corners(&polygons[face], vertex) else {
            continue;
        };
        let mid_u = lerp(center, points[u], 0.5);
        let mid_w = lerp(center, points[w], 0.5);
        for i in 0..=n {
            for j in 0..=(n - i) {
                if i == 0 && j == 0 {
                    continue;
                }
                let s = i as f64 / n as f64;
                let t = j as f64 / n as f64;
                locations.push([
                    center[0] + s * (mid_u[0] - center[0]) + t * (mid_w[0] - center[0]),
                    center[1] + s * (mid_u[1] - center[1]) + t * (mid_w[1] - center[1]),
                    center[2] + s * (mid_u[2] - center[2]) + t * (mid_w[2] - center[2]),
                ]);
            }
        }
    }
    locations
}

/// Averages `kernel` over the patch samples of `vertex`.
pub fn patch_row(
    kernel: &PointKernel,
    vertex: usize,
    points: &[Point3],
    polygons: &[Triangle],
    incident_faces: &[usize],
    samples: usize,
    shape: &VolumeShape,
) -> SparseRow {
    let locations = patch_samples(vertex, points, polygons, incident_faces, samples);
    let scale = 1.0 / locations.len() as f64;
    let mut row = SparseRow::with_capacity(locations.len() * 8);
    for location in locations {
        kernel.accumulate(location, shape, scale, &mut row);
    }
    row
}
