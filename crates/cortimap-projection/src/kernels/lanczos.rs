// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
Lanczos kernel - separable windowed sinc, one 1D kernel per axis multiplied per voxel.
*/

use cortimap_structures::{Point3, SparseRow, VolumeShape};
use std::f64::consts::PI;

/// One-dimensional Lanczos kernel `sinc(t) * sinc(t / a)` for `|t| < a`, zero elsewhere.
pub fn lanczos(t: f64, window: usize) -> f64 {
    let a = window as f64;
    if t == 0.0 {
        return 1.0;
    }
    if t.abs() >= a || t.fract() == 0.0 {
        return 0.0;
    }
    let pt = PI * t;
    a * pt.sin() * (pt / a).sin() / (pt * pt)
}

/// Integer taps and weights along one axis for a sample at `center`.
fn axis_taps(center: f64, window: usize) -> Vec<(i64, f64)> {
    let base = center.floor() as i64;
    let a = window as i64;
    ((base - a + 1)..=(base + a))
        .map(|i| (i, lanczos(i as f64 - center, window)))
        .filter(|&(_, w)| w != 0.0)
        .collect()
}

/// Adds separable Lanczos weights around `position`, scaled by `scale`.
///
/// Normalized by the product of the per-axis tap sums (the full, unclipped footprint), so
/// interior rows sum to `scale` and rows clipped by the grid border sum to less.
pub fn accumulate(position: Point3, shape: &VolumeShape, window: usize, scale: f64, row: &mut SparseRow) {
    let taps_x = axis_taps(position[0], window);
    let taps_y = axis_taps(position[1], window);
    let taps_z = axis_taps(position[2], window);

    let norm: f64 = [&taps_x, &taps_y, &taps_z]
        .iter()
        .map(|taps| taps.iter().map(|&(_, w)| w).sum::<f64>())
        .product();
    if norm == 0.0 {
        return;
    }
    let factor = scale / norm;

    for &(z, wz) in &taps_z {
        for &(y, wy) in &taps_y {
            for &(x, wx) in &taps_x {
                if let Some(index) = shape.ravel([x, y, z]) {
                    row.push(index, wx * wy * wz * factor);
                }
            }
        }
    }
}
