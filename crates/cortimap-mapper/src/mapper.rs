// Copyright 2025 Cortimap Developers
// SPDX-License-Identifier: Apache-2.0

/*!
The mapper: a pair of per-hemisphere projection operators plus the voxel grid they read.

Forward application accepts three input layouts, matched in a fixed order by
[`FORWARD_LAYOUTS`]. Anything that matches none of them is a
[`MapperError::ShapeMismatch`].
*/

use crate::error::{MapperError, MapperResult};
use cortimap_projection::ProjectionKind;
use cortimap_structures::{CortimapDataError, Hemisphere, Hemispheres, SparseOperator, VolumeShape};
use ndarray::{concatenate, Array1, Array2, Array3, ArrayD, ArrayView1, ArrayViewD, Axis, IxDyn, Slice};
use std::fmt::{Display, Formatter};

/// How a mapper came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperOrigin {
    /// Projection rows were computed in this process
    Built,
    /// Operators were read back from a cache file
    Cache,
}

/// Layouts recognized by [`Mapper::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// Trailing axis holds one value per vertex of both hemispheres
    Vertices,
    /// `(count,)` or `(frames, count)` over the voxels selected by [`Mapper::mask`]
    MaskedVoxels,
    /// `(z, y, x)` or `(frames, z, y, x)` matching the grid
    Volume,
}

/// Sizes a candidate input is matched against.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext {
    pub n_vertices: usize,
    pub mask_count: usize,
    pub grid: [usize; 3],
}

type LayoutMatcher = fn(&LayoutContext, &[usize]) -> bool;

fn matches_vertices(ctx: &LayoutContext, dims: &[usize]) -> bool {
    dims.last() == Some(&ctx.n_vertices)
}

fn matches_masked_voxels(ctx: &LayoutContext, dims: &[usize]) -> bool {
    matches!(dims.len(), 1 | 2) && dims.last() == Some(&ctx.mask_count)
}

fn matches_volume(ctx: &LayoutContext, dims: &[usize]) -> bool {
    matches!(dims.len(), 3 | 4) && dims[dims.len() - 3..] == ctx.grid
}

/// Ordered (layout, predicate) table; the first predicate that accepts wins.
pub const FORWARD_LAYOUTS: [(InputLayout, LayoutMatcher); 3] = [
    (InputLayout::Vertices, matches_vertices),
    (InputLayout::MaskedVoxels, matches_masked_voxels),
    (InputLayout::Volume, matches_volume),
];

/// Resolves the layout of an input with dimensions `dims`.
pub fn classify_layout(ctx: &LayoutContext, dims: &[usize]) -> MapperResult<InputLayout> {
    FORWARD_LAYOUTS
        .iter()
        .find(|(_, accepts)| accepts(ctx, dims))
        .map(|(layout, _)| *layout)
        .ok_or_else(|| {
            MapperError::ShapeMismatch(format!(
                "shape {:?} matches neither {} vertices, {} masked voxels nor grid {:?}",
                dims, ctx.n_vertices, ctx.mask_count, ctx.grid
            ))
        })
}

/// Vertex data handed to [`Mapper::backwards`].
///
/// Each array is read as per-vertex values when its length equals the vertex count it
/// covers, and as a list of vertex indices otherwise.
#[derive(Debug, Clone)]
pub enum VertexInput<'a> {
    /// Already split per hemisphere
    Split(Hemispheres<ArrayView1<'a, f64>>),
    /// Both hemispheres concatenated, left first
    Combined(ArrayView1<'a, f64>),
}

/// Volume → surface operator pair for one subject, transform and projection kind.
#[derive(Debug, Clone)]
pub struct Mapper {
    kind: ProjectionKind,
    operators: Hemispheres<SparseOperator>,
    shape: VolumeShape,
    origin: MapperOrigin,
    idxmap: Option<Hemispheres<Vec<usize>>>,
}

impl Mapper {
    /// Wraps an operator pair; both operators must have one column per voxel of `shape`.
    pub fn new(
        kind: ProjectionKind,
        operators: Hemispheres<SparseOperator>,
        shape: VolumeShape,
        origin: MapperOrigin,
    ) -> MapperResult<Self> {
        for (side, operator) in operators.iter() {
            if operator.n_cols() != shape.n_voxels() {
                return Err(CortimapDataError::DimensionMismatch(format!(
                    "{} operator has {} columns, grid {} has {} voxels",
                    side,
                    operator.n_cols(),
                    shape,
                    shape.n_voxels()
                ))
                .into());
            }
        }
        Ok(Self {
            kind,
            operators,
            shape,
            origin,
            idxmap: None,
        })
    }

    pub fn kind(&self) -> &ProjectionKind {
        &self.kind
    }

    pub fn origin(&self) -> MapperOrigin {
        self.origin
    }

    pub fn shape(&self) -> VolumeShape {
        self.shape
    }

    pub fn operators(&self) -> &Hemispheres<SparseOperator> {
        &self.operators
    }

    pub fn into_operators(self) -> Hemispheres<SparseOperator> {
        self.operators
    }

    /// Combined vertex count of both hemispheres.
    pub fn n_vertices(&self) -> usize {
        self.operators.left.n_rows() + self.operators.right.n_rows()
    }

    pub fn hemisphere_vertices(&self, side: Hemisphere) -> usize {
        self.operators.get(side).n_rows()
    }

    pub fn idxmap(&self) -> Option<&Hemispheres<Vec<usize>>> {
        self.idxmap.as_ref()
    }

    /// Sets (or clears) a per-hemisphere reordering applied to every forward result.
    pub fn set_idxmap(&mut self, idxmap: Option<Hemispheres<Vec<usize>>>) -> MapperResult<()> {
        if let Some(map) = &idxmap {
            for (side, indices) in map.iter() {
                let limit = self.hemisphere_vertices(side);
                if let Some(&bad) = indices.iter().find(|&&i| i >= limit) {
                    return Err(MapperError::VertexIndexOutOfRange {
                        index: bad as f64,
                        limit,
                    });
                }
            }
        }
        self.idxmap = idxmap;
        Ok(())
    }

    fn mask_vector(&self) -> Vec<bool> {
        self.operators
            .left
            .column_sums()
            .into_iter()
            .zip(self.operators.right.column_sums())
            .map(|(l, r)| l + r != 0.0)
            .collect()
    }

    fn to_volume<T: Copy>(&self, flat: &[T]) -> Array3<T> {
        let (ny, nx) = (self.shape.y, self.shape.x);
        Array3::from_shape_fn((self.shape.z, ny, nx), |(z, y, x)| flat[(z * ny + y) * nx + x])
    }

    /// Voxels with nonzero total weight over both hemispheres.
    pub fn mask(&self) -> Array3<bool> {
        self.to_volume(&self.mask_vector())
    }

    /// [`Mapper::mask`] computed for each hemisphere separately.
    pub fn hemimasks(&self) -> Hemispheres<Array3<bool>> {
        self.operators.by_ref().map(|operator| {
            let nonzero: Vec<bool> = operator.column_sums().iter().map(|&s| s != 0.0).collect();
            self.to_volume(&nonzero)
        })
    }

    fn layout_context(&self, mask: &[bool]) -> LayoutContext {
        LayoutContext {
            n_vertices: self.n_vertices(),
            mask_count: mask.iter().filter(|&&m| m).count(),
            grid: self.shape.as_array(),
        }
    }

    /// Layout that [`Mapper::apply`] would use for an input of shape `dims`.
    pub fn layout_of(&self, dims: &[usize]) -> MapperResult<InputLayout> {
        classify_layout(&self.layout_context(&self.mask_vector()), dims)
    }

    /// Projects volume data (or splits vertex data) onto both hemispheres.
    ///
    /// Voxel inputs produce `(frames, n_vertices_hemi)` per hemisphere when the input had a
    /// frame axis and `(n_vertices_hemi,)` otherwise. Vertex inputs are split at the left
    /// hemisphere boundary along their last axis.
    pub fn apply(&self, data: ArrayViewD<f64>) -> MapperResult<Hemispheres<ArrayD<f64>>> {
        let mask = self.mask_vector();
        let layout = classify_layout(&self.layout_context(&mask), data.shape())?;

        let mapped = match layout {
            InputLayout::Vertices => {
                let last = Axis(data.ndim() - 1);
                let n_left = self.hemisphere_vertices(Hemisphere::Left);
                Hemispheres::new(
                    data.slice_axis(last, Slice::from(..n_left)).to_owned(),
                    data.slice_axis(last, Slice::from(n_left..)).to_owned(),
                )
            }
            InputLayout::MaskedVoxels | InputLayout::Volume => {
                let framed = match layout {
                    InputLayout::MaskedVoxels => data.ndim() == 2,
                    _ => data.ndim() == 4,
                };
                let columns = self.voxel_columns(data, layout, &mask)?;
                self.operators.by_ref().try_map_with(
                    |_, operator| -> MapperResult<ArrayD<f64>> {
                        let per_frame = operator.mul_dense(columns.view())?.reversed_axes();
                        Ok(if framed {
                            per_frame.into_dyn()
                        } else {
                            per_frame.index_axis_move(Axis(0), 0).into_dyn()
                        })
                    },
                )?
            }
        };
        Ok(self.reindex(mapped))
    }

    /// Scatters voxel input into an `(n_voxels, frames)` column matrix.
    fn voxel_columns(
        &self,
        data: ArrayViewD<f64>,
        layout: InputLayout,
        mask: &[bool],
    ) -> MapperResult<Array2<f64>> {
        let n_voxels = self.shape.n_voxels();
        let sample_axes = if layout == InputLayout::Volume { 3 } else { 1 };
        let (lead, trailing) = data.shape().split_at(data.ndim() - sample_axes);
        let frames: usize = lead.iter().product();
        let samples: usize = trailing.iter().product();
        let rows: Array2<f64> = data
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((frames, samples))?;

        if layout == InputLayout::Volume {
            return Ok(rows.reversed_axes());
        }

        let mut columns = Array2::<f64>::zeros((n_voxels, frames));
        let selected = mask.iter().enumerate().filter(|(_, m)| **m).map(|(voxel, _)| voxel);
        for (sample, voxel) in selected.enumerate() {
            columns.row_mut(voxel).assign(&rows.column(sample));
        }
        Ok(columns)
    }

    fn reindex(&self, mapped: Hemispheres<ArrayD<f64>>) -> Hemispheres<ArrayD<f64>> {
        match &self.idxmap {
            None => mapped,
            Some(idxmap) => mapped.zip(idxmap.by_ref()).map(|(values, indices)| {
                let last = Axis(values.ndim() - 1);
                values.select(last, indices)
            }),
        }
    }

    /// Forward application for unsigned-byte color data.
    ///
    /// The channel axis sits immediately before the vertex axis for vertex input and leads
    /// for voxel input; it must have 3 or 4 entries. Three channels gain an opaque alpha.
    /// Each hemisphere comes back as `(..., n_vertices_hemi, 4)`.
    ///
    /// Alpha goes through the same projection as the color channels. For voxel input a
    /// vertex whose row sums to less than 1 (outside the grid, or a kernel clipped by the
    /// border) therefore gets a proportionally lower alpha, down to 0 for an empty row.
    pub fn apply_raw(&self, data: ArrayViewD<u8>) -> MapperResult<Hemispheres<ArrayD<u8>>> {
        let dims = data.shape().to_vec();
        let ndim = dims.len();
        let channel_axis = match self.layout_of(&dims)? {
            InputLayout::Vertices if ndim >= 2 => Some(ndim - 2),
            InputLayout::MaskedVoxels if ndim == 2 => Some(0),
            InputLayout::Volume if ndim == 4 => Some(0),
            _ => None,
        }
        .ok_or_else(|| {
            MapperError::ShapeMismatch(format!("raw color data {:?} has no channel axis", dims))
        })?;

        let values = data.mapv(f64::from);
        let rgba = match dims[channel_axis] {
            4 => values,
            3 => {
                let mut alpha_dims = dims.clone();
                alpha_dims[channel_axis] = 1;
                let alpha = ArrayD::from_elem(IxDyn(&alpha_dims), f64::from(u8::MAX));
                concatenate(Axis(channel_axis), &[values.view(), alpha.view()])?
            }
            other => {
                return Err(MapperError::ShapeMismatch(format!(
                    "raw color data needs 3 or 4 channels, got {}",
                    other
                )))
            }
        };

        Ok(self.apply(rgba.view())?.map(|mut mapped| {
            let n = mapped.ndim();
            mapped.swap_axes(n - 2, n - 1);
            mapped.mapv(|v| v.round().clamp(0.0, f64::from(u8::MAX)) as u8)
        }))
    }

    /// Projects vertex values (or a vertex selection) back into each hemisphere's volume.
    pub fn backwards(&self, input: VertexInput<'_>) -> MapperResult<Hemispheres<Array3<f64>>> {
        let n_left = self.hemisphere_vertices(Hemisphere::Left);
        let n_right = self.hemisphere_vertices(Hemisphere::Right);

        let weights = match input {
            VertexInput::Split(split) => split.try_map_with(|side, values| -> MapperResult<_> {
                let limit = self.hemisphere_vertices(side);
                if values.len() == limit {
                    Ok(values.to_owned())
                } else {
                    let mut selected = Array1::<f64>::zeros(limit);
                    for &value in values.iter() {
                        selected[vertex_index(value, limit)?] = 1.0;
                    }
                    Ok(selected)
                }
            })?,
            VertexInput::Combined(values) => {
                let total = n_left + n_right;
                if values.len() == total {
                    Hemispheres::new(
                        values.slice_axis(Axis(0), Slice::from(..n_left)).to_owned(),
                        values.slice_axis(Axis(0), Slice::from(n_left..)).to_owned(),
                    )
                } else {
                    let mut left = Array1::<f64>::zeros(n_left);
                    let mut right = Array1::<f64>::zeros(n_right);
                    for &value in values.iter() {
                        let index = vertex_index(value, total)?;
                        if index < n_left {
                            left[index] = 1.0;
                        } else {
                            right[index - n_left] = 1.0;
                        }
                    }
                    Hemispheres::new(left, right)
                }
            }
        };

        self.operators
            .by_ref()
            .zip(weights)
            .try_map_with(|_, (operator, weights)| -> MapperResult<Array3<f64>> {
                let voxels = operator.transpose_mul(weights.view())?;
                Ok(voxels.into_shape_with_order(self.shape.as_array())?)
            })
    }
}

/// Reads `value` as a vertex index below `limit`.
fn vertex_index(value: f64, limit: usize) -> MapperResult<usize> {
    if value >= 0.0 && value.fract() == 0.0 && value < limit as f64 {
        Ok(value as usize)
    } else {
        Err(MapperError::VertexIndexOutOfRange {
            index: value,
            limit,
        })
    }
}

impl Display for Mapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{} mapper with {} vertices>", self.kind, self.n_vertices())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortimap_structures::SparseRow;
    use ndarray::{array, Array, Array4};

    /// 2×2×2 grid. Left: vertex 0 → voxel 0, vertex 1 → voxel 3, vertex 2 outside.
    /// Right: vertex 0 → half voxel 5 and half voxel 6.
    fn mapper() -> Mapper {
        let shape = VolumeShape::new(2, 2, 2).unwrap();
        let left = SparseOperator::from_rows(
            vec![SparseRow::single(0, 1.0), SparseRow::single(3, 1.0), SparseRow::new()],
            8,
        )
        .unwrap();
        let mut half = SparseRow::new();
        half.push(5, 0.5);
        half.push(6, 0.5);
        let right = SparseOperator::from_rows(vec![half], 8).unwrap();
        Mapper::new(
            ProjectionKind::Nearest,
            Hemispheres::new(left, right),
            shape,
            MapperOrigin::Built,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_operator_with_wrong_width() {
        let shape = VolumeShape::new(2, 2, 2).unwrap();
        let ops = Hemispheres::new(SparseOperator::empty(1, 8), SparseOperator::empty(1, 9));
        assert!(Mapper::new(ProjectionKind::Nearest, ops, shape, MapperOrigin::Built).is_err());
    }

    #[test]
    fn test_counts_and_display() {
        let m = mapper();
        assert_eq!(m.n_vertices(), 4);
        assert_eq!(m.hemisphere_vertices(Hemisphere::Left), 3);
        assert_eq!(m.to_string(), "<nearest mapper with 4 vertices>");
    }

    #[test]
    fn test_masks() {
        let m = mapper();
        let mask = m.mask();
        let on: Vec<usize> = mask.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| i).collect();
        assert_eq!(on, vec![0, 3, 5, 6]);

        let hemis = m.hemimasks();
        assert_eq!(hemis.left.iter().filter(|&&b| b).count(), 2);
        assert!(hemis.right[[1, 0, 1]] && hemis.right[[1, 1, 0]]);
    }

    #[test]
    fn test_layout_table_order() {
        let ctx = LayoutContext {
            n_vertices: 4,
            mask_count: 4,
            grid: [2, 2, 2],
        };
        // vertex layout wins when the mask count coincides with the vertex count
        assert_eq!(classify_layout(&ctx, &[4]).unwrap(), InputLayout::Vertices);
        assert_eq!(classify_layout(&ctx, &[2, 2, 2]).unwrap(), InputLayout::Volume);
        assert_eq!(classify_layout(&ctx, &[7, 2, 2, 2]).unwrap(), InputLayout::Volume);
        assert!(matches!(
            classify_layout(&ctx, &[5]),
            Err(MapperError::ShapeMismatch(_))
        ));
        assert!(classify_layout(&ctx, &[1, 1, 2, 2, 2]).is_err());
    }

    #[test]
    fn test_apply_volume_without_frames() {
        let m = mapper();
        let volume = Array::from_shape_vec((2, 2, 2), (0..8).map(f64::from).collect()).unwrap();
        let out = m.apply(volume.view().into_dyn()).unwrap();
        assert_eq!(out.left, array![0.0, 3.0, 0.0].into_dyn());
        assert_eq!(out.right, array![5.5].into_dyn());
    }

    #[test]
    fn test_apply_volume_keeps_single_frame_axis() {
        let m = mapper();
        let volume = Array4::<f64>::ones((1, 2, 2, 2));
        let out = m.apply(volume.view().into_dyn()).unwrap();
        assert_eq!(out.left.shape(), &[1, 3]);
        assert_eq!(out.right.shape(), &[1, 1]);
    }

    /// One left vertex on voxel 1; right vertices on voxel 2, voxel 7 (weight 2) and
    /// voxel 2 again (weight 0.5). Four vertices, three mask voxels.
    fn mapper_with_three_mask_voxels() -> Mapper {
        let shape = VolumeShape::new(2, 2, 2).unwrap();
        let left = SparseOperator::from_rows(vec![SparseRow::single(1, 1.0)], 8).unwrap();
        let right = SparseOperator::from_rows(
            vec![
                SparseRow::single(2, 1.0),
                SparseRow::single(7, 2.0),
                SparseRow::single(2, 0.5),
            ],
            8,
        )
        .unwrap();
        Mapper::new(
            ProjectionKind::Nearest,
            Hemispheres::new(left, right),
            shape,
            MapperOrigin::Cache,
        )
        .unwrap()
    }

    #[test]
    fn test_apply_masked_voxels_zero_fills() {
        let m = mapper_with_three_mask_voxels();
        assert_eq!(m.layout_of(&[2, 3]).unwrap(), InputLayout::MaskedVoxels);

        let data = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let out = m.apply(data.view().into_dyn()).unwrap();
        assert_eq!(out.left, array![[1.0], [4.0]].into_dyn());
        assert_eq!(out.right, array![[2.0, 6.0, 1.0], [5.0, 12.0, 2.5]].into_dyn());

        let single = array![1.0, 2.0, 3.0];
        let out = m.apply(single.view().into_dyn()).unwrap();
        assert_eq!(out.left, array![1.0].into_dyn());
        assert_eq!(out.right, array![2.0, 6.0, 1.0].into_dyn());
    }

    #[test]
    fn test_apply_vertex_split_and_idxmap() {
        let mut m = mapper();
        let data = array![[0.0, 1.0, 2.0, 3.0], [4.0, 5.0, 6.0, 7.0]];
        let out = m.apply(data.view().into_dyn()).unwrap();
        assert_eq!(out.left, array![[0.0, 1.0, 2.0], [4.0, 5.0, 6.0]].into_dyn());
        assert_eq!(out.right, array![[3.0], [7.0]].into_dyn());

        m.set_idxmap(Some(Hemispheres::new(vec![2, 0], vec![0, 0])))
            .unwrap();
        let out = m.apply(data.view().into_dyn()).unwrap();
        assert_eq!(out.left, array![[2.0, 0.0], [6.0, 4.0]].into_dyn());
        assert_eq!(out.right, array![[3.0, 3.0], [7.0, 7.0]].into_dyn());
    }

    #[test]
    fn test_set_idxmap_validates() {
        let mut m = mapper();
        let err = m
            .set_idxmap(Some(Hemispheres::new(vec![0], vec![1])))
            .unwrap_err();
        assert!(matches!(err, MapperError::VertexIndexOutOfRange { limit: 1, .. }));
        assert!(m.idxmap().is_none());
    }

    #[test]
    fn test_backwards_values_and_indices() {
        let m = mapper();
        let values = array![1.0, 2.0, 3.0, 4.0];
        let out = m.backwards(VertexInput::Combined(values.view())).unwrap();
        assert_eq!(out.left[[0, 0, 0]], 1.0);
        assert_eq!(out.left[[0, 1, 1]], 2.0);
        assert_eq!(out.right[[1, 0, 1]], 2.0);
        assert_eq!(out.right[[1, 1, 0]], 2.0);

        // index list: vertex 1 (left) and vertex 3 (right vertex 0)
        let indices = array![1.0, 3.0];
        let out = m.backwards(VertexInput::Combined(indices.view())).unwrap();
        assert_eq!(out.left.sum(), 1.0);
        assert_eq!(out.left[[0, 1, 1]], 1.0);
        assert_eq!(out.right.sum(), 1.0);

        let bad = array![0.0, 9.0];
        assert!(matches!(
            m.backwards(VertexInput::Combined(bad.view())),
            Err(MapperError::VertexIndexOutOfRange { limit: 4, .. })
        ));
    }

    #[test]
    fn test_backwards_split() {
        let m = mapper();
        let left = array![0.0];
        let right = array![1.0];
        let out = m
            .backwards(VertexInput::Split(Hemispheres::new(left.view(), right.view())))
            .unwrap();
        // left read as indices (length 1 != 3), right read as values (length 1 == 1)
        assert_eq!(out.left[[0, 0, 0]], 1.0);
        assert_eq!(out.left.sum(), 1.0);
        assert_eq!(out.right.sum(), 1.0);

        let too_big = array![5.0];
        assert!(m
            .backwards(VertexInput::Split(Hemispheres::new(too_big.view(), right.view())))
            .is_err());
    }

    #[test]
    fn test_apply_raw_promotes_alpha() {
        let m = mapper();
        let rgb = Array::from_shape_fn((3, 4), |(c, v)| (10 * c + v) as u8);
        let out = m.apply_raw(rgb.view().into_dyn()).unwrap();
        assert_eq!(out.left.shape(), &[3, 4]);
        assert_eq!(out.right.shape(), &[1, 4]);
        for vertex in out.left.outer_iter() {
            assert_eq!(vertex[3], 255);
        }
        assert_eq!(out.left[[1, 0]], 1);
        assert_eq!(out.left[[1, 2]], 21);
        assert_eq!(out.right[[0, 3]], 255);

        let two = Array::from_elem((2, 4), 0u8);
        assert!(m.apply_raw(two.view().into_dyn()).is_err());
    }

    #[test]
    fn test_apply_raw_volume_alpha_follows_weights() {
        let m = mapper();
        let rgb = Array4::<u8>::from_elem((3, 2, 2, 2), 100);
        let out = m.apply_raw(rgb.view().into_dyn()).unwrap();
        assert_eq!(out.left.shape(), &[3, 4]);
        assert_eq!(out.right.shape(), &[1, 4]);

        let vertex = |colors: &ArrayD<u8>, index: usize| -> Vec<u8> {
            colors.index_axis(Axis(0), index).iter().copied().collect()
        };
        // in-grid vertices are opaque
        assert_eq!(vertex(&out.left, 0), vec![100, 100, 100, 255]);
        assert_eq!(vertex(&out.left, 1), vec![100, 100, 100, 255]);
        assert_eq!(vertex(&out.right, 0), vec![100, 100, 100, 255]);
        // the vertex with an empty row gets nothing, alpha included
        assert_eq!(vertex(&out.left, 2), vec![0, 0, 0, 0]);
    }
}
