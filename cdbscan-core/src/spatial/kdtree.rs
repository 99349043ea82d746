//! Bounded-leaf k-d tree over source coordinates.
//!
//! Internal nodes split on the axis with the widest spread at the median
//! point, so every subtree holds at most half of its parent (rounded up) and
//! the tree depth is logarithmic in the point count. Nodes and leaves live in
//! flat vectors; leaves are numbered in depth-first order.

use std::num::NonZeroUsize;

use crate::{
    datasource::{DataSource, checked_distance},
    error::DataSourceError,
};

use super::{Leaf, SpatialIndex};

#[derive(Clone, Copy, Debug)]
enum KdNode {
    Leaf {
        leaf: usize,
    },
    Split {
        axis: usize,
        value: f32,
        left: usize,
        right: usize,
    },
}

/// k-d tree whose leaves hold at most `leaf_size` points.
///
/// Range queries prune a subtree when the query lies farther than the radius
/// from the splitting plane, then confirm candidates with
/// [`DataSource::distance`].
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use cdbscan_core::{DenseSource, KdTree, SpatialIndex};
///
/// let rows: Vec<Vec<f32>> = (0..8).map(|i| vec![i as f32, 0.0]).collect();
/// let source = DenseSource::try_new("line", &rows)?;
/// let tree = KdTree::build(&source, NonZeroUsize::new(3).expect("non-zero"))?;
/// assert!(tree.leaves().iter().all(|leaf| leaf.members().len() <= 3));
/// assert_eq!(tree.range_query(&source, 4, 1.0)?, [3, 4, 5]);
/// # Ok::<(), cdbscan_core::DataSourceError>(())
/// ```
#[derive(Clone, Debug)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    leaves: Vec<Leaf>,
    items: usize,
}

impl KdTree {
    /// Builds a tree over every point of `source`.
    ///
    /// # Errors
    /// Returns [`DataSourceError::CoordinatesUnavailable`] when the source
    /// does not expose coordinates, [`DataSourceError::ZeroDimension`] for
    /// empty coordinate vectors, and [`DataSourceError::DimensionMismatch`]
    /// when points disagree on dimension.
    pub fn build<D: DataSource + ?Sized>(
        source: &D,
        leaf_size: NonZeroUsize,
    ) -> Result<Self, DataSourceError> {
        let items = source.len();
        let coords = collect_coordinates(source)?;

        let mut builder = TreeBuilder {
            coords: &coords,
            leaf_size: leaf_size.get(),
            nodes: Vec::new(),
            leaves: Vec::new(),
        };
        let mut order: Vec<usize> = (0..items).collect();
        if items > 0 {
            builder.split(&mut order);
        }

        Ok(Self {
            nodes: builder.nodes,
            leaves: builder.leaves,
            items,
        })
    }
}

fn collect_coordinates<D: DataSource + ?Sized>(
    source: &D,
) -> Result<Vec<&[f32]>, DataSourceError> {
    let mut coords = Vec::with_capacity(source.len());
    for index in 0..source.len() {
        let point = source
            .point(index)
            .ok_or(DataSourceError::CoordinatesUnavailable { index })?;
        coords.push(point);
    }

    let dimension = coords.first().map_or(0, |point| point.len());
    if !coords.is_empty() && dimension == 0 {
        return Err(DataSourceError::ZeroDimension);
    }
    if let Some(point) = coords.iter().find(|point| point.len() != dimension) {
        return Err(DataSourceError::DimensionMismatch {
            left: dimension,
            right: point.len(),
        });
    }
    Ok(coords)
}

struct TreeBuilder<'a> {
    coords: &'a [&'a [f32]],
    leaf_size: usize,
    nodes: Vec<KdNode>,
    leaves: Vec<Leaf>,
}

impl TreeBuilder<'_> {
    /// Builds the subtree over `slice` and returns its node id.
    fn split(&mut self, slice: &mut [usize]) -> usize {
        let node_id = self.nodes.len();
        if slice.len() <= self.leaf_size {
            let leaf = self.leaves.len();
            self.leaves.push(Leaf::new(leaf, slice.to_vec()));
            self.nodes.push(KdNode::Leaf { leaf });
            return node_id;
        }

        let axis = self.widest_axis(slice);
        let mid = slice.len() / 2;
        let coords = self.coords;
        slice.select_nth_unstable_by(mid, |&a, &b| coords[a][axis].total_cmp(&coords[b][axis]));
        let value = coords[slice[mid]][axis];

        // Placeholder until both children exist.
        self.nodes.push(KdNode::Leaf { leaf: usize::MAX });
        let (lower, upper) = slice.split_at_mut(mid);
        let left = self.split(lower);
        let right = self.split(upper);
        self.nodes[node_id] = KdNode::Split {
            axis,
            value,
            left,
            right,
        };
        node_id
    }

    fn widest_axis(&self, slice: &[usize]) -> usize {
        let dimension = self.coords[slice[0]].len();
        let mut best_axis = 0;
        let mut best_spread = f32::NEG_INFINITY;
        for axis in 0..dimension {
            let (low, high) = slice.iter().fold(
                (f32::INFINITY, f32::NEG_INFINITY),
                |(low, high), &index| {
                    let value = self.coords[index][axis];
                    (low.min(value), high.max(value))
                },
            );
            let spread = high - low;
            if spread > best_spread {
                best_spread = spread;
                best_axis = axis;
            }
        }
        best_axis
    }
}

impl SpatialIndex for KdTree {
    fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    fn range_query<D: DataSource + ?Sized>(
        &self,
        source: &D,
        point: usize,
        radius: f32,
    ) -> Result<Vec<usize>, DataSourceError> {
        if point >= self.items {
            return Err(DataSourceError::OutOfBounds { index: point });
        }
        let query = source
            .point(point)
            .ok_or(DataSourceError::CoordinatesUnavailable { index: point })?;

        let mut within = Vec::new();
        let mut stack = vec![0_usize];
        while let Some(node) = stack.pop() {
            match self.nodes[node] {
                KdNode::Leaf { leaf } => {
                    for &member in self.leaves[leaf].members() {
                        if member == point || checked_distance(source, point, member)? <= radius
                        {
                            within.push(member);
                        }
                    }
                }
                KdNode::Split {
                    axis,
                    value,
                    left,
                    right,
                } => {
                    let Some(&coordinate) = query.get(axis) else {
                        return Err(DataSourceError::DimensionMismatch {
                            left: axis + 1,
                            right: query.len(),
                        });
                    };
                    if coordinate - radius <= value {
                        stack.push(left);
                    }
                    if coordinate + radius >= value {
                        stack.push(right);
                    }
                }
            }
        }
        within.sort_unstable();
        Ok(within)
    }
}
