//! Spatial partitioning and radius queries.
//!
//! A [`SpatialIndex`] splits the point set into leaves of bounded occupancy.
//! Leaves are the unit of independent work for local cluster seeding, and
//! [`SpatialIndex::range_query`] is the primitive behind every neighbourhood
//! computed by [`crate::neighborhood`].
//!
//! Two implementations ship with the crate:
//!
//! - [`KdTree`] for sources that expose coordinates through
//!   [`DataSource::point`];
//! - [`ExhaustiveIndex`] for distance-only sources, which scans every point on
//!   each query.

mod exhaustive;
mod kdtree;

use std::num::NonZeroUsize;

use crate::{datasource::DataSource, error::DataSourceError};

pub use self::{exhaustive::ExhaustiveIndex, kdtree::KdTree};

/// Default maximum number of points held by one leaf.
pub const DEFAULT_LEAF_SIZE: usize = 10;

/// A bounded group of point indices produced by a [`SpatialIndex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf {
    id: usize,
    members: Vec<usize>,
}

impl Leaf {
    /// Creates leaf `id` owning `members`.
    ///
    /// Custom [`SpatialIndex`] implementations use this to publish their
    /// leaves. `members` is sorted here, so callers may pass indices in any
    /// order.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::Leaf;
    ///
    /// let leaf = Leaf::new(1, vec![4, 2, 3]);
    /// assert_eq!(leaf.id(), 1);
    /// assert_eq!(leaf.members(), [2, 3, 4]);
    /// ```
    #[must_use]
    pub fn new(id: usize, mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        Self { id, members }
    }

    /// Position of the leaf in [`SpatialIndex::leaves`].
    #[must_use]
    #[rustfmt::skip]
    pub fn id(&self) -> usize { self.id }

    /// Point indices owned by this leaf.
    #[must_use]
    #[rustfmt::skip]
    pub fn members(&self) -> &[usize] { &self.members }
}

/// Locality service consumed by the local clustering phase.
///
/// Every point belongs to exactly one leaf. Range queries are inclusive
/// (`distance <= radius`), always contain the query point, and return indices
/// sorted ascending.
pub trait SpatialIndex {
    /// Returns the leaves in a stable order.
    fn leaves(&self) -> &[Leaf];

    /// Returns every index within `radius` of `point`.
    ///
    /// # Errors
    /// Returns any [`DataSourceError`] raised while reading coordinates or
    /// distances from `source`.
    fn range_query<D: DataSource + ?Sized>(
        &self,
        source: &D,
        point: usize,
        radius: f32,
    ) -> Result<Vec<usize>, DataSourceError>;
}

/// Selects the [`SpatialIndex`] implementation built for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexKind {
    /// Use a [`KdTree`] when the source exposes coordinates, otherwise fall
    /// back to an [`ExhaustiveIndex`].
    #[default]
    Auto,
    /// Always build a [`KdTree`]; fails for distance-only sources.
    KdTree,
    /// Always build an [`ExhaustiveIndex`].
    Exhaustive,
}

/// The index built by [`build_index`].
#[derive(Clone, Debug)]
pub(crate) enum BuiltIndex {
    KdTree(KdTree),
    Exhaustive(ExhaustiveIndex),
}

impl SpatialIndex for BuiltIndex {
    fn leaves(&self) -> &[Leaf] {
        match self {
            Self::KdTree(tree) => tree.leaves(),
            Self::Exhaustive(index) => index.leaves(),
        }
    }

    fn range_query<D: DataSource + ?Sized>(
        &self,
        source: &D,
        point: usize,
        radius: f32,
    ) -> Result<Vec<usize>, DataSourceError> {
        match self {
            Self::KdTree(tree) => tree.range_query(source, point, radius),
            Self::Exhaustive(index) => index.range_query(source, point, radius),
        }
    }
}

pub(crate) fn build_index<D: DataSource + ?Sized>(
    source: &D,
    kind: IndexKind,
    leaf_size: NonZeroUsize,
) -> Result<BuiltIndex, DataSourceError> {
    let use_tree = match kind {
        IndexKind::Auto => source.is_empty() || source.point(0).is_some(),
        IndexKind::KdTree => true,
        IndexKind::Exhaustive => false,
    };
    if use_tree {
        KdTree::build(source, leaf_size).map(BuiltIndex::KdTree)
    } else {
        Ok(BuiltIndex::Exhaustive(ExhaustiveIndex::new(
            source.len(),
            leaf_size,
        )))
    }
}
