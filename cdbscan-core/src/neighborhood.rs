//! Radius neighbourhoods and their density-reachable closure.
//!
//! [`NeighborhoodOracle::density_reachable`] grows a set from a seed by
//! repeatedly unioning the neighbourhood of every member until nothing new is
//! added. The closure is computed with an explicit FIFO worklist and a
//! membership marker indexed by point id, so it never recurses and each point
//! is expanded at most once.

use std::collections::VecDeque;

use crate::{datasource::DataSource, error::DataSourceError, spatial::SpatialIndex};

/// Answers neighbourhood queries over one source through one index.
///
/// The oracle holds no mutable state: repeated calls with the same arguments
/// return identical results, and concurrent use from several threads is safe
/// whenever the source and index are `Sync`.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use cdbscan_core::{DenseSource, KdTree, NeighborhoodOracle};
///
/// let rows = vec![vec![0.0], vec![1.0], vec![2.0], vec![10.0]];
/// let source = DenseSource::try_new("chain", &rows)?;
/// let index = KdTree::build(&source, NonZeroUsize::new(2).expect("non-zero"))?;
/// let oracle = NeighborhoodOracle::new(&source, &index);
///
/// assert_eq!(oracle.neighborhood(0, 1.0)?, [0, 1]);
/// assert_eq!(oracle.density_reachable(0, 1.0)?, [0, 1, 2]);
/// assert_eq!(oracle.density_reachable(3, 1.0)?, [3]);
/// # Ok::<(), cdbscan_core::DataSourceError>(())
/// ```
#[derive(Debug)]
pub struct NeighborhoodOracle<'a, D: ?Sized, I> {
    source: &'a D,
    index: &'a I,
}

impl<D: ?Sized, I> Clone for NeighborhoodOracle<'_, D, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized, I> Copy for NeighborhoodOracle<'_, D, I> {}

impl<'a, D, I> NeighborhoodOracle<'a, D, I>
where
    D: DataSource + ?Sized,
    I: SpatialIndex,
{
    /// Creates an oracle answering queries against `source` through `index`.
    #[must_use]
    pub fn new(source: &'a D, index: &'a I) -> Self {
        Self { source, index }
    }

    /// Number of points addressable by this oracle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Returns `true` when the underlying source holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Returns every point within `radius` of `point`, including `point`,
    /// sorted ascending.
    ///
    /// # Errors
    /// Propagates index and distance failures from the source.
    pub fn neighborhood(&self, point: usize, radius: f32) -> Result<Vec<usize>, DataSourceError> {
        self.index.range_query(self.source, point, radius)
    }

    /// Returns the density-reachable set of `point` at `epsilon`, sorted
    /// ascending.
    ///
    /// The result always contains `point` and is the minimal set closed under
    /// taking `epsilon`-neighbourhoods, so it does not depend on the order in
    /// which members are expanded.
    ///
    /// # Errors
    /// Returns [`DataSourceError::OutOfBounds`] when `point` is not a valid
    /// index, and propagates index and distance failures from the source.
    pub fn density_reachable(
        &self,
        point: usize,
        epsilon: f32,
    ) -> Result<Vec<usize>, DataSourceError> {
        let items = self.source.len();
        if point >= items {
            return Err(DataSourceError::OutOfBounds { index: point });
        }

        let mut member = vec![false; items];
        let mut reachable = vec![point];
        let mut worklist = VecDeque::from([point]);
        member[point] = true;

        while let Some(current) = worklist.pop_front() {
            for neighbour in self.neighborhood(current, epsilon)? {
                let Some(slot) = member.get_mut(neighbour) else {
                    return Err(DataSourceError::OutOfBounds { index: neighbour });
                };
                if !*slot {
                    *slot = true;
                    reachable.push(neighbour);
                    worklist.push_back(neighbour);
                }
            }
        }

        reachable.sort_unstable();
        Ok(reachable)
    }
}
