//! Brute-force index for sources that only provide distances.

use std::num::NonZeroUsize;

use crate::{datasource::DataSource, error::DataSourceError};

use super::{Leaf, SpatialIndex};

/// Chunks indices into consecutive leaves and answers range queries by
/// scanning every point.
#[derive(Clone, Debug)]
pub struct ExhaustiveIndex {
    items: usize,
    leaves: Vec<Leaf>,
}

impl ExhaustiveIndex {
    /// Partitions `0..items` into runs of at most `leaf_size` indices.
    ///
    /// # Examples
    /// ```
    /// use std::num::NonZeroUsize;
    /// use cdbscan_core::{ExhaustiveIndex, SpatialIndex};
    ///
    /// let leaf_size = NonZeroUsize::new(2).expect("non-zero");
    /// let index = ExhaustiveIndex::new(5, leaf_size);
    /// let sizes: Vec<_> = index.leaves().iter().map(|leaf| leaf.members().len()).collect();
    /// assert_eq!(sizes, [2, 2, 1]);
    /// ```
    #[must_use]
    pub fn new(items: usize, leaf_size: NonZeroUsize) -> Self {
        let all: Vec<usize> = (0..items).collect();
        let leaves = all
            .chunks(leaf_size.get())
            .enumerate()
            .map(|(id, chunk)| Leaf::new(id, chunk.to_vec()))
            .collect();
        Self { items, leaves }
    }
}

impl SpatialIndex for ExhaustiveIndex {
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
        let candidates: Vec<usize> = (0..self.items).collect();
        let distances = source.batch_distances(point, &candidates)?;

        let mut within = Vec::new();
        for (candidate, value) in candidates.into_iter().zip(distances) {
            if !value.is_finite() || value < 0.0 {
                return Err(DataSourceError::InvalidDistance {
                    left: point,
                    right: candidate,
                    value,
                });
            }
            if candidate == point || value <= radius {
                within.push(candidate);
            }
        }
        Ok(within)
    }
}
