//! Data source abstractions for the C-DBSCAN core runtime.

use crate::error::DataSourceError;

/// Abstraction over a fixed point set that can yield pairwise distances.
///
/// Implementations supply the distance function used for every neighbourhood
/// query. Distances must be symmetric and non-negative. Sources that can also
/// expose raw coordinates through [`DataSource::point`] unlock the k-d tree
/// index; the others are served by an exhaustive scan.
///
/// # Examples
/// ```
/// use cdbscan_core::{DataSource, DataSourceError};
///
/// struct Line(Vec<f32>);
///
/// impl DataSource for Line {
///     fn len(&self) -> usize { self.0.len() }
///     fn name(&self) -> &str { "line" }
///     fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
///         let a = self.0.get(i).ok_or(DataSourceError::OutOfBounds { index: i })?;
///         let b = self.0.get(j).ok_or(DataSourceError::OutOfBounds { index: j })?;
///         Ok((a - b).abs())
///     }
/// }
///
/// let src = Line(vec![1.0, 2.0, 4.0]);
/// assert_eq!(src.len(), 3);
/// assert_eq!(src.name(), "line");
/// assert_eq!(src.distance(0, 2)?, 3.0);
/// assert!(src.point(0).is_none());
///
/// let batched = src.batch_distances(0, &[1, 2])?;
/// assert_eq!(batched, [1.0, 3.0]);
/// # Ok::<(), DataSourceError>(())
/// ```
pub trait DataSource {
    /// Returns number of items in the source.
    fn len(&self) -> usize;

    /// Returns whether the source contains no items.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{DataSource, DataSourceError};
    /// struct Empty;
    /// impl DataSource for Empty {
    ///     fn len(&self) -> usize { 0 }
    ///     fn name(&self) -> &str { "empty" }
    ///     fn distance(&self, _: usize, _: usize) -> Result<f32, DataSourceError> { Ok(0.0) }
    /// }
    /// let src = Empty;
    /// assert!(src.is_empty());
    /// ```
    #[must_use]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a human-readable name.
    fn name(&self) -> &str;

    /// Computes the distance between two items.
    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError>;

    /// Returns the coordinates of item `index` when the source is vector backed.
    ///
    /// The default implementation reports that coordinates are unavailable.
    /// Sources returning coordinates must use a metric that is never smaller
    /// than the absolute difference along any single axis (Euclidean,
    /// Manhattan and Chebyshev all qualify) so spatial pruning stays exact.
    fn point(&self, index: usize) -> Option<&[f32]> {
        let _ = index;
        None
    }

    /// Computes the distances from `query` to every entry in `candidates`.
    ///
    /// The default implementation calls [`DataSource::distance`] repeatedly
    /// and collects the results.
    ///
    /// # Errors
    /// Returns any [`DataSourceError`] surfaced by [`DataSource::distance`].
    fn batch_distances(
        &self,
        query: usize,
        candidates: &[usize],
    ) -> Result<Vec<f32>, DataSourceError> {
        candidates
            .iter()
            .map(|&candidate| self.distance(query, candidate))
            .collect()
    }
}

/// Calls [`DataSource::distance`] and rejects negative or non-finite results.
pub(crate) fn checked_distance<D: DataSource + ?Sized>(
    source: &D,
    left: usize,
    right: usize,
) -> Result<f32, DataSourceError> {
    let value = source.distance(left, right)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DataSourceError::InvalidDistance { left, right, value })
    }
}
