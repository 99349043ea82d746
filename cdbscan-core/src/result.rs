//! Result types for clustering operations.
//!
//! Provides structures to represent clustering results including cluster
//! assignments, noise, run statistics, and validation of cluster identifier
//! ordering.

use thiserror::Error;

/// Counters describing how a [`crate::Cdbscan::run`] invocation proceeded.
///
/// # Examples
/// ```
/// use cdbscan_core::RunStats;
///
/// let stats = RunStats::default();
/// assert_eq!(stats.merge_passes, 0);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Leaves produced by the spatial index.
    pub leaves: usize,
    /// Local clusters left after the local phase.
    pub local_clusters: usize,
    /// Alpha clusters seeded from must-link classes.
    pub alpha_clusters: usize,
    /// Growth passes performed, including the final pass without merges.
    pub merge_passes: usize,
    /// Local clusters absorbed into alpha clusters.
    pub absorbed_merges: usize,
    /// Merges rejected because a cannot-link pair spanned both clusters.
    pub vetoed_merges: usize,
}

/// Represents the output of a [`crate::Cdbscan::run`] invocation.
///
/// Each point is either assigned to a cluster or left as noise. Cluster
/// identifiers are contiguous from zero and numbered by the first point index
/// that reaches them.
///
/// # Examples
/// ```
/// use cdbscan_core::{ClusterId, ClusteringResult};
///
/// let result = ClusteringResult::try_from_assignments(vec![
///     Some(ClusterId::new(0)),
///     None,
///     Some(ClusterId::new(1)),
///     Some(ClusterId::new(0)),
/// ])
/// .expect("identifiers appear in order");
/// assert_eq!(result.cluster_count(), 2);
/// assert_eq!(result.noise_count(), 1);
/// assert_eq!(result.labels(), [0, -1, 1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusteringResult {
    assignments: Vec<Option<ClusterId>>,
    cluster_count: usize,
    stats: RunStats,
}

/// Error returned when cluster identifiers are not numbered in order of first
/// appearance starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NonContiguousClusterIds {
    /// The first assigned point does not carry cluster `0`.
    #[error("cluster identifiers must start at 0")]
    MissingZero,
    /// An identifier appears before all smaller identifiers have appeared.
    #[error("cluster identifiers must be contiguous in order of first appearance")]
    Gap,
    /// The identifiers cannot be reported as signed labels.
    #[error("cluster identifiers exceed the signed label range")]
    Overflow,
}

impl ClusteringResult {
    /// Attempts to build a result from per-point assignments, `None` marking
    /// noise.
    ///
    /// An empty `assignments` vector, or one holding only noise, yields
    /// `cluster_count == 0`.
    ///
    /// # Errors
    /// Returns [`NonContiguousClusterIds::MissingZero`] when the first assigned
    /// point is not in cluster `0`, [`NonContiguousClusterIds::Gap`] when an
    /// identifier appears before its predecessor, and
    /// [`NonContiguousClusterIds::Overflow`] when an identifier does not fit in
    /// an `i64` label.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{ClusterId, ClusteringResult, NonContiguousClusterIds};
    ///
    /// let err = ClusteringResult::try_from_assignments(vec![
    ///     Some(ClusterId::new(0)),
    ///     Some(ClusterId::new(2)),
    /// ])
    /// .expect_err("cluster 1 is skipped");
    /// assert_eq!(err, NonContiguousClusterIds::Gap);
    /// ```
    pub fn try_from_assignments(
        assignments: Vec<Option<ClusterId>>,
    ) -> Result<Self, NonContiguousClusterIds> {
        let mut next = 0_u64;
        for id in assignments.iter().flatten() {
            let value = id.get();
            if value > i64::MAX as u64 {
                return Err(NonContiguousClusterIds::Overflow);
            }
            if value == next {
                next += 1;
            } else if value > next {
                return Err(if next == 0 {
                    NonContiguousClusterIds::MissingZero
                } else {
                    NonContiguousClusterIds::Gap
                });
            }
        }

        Ok(Self {
            assignments,
            cluster_count: next as usize,
            stats: RunStats::default(),
        })
    }

    /// Builds a result from assignments already numbered in first-appearance
    /// order.
    pub(crate) fn from_ordered(
        assignments: Vec<Option<ClusterId>>,
        cluster_count: usize,
        stats: RunStats,
    ) -> Self {
        debug_assert_eq!(
            Self::try_from_assignments(assignments.clone()).map(|result| result.cluster_count),
            Ok(cluster_count),
            "assignments must be numbered in first-appearance order"
        );
        Self {
            assignments,
            cluster_count,
            stats,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::from_ordered(Vec::new(), 0, RunStats::default())
    }

    /// Returns the assignments in point order; `None` marks noise.
    #[must_use]
    #[rustfmt::skip]
    pub fn assignments(&self) -> &[Option<ClusterId>] { &self.assignments }

    /// Returns one label per point: `-1` for noise, otherwise the cluster id.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{ClusterId, ClusteringResult};
    ///
    /// let result = ClusteringResult::try_from_assignments(vec![None, Some(ClusterId::new(0))])
    ///     .expect("valid assignments");
    /// assert_eq!(result.labels(), [-1, 0]);
    /// ```
    #[must_use]
    pub fn labels(&self) -> Vec<i64> {
        self.assignments
            .iter()
            .map(|assignment| assignment.map_or(-1, |id| id.get() as i64))
            .collect()
    }

    /// Counts how many distinct clusters exist within the assignments.
    #[must_use]
    #[rustfmt::skip]
    pub fn cluster_count(&self) -> usize { self.cluster_count }

    /// Counts the points labelled as noise.
    #[must_use]
    pub fn noise_count(&self) -> usize {
        self.assignments.iter().filter(|id| id.is_none()).count()
    }

    /// Returns `true` when `index` is a noise point; `false` for clustered or
    /// out-of-range indices.
    #[must_use]
    pub fn is_noise(&self, index: usize) -> bool {
        matches!(self.assignments.get(index), Some(None))
    }

    /// Returns the point indices assigned to `cluster`, ascending.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{ClusterId, ClusteringResult};
    ///
    /// let result = ClusteringResult::try_from_assignments(vec![
    ///     Some(ClusterId::new(0)),
    ///     Some(ClusterId::new(1)),
    ///     Some(ClusterId::new(0)),
    /// ])
    /// .expect("valid assignments");
    /// assert_eq!(result.members(ClusterId::new(0)), [0, 2]);
    /// assert!(result.members(ClusterId::new(5)).is_empty());
    /// ```
    #[must_use]
    pub fn members(&self, cluster: ClusterId) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, id)| **id == Some(cluster))
            .map(|(index, _)| index)
            .collect()
    }

    /// Returns the counters recorded while producing this result.
    #[must_use]
    #[rustfmt::skip]
    pub fn stats(&self) -> &RunStats { &self.stats }

    /// Number of points covered by the result.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.assignments.len() }

    /// Returns `true` when the result covers no points.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.assignments.is_empty() }
}

/// Identifier assigned to a cluster.
///
/// # Examples
/// ```
/// use cdbscan_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn get(self) -> u64 { self.0 }
}
