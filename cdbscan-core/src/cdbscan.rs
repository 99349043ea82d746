//! Core clustering orchestration for the C-DBSCAN library.
//!
//! Provides the [`Cdbscan`] runtime entry point, the [`cluster`] convenience
//! function, and helpers for selecting the local-phase schedule and wrapping
//! data-source failures.

use std::num::NonZeroUsize;

use tracing::{info, instrument, warn};

use crate::{
    Result,
    builder::{CdbscanBuilder, ExecutionStrategy},
    constraints::{ConstraintGraph, Constraints},
    datasource::DataSource,
    dataset::DenseSource,
    error::{CdbscanError, DataSourceError},
    local::LocalClusterBuilder,
    merge::AlphaMerger,
    neighborhood::NeighborhoodOracle,
    result::{ClusteringResult, RunStats},
    spatial::{IndexKind, SpatialIndex, build_index},
    telemetry,
};

/// Entry point for running constrained density-based clustering.
///
/// # Examples
/// ```
/// use cdbscan_core::{CdbscanBuilder, Constraints, DataSource, DataSourceError};
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
/// let cdbscan = CdbscanBuilder::new()
///     .with_epsilon(1.0)
///     .with_min_points(2)
///     .build()?;
/// let source = Line(vec![0.0, 0.5, 1.0, 9.0, 9.5, 30.0]);
/// let result = cdbscan.run(&source, &Constraints::new())?;
/// assert_eq!(result.labels(), [0, 0, 0, 1, 1, -1]);
///
/// let split = Constraints::new().with_cannot_link(0, 2);
/// let result = cdbscan.run(&source, &split)?;
/// assert_ne!(result.labels()[0], result.labels()[2]);
/// # Ok::<(), cdbscan_core::CdbscanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cdbscan {
    epsilon: f32,
    min_points: NonZeroUsize,
    leaf_size: NonZeroUsize,
    index_kind: IndexKind,
    execution_strategy: ExecutionStrategy,
}

impl Cdbscan {
    pub(crate) fn new(
        epsilon: f32,
        min_points: NonZeroUsize,
        leaf_size: NonZeroUsize,
        index_kind: IndexKind,
        execution_strategy: ExecutionStrategy,
    ) -> Self {
        Self {
            epsilon,
            min_points,
            leaf_size,
            index_kind,
            execution_strategy,
        }
    }

    /// Returns the neighbourhood radius configured for this instance.
    #[must_use]
    #[rustfmt::skip]
    pub fn epsilon(&self) -> f32 { self.epsilon }

    /// Returns the density threshold configured for this instance.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_points(&self) -> NonZeroUsize { self.min_points }

    /// Returns the leaf occupancy bound used when building an index.
    #[must_use]
    #[rustfmt::skip]
    pub fn leaf_size(&self) -> NonZeroUsize { self.leaf_size }

    /// Returns the spatial index kind built by [`Self::run`].
    #[must_use]
    #[rustfmt::skip]
    pub fn index_kind(&self) -> IndexKind { self.index_kind }

    /// Returns the execution strategy that will be used when running.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Clusters `source` under `constraints`, building the configured spatial
    /// index first.
    ///
    /// An empty source yields an empty result rather than an error.
    ///
    /// # Errors
    /// Returns [`CdbscanError::BackendUnavailable`] when the configured
    /// strategy is not compiled in, [`CdbscanError::InvalidConstraint`] for a
    /// malformed pair, [`CdbscanError::ConstraintConflict`] when a cannot-link
    /// pair lies inside a must-link class, [`CdbscanError::DataSource`] when
    /// the source fails, and [`CdbscanError::MergeDidNotConverge`] if the merge
    /// phase exceeds its pass budget. Constraint errors are reported before
    /// any neighbourhood is computed.
    pub fn run<D: DataSource + Sync + ?Sized>(
        &self,
        source: &D,
        constraints: &Constraints,
    ) -> Result<ClusteringResult> {
        let items = source.len();
        self.run_with_len(source, constraints, items)
    }

    /// Clusters `source` under `constraints` using a caller-supplied index.
    ///
    /// Every point of `source` must belong to exactly one leaf of `index`.
    ///
    /// # Errors
    /// Returns the same errors as [`Self::run`].
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{CdbscanBuilder, Constraints, DenseSource, ExhaustiveIndex};
    ///
    /// let rows = vec![vec![0.0], vec![0.5], vec![5.0], vec![5.5]];
    /// let source = DenseSource::try_new("pairs", &rows)?;
    /// let index = ExhaustiveIndex::new(rows.len(), std::num::NonZeroUsize::MIN);
    /// let cdbscan = CdbscanBuilder::new().with_epsilon(1.0).with_min_points(2).build()?;
    /// let result = cdbscan.run_with_index(&source, &index, &Constraints::new())?;
    /// assert_eq!(result.labels(), [0, 0, 1, 1]);
    /// assert_eq!(result.stats().leaves, 4);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[instrument(
        name = "cdbscan.run",
        err,
        skip(self, source, index, constraints),
        fields(
            data_source = %source.name(),
            items = source.len(),
            epsilon = self.epsilon,
            min_points = %self.min_points,
            strategy = ?self.execution_strategy
        ),
    )]
    pub fn run_with_index<D, I>(
        &self,
        source: &D,
        index: &I,
        constraints: &Constraints,
    ) -> Result<ClusteringResult>
    where
        D: DataSource + Sync + ?Sized,
        I: SpatialIndex + Sync,
    {
        let parallel = self.parallel_seeding()?;
        let graph = prepare_constraints(source.len(), constraints)?;
        if source.is_empty() {
            warn!(
                data_source = source.name(),
                "data source is empty, returning empty result"
            );
            return Ok(ClusteringResult::empty());
        }
        self.cluster_indexed(source, index, &graph, parallel)
    }

    #[instrument(
        name = "cdbscan.run",
        err,
        skip(self, source, constraints),
        fields(
            data_source = %source.name(),
            items = items,
            epsilon = self.epsilon,
            min_points = %self.min_points,
            strategy = ?self.execution_strategy
        ),
    )]
    fn run_with_len<D: DataSource + Sync + ?Sized>(
        &self,
        source: &D,
        constraints: &Constraints,
        items: usize,
    ) -> Result<ClusteringResult> {
        let parallel = self.parallel_seeding()?;
        let graph = prepare_constraints(items, constraints)?;
        if items == 0 {
            warn!(
                data_source = source.name(),
                "data source is empty, returning empty result"
            );
            return Ok(ClusteringResult::empty());
        }

        let index = self.wrap_datasource_error(
            source,
            build_index(source, self.index_kind, self.leaf_size),
        )?;
        self.cluster_indexed(source, &index, &graph, parallel)
    }

    fn cluster_indexed<D, I>(
        &self,
        source: &D,
        index: &I,
        graph: &ConstraintGraph,
        parallel: bool,
    ) -> Result<ClusteringResult>
    where
        D: DataSource + Sync + ?Sized,
        I: SpatialIndex + Sync,
    {
        let oracle = NeighborhoodOracle::new(source, index);
        let builder = LocalClusterBuilder::new(oracle, graph, self.epsilon, self.min_points);
        let partition =
            self.wrap_datasource_error(source, builder.build(index.leaves(), parallel))?;
        let local_clusters = partition.clusters.len();

        let outcome = AlphaMerger::new(source, graph).merge(partition)?;
        let stats = RunStats {
            leaves: index.leaves().len(),
            local_clusters,
            alpha_clusters: outcome.alpha_clusters,
            merge_passes: outcome.passes,
            absorbed_merges: outcome.absorbed,
            vetoed_merges: outcome.vetoed,
        };
        let result =
            ClusteringResult::from_ordered(outcome.assignments, outcome.cluster_count, stats);

        telemetry::record_noise_points(result.noise_count());
        info!(
            clusters = result.cluster_count(),
            noise = result.noise_count(),
            passes = stats.merge_passes,
            "clustering completed"
        );
        Ok(result)
    }

    fn parallel_seeding(&self) -> Result<bool> {
        match self.execution_strategy {
            ExecutionStrategy::Auto => Ok(cfg!(feature = "parallel")),
            ExecutionStrategy::Sequential => Ok(false),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Parallel => Ok(true),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => Err(CdbscanError::BackendUnavailable {
                requested: ExecutionStrategy::Parallel,
            }),
        }
    }

    fn wrap_datasource_error<D: DataSource + ?Sized, T>(
        &self,
        source: &D,
        result: core::result::Result<T, DataSourceError>,
    ) -> Result<T> {
        result.map_err(|error| CdbscanError::data_source(source.name(), error))
    }
}

/// Validates constraints and rejects must-link/cannot-link contradictions.
fn prepare_constraints(items: usize, constraints: &Constraints) -> Result<ConstraintGraph> {
    let graph = ConstraintGraph::new(items, constraints)?;
    if let Some((left, right)) = graph.first_conflict() {
        return Err(CdbscanError::ConstraintConflict { left, right });
    }
    Ok(graph)
}

/// Clusters coordinate rows with Euclidean distance and returns one label per
/// row: `-1` for noise, otherwise a cluster id numbered by first appearance.
///
/// # Errors
/// Returns [`CdbscanError::InvalidEpsilon`] or
/// [`CdbscanError::InvalidMinPoints`] for rejected parameters,
/// [`CdbscanError::DataSource`] when rows are empty, ragged or non-finite,
/// and otherwise the errors of [`Cdbscan::run`].
///
/// # Examples
/// ```
/// let points = vec![
///     vec![1.0, 1.0], vec![52.0, 3.0], vec![1.0, 2.0],
///     vec![2.0, 3.0], vec![50.0, 4.0], vec![51.0, 2.0],
/// ];
/// let labels = cdbscan_core::cluster(&points, 5.0, 2, &[], &[])?;
/// assert_eq!(labels, [0, 1, 0, 0, 1, 1]);
///
/// let joined = cdbscan_core::cluster(&points, 5.0, 2, &[(0, 1)], &[])?;
/// assert!(joined.iter().all(|&label| label == 0));
/// # Ok::<(), cdbscan_core::CdbscanError>(())
/// ```
pub fn cluster(
    dataset: &[Vec<f32>],
    epsilon: f32,
    min_points: usize,
    must_link: &[(usize, usize)],
    cannot_link: &[(usize, usize)],
) -> Result<Vec<i64>> {
    let cdbscan = CdbscanBuilder::new()
        .with_epsilon(epsilon)
        .with_min_points(min_points)
        .build()?;
    let source = DenseSource::try_new("dataset", dataset)
        .map_err(|error| CdbscanError::data_source("dataset", error))?;
    let constraints = Constraints::from_pairs(
        must_link.iter().copied(),
        cannot_link.iter().copied(),
    );
    Ok(cdbscan.run(&source, &constraints)?.labels())
}
