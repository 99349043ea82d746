//! Builder utilities for configuring C-DBSCAN runs.
//!
//! Exposes the execution strategy selection surface and builder validation used before constructing [`Cdbscan`] instances.

use std::num::NonZeroUsize;

use crate::{
    Result,
    cdbscan::Cdbscan,
    error::CdbscanError,
    spatial::{DEFAULT_LEAF_SIZE, IndexKind},
};

/// Indicates how [`Cdbscan`] schedules the local clustering phase when
/// [`Cdbscan::run`] is invoked.
///
/// `Auto` seeds leaves on the rayon pool when the `parallel` feature is
/// compiled in and sequentially otherwise, so it never fails. `Parallel`
/// requires the feature and reports [`CdbscanError::BackendUnavailable`]
/// without it. The merge phase is always sequential.
///
/// # Examples
/// ```
/// use cdbscan_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Allow the library to select an appropriate schedule automatically.
    Auto,
    /// Seed every leaf on the calling thread.
    Sequential,
    /// Seed leaves concurrently on the rayon pool.
    Parallel,
}

/// Configures and constructs [`Cdbscan`] instances.
///
/// # Examples
/// ```
/// use cdbscan_core::{CdbscanBuilder, ExecutionStrategy};
///
/// let cdbscan = CdbscanBuilder::new()
///     .with_epsilon(0.5)
///     .with_min_points(3)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(cdbscan.epsilon(), 0.5);
/// assert_eq!(cdbscan.min_points().get(), 3);
/// assert_eq!(cdbscan.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone)]
pub struct CdbscanBuilder {
    epsilon: f32,
    min_points: usize,
    leaf_size: usize,
    index_kind: IndexKind,
    execution_strategy: ExecutionStrategy,
}

impl Default for CdbscanBuilder {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            min_points: 5,
            leaf_size: DEFAULT_LEAF_SIZE,
            index_kind: IndexKind::Auto,
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

impl CdbscanBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{CdbscanBuilder, ExecutionStrategy, IndexKind};
    ///
    /// let builder = CdbscanBuilder::new();
    /// assert_eq!(builder.epsilon(), 0.01);
    /// assert_eq!(builder.min_points(), 5);
    /// assert_eq!(builder.leaf_size(), 10);
    /// assert_eq!(builder.index_kind(), IndexKind::Auto);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the neighbourhood radius.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::CdbscanBuilder;
    ///
    /// let builder = CdbscanBuilder::new().with_epsilon(2.5);
    /// assert_eq!(builder.epsilon(), 2.5);
    /// ```
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Returns the configured neighbourhood radius.
    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Overrides the density threshold. The threshold is inclusive and counts
    /// the seed point itself.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::CdbscanBuilder;
    ///
    /// let builder = CdbscanBuilder::new().with_min_points(2);
    /// assert_eq!(builder.min_points(), 2);
    /// ```
    #[must_use]
    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    /// Returns the configured density threshold.
    #[must_use]
    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Overrides the maximum number of points per spatial index leaf.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::CdbscanBuilder;
    ///
    /// let builder = CdbscanBuilder::new().with_leaf_size(32);
    /// assert_eq!(builder.leaf_size(), 32);
    /// ```
    #[must_use]
    pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
        self.leaf_size = leaf_size;
        self
    }

    /// Returns the configured leaf occupancy bound.
    #[must_use]
    pub fn leaf_size(&self) -> usize {
        self.leaf_size
    }

    /// Selects the spatial index built by [`Cdbscan::run`].
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{CdbscanBuilder, IndexKind};
    ///
    /// let builder = CdbscanBuilder::new().with_index_kind(IndexKind::Exhaustive);
    /// assert_eq!(builder.index_kind(), IndexKind::Exhaustive);
    /// ```
    #[must_use]
    pub fn with_index_kind(mut self, kind: IndexKind) -> Self {
        self.index_kind = kind;
        self
    }

    /// Returns the configured spatial index kind.
    #[must_use]
    pub fn index_kind(&self) -> IndexKind {
        self.index_kind
    }

    /// Sets the execution strategy to use when running the algorithm.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{CdbscanBuilder, ExecutionStrategy};
    ///
    /// let builder = CdbscanBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy {
        self.execution_strategy
    }

    /// Validates the configuration and constructs a [`Cdbscan`] instance.
    ///
    /// # Errors
    /// Returns [`CdbscanError::InvalidEpsilon`] unless `epsilon` is finite and
    /// positive, [`CdbscanError::InvalidMinPoints`] for a zero threshold, and
    /// [`CdbscanError::InvalidLeafSize`] for a zero leaf size.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{CdbscanBuilder, CdbscanError};
    ///
    /// let cdbscan = CdbscanBuilder::new().build().expect("configuration is valid");
    /// assert_eq!(cdbscan.min_points().get(), 5);
    ///
    /// let err = CdbscanBuilder::new().with_epsilon(0.0).build().expect_err("zero radius");
    /// assert!(matches!(err, CdbscanError::InvalidEpsilon { .. }));
    /// ```
    pub fn build(self) -> Result<Cdbscan> {
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(CdbscanError::InvalidEpsilon { got: self.epsilon });
        }
        let min_points = NonZeroUsize::new(self.min_points).ok_or(
            CdbscanError::InvalidMinPoints {
                got: self.min_points,
            },
        )?;
        let leaf_size = NonZeroUsize::new(self.leaf_size).ok_or(CdbscanError::InvalidLeafSize {
            got: self.leaf_size,
        })?;

        Ok(Cdbscan::new(
            self.epsilon,
            min_points,
            leaf_size,
            self.index_kind,
            self.execution_strategy,
        ))
    }
}
