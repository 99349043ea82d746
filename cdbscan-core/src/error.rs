//! Error types for the C-DBSCAN core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::{builder::ExecutionStrategy, constraints::ConstraintKind};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced by [`crate::DataSource`] operations.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DataSourceError {
    /// Requested index was outside the source's bounds.
    #[error("index {index} is out of bounds")]
    OutOfBounds {
        /// The requested row that exceeded the source bounds.
        index: usize,
    },
    /// Compared vectors had different dimensions.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand vector.
        left: usize,
        /// Dimensionality of the right-hand vector.
        right: usize,
    },
    /// Data source rows must have positive dimension.
    #[error("data source vectors must have positive dimension")]
    ZeroDimension,
    /// A coordinate was NaN or infinite.
    #[error("row {row} has a non-finite value at dimension {dimension}: {value}")]
    NonFiniteCoordinate {
        /// Row holding the offending value.
        row: usize,
        /// Dimension of the offending value within the row.
        dimension: usize,
        /// The rejected value.
        value: f32,
    },
    /// A coordinate-based index was requested for a source without coordinates.
    #[error("item {index} does not expose coordinates")]
    CoordinatesUnavailable {
        /// First item that could not provide coordinates.
        index: usize,
    },
    /// The distance function produced a negative or non-finite value.
    #[error("distance between {left} and {right} is invalid: {value}")]
    InvalidDistance {
        /// Left item of the pair.
        left: usize,
        /// Right item of the pair.
        right: usize,
        /// The rejected distance.
        value: f32,
    },
}

define_error_codes! {
    /// Stable codes describing [`DataSourceError`] variants.
    enum DataSourceErrorCode for DataSourceError {
        /// Requested index was outside the source's bounds.
        OutOfBounds => OutOfBounds { .. } => "DATA_SOURCE_OUT_OF_BOUNDS",
        /// Compared vectors had different dimensions.
        DimensionMismatch => DimensionMismatch { .. } => "DATA_SOURCE_DIMENSION_MISMATCH",
        /// Data source rows must have positive dimension.
        ZeroDimension => ZeroDimension => "DATA_SOURCE_ZERO_DIMENSION",
        /// A coordinate was NaN or infinite.
        NonFiniteCoordinate => NonFiniteCoordinate { .. } => "DATA_SOURCE_NON_FINITE_COORDINATE",
        /// A coordinate-based index was requested for a source without coordinates.
        CoordinatesUnavailable => CoordinatesUnavailable { .. } => "DATA_SOURCE_COORDINATES_UNAVAILABLE",
        /// The distance function produced a negative or non-finite value.
        InvalidDistance => InvalidDistance { .. } => "DATA_SOURCE_INVALID_DISTANCE",
    }
}

/// Describes why a constraint pair was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConstraintDefect {
    /// One endpoint is not a valid point index.
    OutOfRange {
        /// Number of points in the dataset.
        items: usize,
    },
    /// Both endpoints name the same point.
    SelfLink,
}

impl fmt::Display for ConstraintDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { items } => write!(f, "references an index outside 0..{items}"),
            Self::SelfLink => f.write_str("links a point to itself"),
        }
    }
}

/// Error type produced when constructing or running [`crate::Cdbscan`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CdbscanError {
    /// Neighbourhood radius must be finite and strictly positive.
    #[error("epsilon must be finite and greater than zero (got {got})")]
    InvalidEpsilon {
        /// The rejected radius.
        got: f32,
    },
    /// The density threshold must be at least one.
    #[error("min_points must be at least 1 (got {got})")]
    InvalidMinPoints {
        /// The rejected threshold.
        got: usize,
    },
    /// Spatial index leaves must hold at least one point.
    #[error("leaf_size must be at least 1 (got {got})")]
    InvalidLeafSize {
        /// The rejected leaf occupancy.
        got: usize,
    },
    /// A constraint pair is malformed.
    #[error("{kind} constraint ({left}, {right}) {defect}")]
    InvalidConstraint {
        /// Whether the pair was a must-link or cannot-link.
        kind: ConstraintKind,
        /// First endpoint as supplied.
        left: usize,
        /// Second endpoint as supplied.
        right: usize,
        /// What is wrong with the pair.
        defect: ConstraintDefect,
    },
    /// A cannot-link pair joins two points that must-link forces together.
    #[error("cannot-link ({left}, {right}) contradicts the must-link constraints")]
    ConstraintConflict {
        /// Smaller endpoint of the contradicted cannot-link.
        left: usize,
        /// Larger endpoint of the contradicted cannot-link.
        right: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// A [`crate::DataSource`] operation failed while running the algorithm.
    #[error("data source `{data_source}` failed: {error}")]
    DataSource {
        /// Identifier for the data source that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying data source error bubbled up by the algorithm.
        error: DataSourceError,
    },
    /// The merge phase exceeded its pass budget.
    #[error("merge phase did not reach a fixpoint within {passes} passes")]
    MergeDidNotConverge {
        /// Number of passes performed before giving up.
        passes: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`CdbscanError`] variants.
    enum CdbscanErrorCode for CdbscanError {
        /// Neighbourhood radius must be finite and strictly positive.
        InvalidEpsilon => InvalidEpsilon { .. } => "CDBSCAN_INVALID_EPSILON",
        /// The density threshold must be at least one.
        InvalidMinPoints => InvalidMinPoints { .. } => "CDBSCAN_INVALID_MIN_POINTS",
        /// Spatial index leaves must hold at least one point.
        InvalidLeafSize => InvalidLeafSize { .. } => "CDBSCAN_INVALID_LEAF_SIZE",
        /// A constraint pair is malformed.
        InvalidConstraint => InvalidConstraint { .. } => "CDBSCAN_INVALID_CONSTRAINT",
        /// A cannot-link pair contradicts the must-link constraints.
        ConstraintConflict => ConstraintConflict { .. } => "CDBSCAN_CONSTRAINT_CONFLICT",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "CDBSCAN_BACKEND_UNAVAILABLE",
        /// A [`crate::DataSource`] operation failed while running the algorithm.
        DataSourceFailure => DataSource { .. } => "CDBSCAN_DATA_SOURCE_FAILURE",
        /// The merge phase exceeded its pass budget.
        MergeDidNotConverge => MergeDidNotConverge { .. } => "CDBSCAN_MERGE_DID_NOT_CONVERGE",
    }
}

impl CdbscanError {
    pub(crate) fn data_source(data_source: &str, error: DataSourceError) -> Self {
        Self::DataSource {
            data_source: Arc::from(data_source),
            error,
        }
    }

    /// Retrieve the inner [`DataSourceErrorCode`] when the error originated in a [`crate::DataSource`].
    pub const fn data_source_code(&self) -> Option<DataSourceErrorCode> {
        match self {
            Self::DataSource { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` for rejected clustering parameters (`epsilon`,
    /// `min_points`, `leaf_size`).
    #[must_use]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            Self::InvalidEpsilon { .. }
                | Self::InvalidMinPoints { .. }
                | Self::InvalidLeafSize { .. }
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, CdbscanError>;
