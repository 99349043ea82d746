//! Benchmark setup error type.
//!
//! Aggregates the failures that may arise while preparing benchmark inputs so
//! setup functions can propagate them with `?` instead of using `.expect()`.

use crate::source::SyntheticError;
use cdbscan_core::{CdbscanError, DataSourceError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Parameter validation or a clustering run failed.
    #[error("clustering failed: {0}")]
    Cdbscan(#[from] CdbscanError),
    /// The generated rows were rejected by the dense source.
    #[error("data source error: {0}")]
    DataSource(#[from] DataSourceError),
}
