//! Benchmark parameter types.
//!
//! Groups related benchmark parameters into structs so Criterion identifiers
//! stay readable and helper functions keep short signatures.

use std::fmt;

/// Parameters for a single clustering benchmark run.
#[derive(Clone, Debug)]
pub struct ClusterBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Number of sampled must-link and cannot-link pairs, each.
    pub constraint_pairs: usize,
}

impl fmt::Display for ClusterBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},pairs={}", self.point_count, self.constraint_pairs)
    }
}
