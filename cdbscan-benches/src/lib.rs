//! Benchmark support for the C-DBSCAN library.
//!
//! Provides seeded synthetic point sets and constraint samplers so Criterion
//! benchmarks can exercise clustering on reproducible inputs.

pub mod error;
pub mod params;
pub mod source;
