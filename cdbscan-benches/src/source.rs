//! Synthetic blob data for benchmarking.
//!
//! Provides [`BlobSet`], a seeded set of points scattered around random blob
//! centres, plus a constraint sampler that never produces contradictions:
//! must-link pairs stay inside a blob and cannot-link pairs always span two.

use cdbscan_core::{Constraints, DataSourceError, DenseSource};
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};

/// Side length of the hypercube that blob centres are drawn from.
const CENTRE_RANGE: f32 = 100.0;

/// Errors that may occur during synthetic blob generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum SyntheticError {
    /// The requested point count was zero.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// The requested blob count was zero.
    #[error("blob count must be greater than zero")]
    ZeroBlobs,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
    /// The spread was not a positive finite value.
    #[error("spread must be positive and finite (got {got})")]
    InvalidSpread {
        /// The rejected spread.
        got: f32,
    },
}

/// Configuration for synthetic blob generation.
#[derive(Clone, Debug)]
pub struct BlobConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Number of blobs the points are spread across.
    pub blobs: usize,
    /// Dimensionality of each point.
    pub dimensions: usize,
    /// Maximum per-coordinate offset of a point from its blob centre.
    pub spread: f32,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Seeded points grouped into blobs, with the members of every blob retained.
///
/// Points are dealt to blobs in turn, so point `i` belongs to blob
/// `i mod blobs`.
///
/// # Examples
///
/// ```
/// use cdbscan_benches::source::{BlobConfig, BlobSet};
///
/// let config = BlobConfig { point_count: 12, blobs: 3, dimensions: 2, spread: 0.5, seed: 7 };
/// let blobs = BlobSet::generate(&config).expect("valid config");
/// assert_eq!(blobs.rows().len(), 12);
/// assert_eq!(blobs.blob_of(4), Some(1));
/// ```
#[derive(Clone, Debug)]
pub struct BlobSet {
    rows: Vec<Vec<f32>>,
    members: Vec<Vec<usize>>,
}

impl BlobSet {
    /// Generates points eagerly from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyntheticError`] when a count is zero or the spread is not a
    /// positive finite value.
    #[expect(
        clippy::float_arithmetic,
        reason = "points are offset from their blob centre"
    )]
    pub fn generate(config: &BlobConfig) -> Result<Self, SyntheticError> {
        if config.point_count == 0 {
            return Err(SyntheticError::ZeroPoints);
        }
        if config.blobs == 0 {
            return Err(SyntheticError::ZeroBlobs);
        }
        if config.dimensions == 0 {
            return Err(SyntheticError::ZeroDimensions);
        }
        if !(config.spread.is_finite() && config.spread > 0.0) {
            return Err(SyntheticError::InvalidSpread { got: config.spread });
        }

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let centres: Vec<Vec<f32>> = (0..config.blobs)
            .map(|_| {
                (0..config.dimensions)
                    .map(|_| rng.gen_range(0.0_f32..CENTRE_RANGE))
                    .collect()
            })
            .collect();

        let mut rows = Vec::with_capacity(config.point_count);
        let mut members = vec![Vec::new(); config.blobs];
        let deal = (0..config.blobs).cycle().take(config.point_count).enumerate();
        for (index, blob) in deal {
            let (Some(centre), Some(blob_members)) = (centres.get(blob), members.get_mut(blob))
            else {
                continue;
            };
            let row = centre
                .iter()
                .map(|&coordinate| coordinate + rng.gen_range(-config.spread..config.spread))
                .collect();
            rows.push(row);
            blob_members.push(index);
        }

        Ok(Self { rows, members })
    }

    /// Returns the generated rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Returns the blob that generated `index`, or `None` when out of range.
    #[must_use]
    pub fn blob_of(&self, index: usize) -> Option<usize> {
        self.members
            .iter()
            .position(|blob| blob.binary_search(&index).is_ok())
    }

    /// Wraps the rows in a Euclidean [`DenseSource`].
    ///
    /// # Errors
    ///
    /// Propagates [`DataSourceError`] from row validation.
    pub fn source(&self) -> Result<DenseSource, DataSourceError> {
        DenseSource::try_new("blobs", &self.rows)
    }

    /// Samples up to `pairs` must-link pairs inside blobs and up to `pairs`
    /// cannot-link pairs across blobs.
    ///
    /// Must-link pairs are only drawn from blobs holding two or more points and
    /// cannot-link pairs only when there are at least two blobs.
    #[must_use]
    pub fn sample_constraints(&self, pairs: usize, seed: u64) -> Constraints {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut constraints = Constraints::new();
        let linkable: Vec<&Vec<usize>> =
            self.members.iter().filter(|blob| blob.len() > 1).collect();

        for _ in 0..pairs {
            let Some(blob) = linkable.choose(&mut rng) else {
                break;
            };
            if let [left, right] = blob.choose_multiple(&mut rng, 2).collect::<Vec<_>>()[..] {
                constraints = constraints.with_must_link(*left, *right);
            }
        }

        for _ in 0..pairs {
            let blobs: Vec<&Vec<usize>> = self.members.choose_multiple(&mut rng, 2).collect();
            let [left_blob, right_blob] = blobs[..] else {
                break;
            };
            if let (Some(&left), Some(&right)) =
                (left_blob.choose(&mut rng), right_blob.choose(&mut rng))
            {
                constraints = constraints.with_cannot_link(left, right);
            }
        }

        constraints
    }
}
