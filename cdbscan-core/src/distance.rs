//! Distance primitives for the built-in Euclidean metric.
//!
//! [`euclidean_distance`] validates its inputs and surfaces detailed errors
//! so callers supplying their own [`crate::DataSource`] can reuse it safely.
//! [`crate::DenseSource`] validates rows once at construction and calls the
//! unchecked kernel afterwards.

use core::fmt;

use thiserror::Error;

/// Identifies whether an error was produced while inspecting the left or right
/// vector argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorKind {
    /// Value originating from the first argument.
    Left,
    /// Value originating from the second argument.
    Right,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// Errors emitted while computing distances.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceError {
    /// Either input vector had zero length.
    #[error("vectors must have positive dimension")]
    ZeroLength,
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Length of the left vector.
        left: usize,
        /// Length of the right vector.
        right: usize,
    },
    /// Encountered a non-finite value in one of the vectors.
    #[error("{which} vector contains a non-finite value at index {index}: {value}")]
    NonFinite {
        /// Vector holding the value.
        which: VectorKind,
        /// Position of the value.
        index: usize,
        /// The rejected value.
        value: f32,
    },
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;

/// Computes the Euclidean distance between two vectors.
///
/// # Examples
///
/// ```
/// use cdbscan_core::{euclidean_distance, DistanceError};
///
/// fn main() -> Result<(), DistanceError> {
///     let distance = euclidean_distance(&[1.0, 2.0, 3.0], &[4.0, 6.0, 8.0])?;
///     assert!((distance - 7.071_068).abs() < 1e-6);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// - [`DistanceError::ZeroLength`] when any input is empty.
/// - [`DistanceError::DimensionMismatch`] when input lengths differ.
/// - [`DistanceError::NonFinite`] when a value is NaN or infinite.
///
/// Distances beyond the `f32` range saturate at [`f32::MAX`].
pub fn euclidean_distance(left: &[f32], right: &[f32]) -> Result<f32> {
    if left.is_empty() || right.is_empty() {
        return Err(DistanceError::ZeroLength);
    }
    if left.len() != right.len() {
        return Err(DistanceError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    ensure_finite(left, VectorKind::Left)?;
    ensure_finite(right, VectorKind::Right)?;

    Ok(euclidean_unchecked(left, right))
}

/// Euclidean kernel for inputs that were validated up front.
///
/// Accumulates in `f64` so long vectors do not lose precision. Finite inputs
/// far enough apart can exceed the `f32` range; the result saturates at
/// [`f32::MAX`] so it stays a valid distance.
pub(crate) fn euclidean_unchecked(left: &[f32], right: &[f32]) -> f32 {
    let sum = left
        .iter()
        .zip(right.iter())
        .map(|(&l, &r)| {
            let diff = f64::from(l) - f64::from(r);
            diff * diff
        })
        .sum::<f64>();
    sum.sqrt().min(f64::from(f32::MAX)) as f32
}

fn ensure_finite(values: &[f32], which: VectorKind) -> Result<()> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(DistanceError::NonFinite {
            which,
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}
