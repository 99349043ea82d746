//! In-memory dense point set used by [`crate::cluster`] and most callers.
use crate::{datasource::DataSource, distance::euclidean_unchecked, error::DataSourceError};

/// Row-major dense vectors compared with Euclidean distance.
///
/// Rows are validated once on construction: every row must share the same
/// positive dimension and contain only finite values. An empty point set is
/// valid and clusters to an empty labelling.
#[derive(Clone, Debug)]
pub struct DenseSource {
    data: Vec<f32>,
    dimension: usize,
    len: usize,
    name: String,
}

impl DenseSource {
    /// Creates a dense source after validating every row.
    ///
    /// # Errors
    /// Returns [`DataSourceError::DimensionMismatch`] if row lengths differ,
    /// [`DataSourceError::ZeroDimension`] if rows are empty, and
    /// [`DataSourceError::NonFiniteCoordinate`] for NaN or infinite values.
    ///
    /// # Examples
    /// ```
    /// use cdbscan_core::{DataSource, DataSourceError, DenseSource};
    ///
    /// let ds = DenseSource::try_new("demo", &[vec![0.0, 0.0], vec![3.0, 4.0]])?;
    /// assert_eq!(ds.len(), 2);
    /// assert_eq!(ds.distance(0, 1)?, 5.0);
    ///
    /// let err = DenseSource::try_new("demo", &[vec![0.0], vec![1.0, 2.0]]);
    /// assert!(matches!(err, Err(DataSourceError::DimensionMismatch { .. })));
    /// # Ok::<(), DataSourceError>(())
    /// ```
    pub fn try_new(name: impl Into<String>, rows: &[Vec<f32>]) -> Result<Self, DataSourceError> {
        let dimension = rows.first().map_or(0, Vec::len);
        if !rows.is_empty() && dimension == 0 {
            return Err(DataSourceError::ZeroDimension);
        }

        let mut data = Vec::with_capacity(rows.len().saturating_mul(dimension));
        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != dimension {
                return Err(DataSourceError::DimensionMismatch {
                    left: dimension,
                    right: row.len(),
                });
            }
            if let Some((position, &value)) =
                row.iter().enumerate().find(|(_, value)| !value.is_finite())
            {
                return Err(DataSourceError::NonFiniteCoordinate {
                    row: row_index,
                    dimension: position,
                    value,
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            dimension,
            len: rows.len(),
            name: name.into(),
        })
    }

    /// Returns the shared row dimension (zero for an empty source).
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn row(&self, index: usize) -> Result<&[f32], DataSourceError> {
        if index >= self.len {
            return Err(DataSourceError::OutOfBounds { index });
        }
        let start = index * self.dimension;
        self.data
            .get(start..start + self.dimension)
            .ok_or(DataSourceError::OutOfBounds { index })
    }
}

impl DataSource for DenseSource {
    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn distance(&self, i: usize, j: usize) -> Result<f32, DataSourceError> {
        let a = self.row(i)?;
        let b = self.row(j)?;
        Ok(euclidean_unchecked(a, b))
    }

    fn point(&self, index: usize) -> Option<&[f32]> {
        self.row(index).ok()
    }
}
