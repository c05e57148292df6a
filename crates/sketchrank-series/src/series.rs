//! Fixed-length series type with validation guarantees.

use std::ops::Index;

use crate::error::SeriesError;

/// Owned, validated fixed-length series. Guaranteed non-empty with all finite values.
///
/// Produced by [`z_normalize`](crate::z_normalize) and
/// [`resample_and_normalize`](crate::resample_and_normalize), or built from a
/// caller-supplied vector through [`FixedSeries::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct FixedSeries(Vec<f64>);

impl FixedSeries {
    /// Create a new fixed series, validating that it is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::EmptySeries`] | `values` is empty |
    /// | [`SeriesError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, SeriesError> {
        if values.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(SeriesError::NonFiniteValue { index });
        }
        Ok(Self(values))
    }

    /// Wrap values that are already known to be finite.
    pub(crate) fn new_unchecked(values: Vec<f64>) -> Self {
        debug_assert!(values.iter().all(|v| v.is_finite()));
        Self(values)
    }

    /// Return the underlying values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Return the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the series has no points.
    ///
    /// Normalizing an empty slice is the only way to obtain an empty
    /// [`FixedSeries`]; [`FixedSeries::new`] rejects it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Index<usize> for FixedSeries {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl AsRef<[f64]> for FixedSeries {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for FixedSeries {
    type Error = SeriesError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}
