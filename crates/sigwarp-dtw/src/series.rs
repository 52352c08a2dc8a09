//! Owned signal type with validation guarantees.

use crate::error::DtwError;

/// Owned, validated signal. Guaranteed non-empty with all finite values.
///
/// The alignment engine itself works on plain `&[f64]` so that window slices
/// can be aligned without revalidation; this type is the checked entry point
/// for data read from files.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries(Vec<f64>);

impl TimeSeries {
    /// Create a new time series, validating that it is non-empty and all values are finite.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptySeries`] | `values` is empty |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f64>) -> Result<Self, DtwError> {
        if values.is_empty() {
            return Err(DtwError::EmptySeries);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue { index });
        }
        Ok(Self(values))
    }

    /// Borrow the samples.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_vec() {
        assert_eq!(TimeSeries::new(vec![]), Err(DtwError::EmptySeries));
    }

    #[test]
    fn rejects_nan() {
        let result = TimeSeries::new(vec![1.0, f64::NAN, 3.0]);
        assert!(matches!(result, Err(DtwError::NonFiniteValue { index: 1 })));
    }

    #[test]
    fn rejects_neg_infinity() {
        let result = TimeSeries::new(vec![f64::NEG_INFINITY, 2.0]);
        assert!(matches!(result, Err(DtwError::NonFiniteValue { index: 0 })));
    }

    #[test]
    fn accepts_valid_series() {
        let ts = TimeSeries::new(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.as_slice(), &[1.0, 2.0, 3.0]);
    }
}
