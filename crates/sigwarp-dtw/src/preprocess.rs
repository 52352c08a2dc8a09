//! Derivative transform used by the derivative DTW variant.

use std::borrow::Cow;

use crate::error::DtwError;

/// Signal representation the aligner operates on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    /// Align the raw samples.
    #[default]
    Standard,

    /// Align Keogh-Pazzani first derivatives (derivative DTW).
    Derivative,
}

impl Variant {
    /// Map a sequence into the representation this variant aligns.
    ///
    /// Borrows the input unchanged for [`Variant::Standard`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::TooShortForDerivative`] | `Derivative` and fewer than 3 samples |
    pub fn transform<'a>(&self, values: &'a [f64]) -> Result<Cow<'a, [f64]>, DtwError> {
        match self {
            Self::Standard => Ok(Cow::Borrowed(values)),
            Self::Derivative => derivative(values).map(Cow::Owned),
        }
    }
}

/// Compute the Keogh-Pazzani first derivative of a sequence.
///
/// For interior points (1..n-1): `d[i] = ((x[i] - x[i-1]) + (x[i+1] - x[i-1]) / 2) / 2`
/// Output length is `n - 2` (drops first and last points).
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DtwError::TooShortForDerivative`] | Fewer than 3 samples |
pub fn derivative(values: &[f64]) -> Result<Vec<f64>, DtwError> {
    let n = values.len();
    if n < 3 {
        return Err(DtwError::TooShortForDerivative { len: n });
    }

    Ok((1..n - 1)
        .map(|i| ((values[i] - values[i - 1]) + (values[i + 1] - values[i - 1]) / 2.0) / 2.0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_length() {
        let d = derivative(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn derivative_too_short() {
        let result = derivative(&[1.0, 2.0]);
        assert_eq!(result, Err(DtwError::TooShortForDerivative { len: 2 }));
    }

    #[test]
    fn derivative_linear_series() {
        for v in derivative(&[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap() {
            assert!((v - 1.0).abs() < 1e-12, "expected ~1.0, got {v}");
        }
    }

    #[test]
    fn derivative_known_values() {
        let d = derivative(&[0.0, 2.0, 0.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(d, vec![1.0, -1.25, 0.5, -0.75]);
    }

    #[test]
    fn standard_borrows_input() {
        let data = [1.0, 2.0];
        let out = Variant::Standard.transform(&data).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }
}
