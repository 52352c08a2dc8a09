//! Scalar alignment cost definitions.

use std::fmt;
use std::str::FromStr;

use crate::error::DtwError;

/// Reduction from a completed alignment to one scalar cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostMethod {
    /// `d-method`: final cumulative cost divided by `n + m`.
    Distance,
    /// `td-method`: mean cumulative cost sampled along the warping path.
    TimeDistance,
    /// `c-method`: share of non-diagonal moves, `(insertions + deletions) / moves`.
    EditRatio,
}

impl CostMethod {
    /// All methods in selector order.
    pub const ALL: [Self; 3] = [Self::Distance, Self::TimeDistance, Self::EditRatio];

    /// Canonical selector string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Distance => "d-method",
            Self::TimeDistance => "td-method",
            Self::EditRatio => "c-method",
        }
    }
}

impl FromStr for CostMethod {
    type Err = DtwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "d-method" => Ok(Self::Distance),
            "td-method" => Ok(Self::TimeDistance),
            "c-method" => Ok(Self::EditRatio),
            other => Err(DtwError::InvalidMethod {
                method: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_selector() {
        for method in CostMethod::ALL {
            assert_eq!(method.as_str().parse::<CostMethod>(), Ok(method));
        }
    }

    #[test]
    fn rejects_unknown_selector() {
        let result = "N/A".parse::<CostMethod>();
        assert_eq!(
            result,
            Err(DtwError::InvalidMethod { method: "N/A".into() })
        );
    }

    #[test]
    fn selectors_are_case_sensitive() {
        assert!("D-METHOD".parse::<CostMethod>().is_err());
    }
}
