//! DTW alignment driver and alignment cost evaluation.

use tracing::instrument;

use crate::cost::CostMethod;
use crate::error::DtwError;
use crate::matrix::CostMatrix;
use crate::path::{AlignmentStats, WarpingPath};
use crate::preprocess::Variant;
use crate::traceback::traceback;

/// Immutable DTW configuration. Thread-safe and copyable.
///
/// Every call builds its own matrix and path; nothing is cached between
/// invocations, so repeated calls on the same inputs return identical results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dtw {
    variant: Variant,
}

impl Dtw {
    /// Create a DTW aligner over raw samples.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a derivative DTW aligner.
    #[must_use]
    pub fn derivative() -> Self {
        Self {
            variant: Variant::Derivative,
        }
    }

    /// Set the signal representation to align.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Return the configured variant.
    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Align `x` against `y`: fill the cost matrix and trace the warping path.
    ///
    /// Runs in O(n * m) time and space on the transformed sequences.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::TooShortForDerivative`] | Derivative variant and a side shorter than 3 |
    #[instrument(skip(x, y), fields(n = x.len(), m = y.len()))]
    pub fn align(&self, x: &[f64], y: &[f64]) -> Result<Alignment, DtwError> {
        let x = self.variant.transform(x)?.into_owned();
        let y = self.variant.transform(y)?.into_owned();
        Ok(Alignment::compute(x, y))
    }

    /// Align `x` against `y` and reduce the result with `method`.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Dtw::align`] and [`Alignment::cost`].
    pub fn alignment_cost(&self, x: &[f64], y: &[f64], method: CostMethod) -> Result<f64, DtwError> {
        self.align(x, y)?.cost(method)
    }
}

/// The complete result of one alignment: the aligned sequences, their cost
/// matrix, the warping path and move counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    x: Vec<f64>,
    y: Vec<f64>,
    matrix: CostMatrix,
    path: WarpingPath,
    stats: AlignmentStats,
}

impl Alignment {
    /// Align the sequences exactly as given, with no variant transform.
    #[must_use]
    pub fn compute(x: Vec<f64>, y: Vec<f64>) -> Self {
        let matrix = CostMatrix::build(&x, &y);
        let (path, stats) = traceback(&x, &y, &matrix);
        Self {
            x,
            y,
            matrix,
            path,
            stats,
        }
    }

    /// The first aligned sequence (after any variant transform).
    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The second aligned sequence (after any variant transform).
    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// The cumulative cost matrix.
    #[must_use]
    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    /// The warping path in traceback order.
    #[must_use]
    pub fn path(&self) -> &WarpingPath {
        &self.path
    }

    /// Match, insertion and deletion counts.
    #[must_use]
    pub fn stats(&self) -> AlignmentStats {
        self.stats
    }

    /// Reduce this alignment to a scalar cost.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::DegenerateSequence`] | Either aligned sequence is empty |
    pub fn cost(&self, method: CostMethod) -> Result<f64, DtwError> {
        if self.x.is_empty() || self.y.is_empty() {
            return Err(DtwError::DegenerateSequence {
                len_x: self.x.len(),
                len_y: self.y.len(),
            });
        }

        let cost = match method {
            CostMethod::Distance => {
                self.matrix.final_cost() / (self.x.len() + self.y.len()) as f64
            }
            CostMethod::TimeDistance => {
                let total: f64 = self
                    .path
                    .pairs()
                    .map(|(a, b)| self.matrix.get(a + 1, b + 1))
                    .sum();
                total / self.path.len() as f64
            }
            CostMethod::EditRatio => {
                let off_diagonal = self.stats.insertions + self.stats.deletions;
                off_diagonal as f64 / self.stats.total() as f64
            }
        };
        Ok(cost)
    }
}
