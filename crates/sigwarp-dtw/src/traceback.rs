//! Backward walk through a filled cost matrix.

use crate::matrix::CostMatrix;
use crate::path::{AlignmentStats, StepKind, WarpingPath, WarpingStep};

/// Recover the warping path and move counts for `x` against `y`.
///
/// Starts at matrix cell `(n, m)` and walks back until either index reaches
/// the border. At each cell the stored score is compared, with exact float
/// equality, against `distance + predecessor` for the diagonal, then the
/// cell above; the first one that reproduces the score wins. Otherwise the
/// move is horizontal. Exact comparison is sound because the fill step
/// computed the score with the same addition.
///
/// `matrix` must have been built from the same `x` and `y`.
pub(crate) fn traceback(x: &[f64], y: &[f64], matrix: &CostMatrix) -> (WarpingPath, AlignmentStats) {
    debug_assert_eq!(matrix.shape(), (x.len() + 1, y.len() + 1));

    let mut steps = Vec::with_capacity(x.len() + y.len());
    let mut stats = AlignmentStats::default();
    let (mut i, mut j) = (x.len(), y.len());

    #[allow(clippy::float_cmp)]
    while i > 0 && j > 0 {
        let score = matrix.get(i, j);
        let distance = (x[i - 1] - y[j - 1]).abs();

        let kind = if score == distance + matrix.get(i - 1, j - 1) {
            StepKind::Match
        } else if score == distance + matrix.get(i - 1, j) {
            StepKind::Insertion
        } else {
            StepKind::Deletion
        };

        steps.push(WarpingStep { a: i - 1, b: j - 1, kind });
        stats.record(kind);

        match kind {
            StepKind::Match => {
                i -= 1;
                j -= 1;
            }
            StepKind::Insertion => i -= 1,
            StepKind::Deletion => j -= 1,
        }
    }

    (WarpingPath::new(steps), stats)
}
