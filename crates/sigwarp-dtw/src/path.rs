//! Warping path types for DTW alignment.

/// Move taken when leaving a path cell during traceback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Diagonal move: both sequences advance.
    Match,
    /// Vertical move: only the first sequence advances.
    Insertion,
    /// Horizontal move: only the second sequence advances.
    Deletion,
}

/// A single warping path cell, mapping index `a` in the first sequence to
/// index `b` in the second, with the move taken out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpingStep {
    /// Index in the first sequence.
    pub a: usize,
    /// Index in the second sequence.
    pub b: usize,
    /// Traceback move that left this cell.
    pub kind: StepKind,
}

/// Ordered warping path in traceback order, from `(n-1, m-1)` back to `(0, 0)`.
///
/// Holds only real cells; the terminal `(-1, -1)` position reached by the
/// last move is not stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        Self(steps)
    }

    /// Return the warping steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the number of cells on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(a, b)` index pairs in traceback order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|s| (s.a, s.b))
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Match, insertion and deletion counts accumulated during traceback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    /// Diagonal moves.
    pub matches: usize,
    /// Vertical moves.
    pub insertions: usize,
    /// Horizontal moves.
    pub deletions: usize,
}

impl AlignmentStats {
    /// Total number of traceback moves; equals the path length.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matches + self.insertions + self.deletions
    }

    pub(crate) fn record(&mut self, kind: StepKind) {
        match kind {
            StepKind::Match => self.matches += 1,
            StepKind::Insertion => self.insertions += 1,
            StepKind::Deletion => self.deletions += 1,
        }
    }
}
