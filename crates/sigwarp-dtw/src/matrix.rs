//! Cumulative DTW cost matrix.

/// Cumulative cost matrix of shape `(n + 1, m + 1)` for sequences of length `n` and `m`.
///
/// Row 0 and column 0 form the border: `[0][0]` is zero and every other
/// border cell is `+inf`. Interior cell `[i][j]` holds the minimal cumulative
/// absolute-difference cost of aligning `x[..i]` with `y[..j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Fill the cost matrix for `x` against `y`.
    ///
    /// `M[i][j] = |x[i-1] - y[j-1]| + min(M[i-1][j-1], M[i-1][j], M[i][j-1])`.
    /// Empty inputs are accepted and produce a border-only matrix.
    #[must_use]
    pub fn build(x: &[f64], y: &[f64]) -> Self {
        let rows = x.len() + 1;
        let cols = y.len() + 1;
        let mut data = vec![f64::INFINITY; rows * cols];
        data[0] = 0.0;

        for i in 1..rows {
            let row = i * cols;
            let prev = (i - 1) * cols;
            for j in 1..cols {
                let distance = (x[i - 1] - y[j - 1]).abs();
                let component = data[prev + j - 1].min(data[prev + j]).min(data[row + j - 1]);
                data[row + j] = distance + component;
            }
        }

        Self { rows, cols, data }
    }

    /// Return `(rows, cols)`, i.e. `(n + 1, m + 1)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Return the cell at matrix coordinates `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows, "row index {i} out of bounds for {} rows", self.rows);
        assert!(j < self.cols, "column index {j} out of bounds for {} columns", self.cols);
        self.data[i * self.cols + j]
    }

    /// Return one full row, border cell included.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Cumulative cost of the complete alignment, `M[n][m]`.
    #[must_use]
    pub fn final_cost(&self) -> f64 {
        self.data[self.data.len() - 1]
    }

    /// Copy out the interior `n x m` block (border removed), row-major.
    #[must_use]
    pub fn interior(&self) -> Vec<Vec<f64>> {
        (1..self.rows).map(|i| self.row(i)[1..].to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_is_fixed() {
        let m = CostMatrix::build(&[3.0, -1.0], &[2.0, 7.0, 0.0]);
        assert_eq!(m.shape(), (3, 4));
        assert_eq!(m.get(0, 0), 0.0);
        for j in 1..4 {
            assert_eq!(m.get(0, j), f64::INFINITY);
        }
        for i in 1..3 {
            assert_eq!(m.get(i, 0), f64::INFINITY);
        }
    }

    #[test]
    fn hand_computed_2x2() {
        // |0-1| = 1, then |0-0| + 1, |1-1| + 1, |1-0| + min(1, 1, 1)
        let m = CostMatrix::build(&[0.0, 1.0], &[1.0, 0.0]);
        assert_eq!(m.interior(), vec![vec![1.0, 1.0], vec![1.0, 2.0]]);
        assert_eq!(m.final_cost(), 2.0);
    }

    #[test]
    fn empty_input_is_border_only() {
        let m = CostMatrix::build(&[], &[1.0, 2.0]);
        assert_eq!(m.shape(), (1, 3));
        assert_eq!(m.row(0), &[0.0, f64::INFINITY, f64::INFINITY]);
        assert!(m.interior().is_empty());
    }

    #[test]
    fn identical_sequences_cost_zero() {
        let s = [1.0, 4.0, 2.0, 8.0];
        assert_eq!(CostMatrix::build(&s, &s).final_cost(), 0.0);
    }
}
