//! Error types for alignment, cost selection and window search.

/// Errors from DTW alignment, cost evaluation and sliding-window analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DtwError {
    /// Returned when an empty slice is provided as a time series.
    #[error("time series must be non-empty")]
    EmptySeries,

    /// Returned when a time series contains NaN, infinity, or negative infinity.
    #[error("time series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when a cost method selector is not one of `d-method`, `td-method`, `c-method`.
    #[error("unknown alignment cost method \"{method}\" (expected d-method, td-method or c-method)")]
    InvalidMethod {
        /// The rejected selector.
        method: String,
    },

    /// Returned when an aggregation selector is not one of `MIN`, `MAX`, `MEAN`.
    #[error("unknown window statistic \"{look_for}\" (expected MIN, MAX or MEAN)")]
    InvalidLookFor {
        /// The rejected selector.
        look_for: String,
    },

    /// Returned when the sliding window holds fewer than five samples.
    #[error("window size must be at least {min}, got {window_size}")]
    WindowTooSmall {
        /// The requested window size.
        window_size: usize,
        /// Smallest accepted window size.
        min: usize,
    },

    /// Returned when the step between consecutive windows is zero.
    #[error("window step must be positive, got {step}")]
    InvalidStep {
        /// The requested step.
        step: usize,
    },

    /// Returned when no complete window fits inside the longer sequence.
    #[error("window size {window_size} exceeds sequence length {len}")]
    NoWindows {
        /// The requested window size.
        window_size: usize,
        /// Length of the longer input sequence.
        len: usize,
    },

    /// Returned when a cost is requested for an alignment with an empty side.
    #[error("cannot compute alignment cost of degenerate sequences (lengths {len_x} and {len_y})")]
    DegenerateSequence {
        /// Length of the first aligned sequence.
        len_x: usize,
        /// Length of the second aligned sequence.
        len_y: usize,
    },

    /// Returned when the derivative variant is applied to fewer than three samples.
    #[error("derivative requires at least 3 samples, got {len}")]
    TooShortForDerivative {
        /// Length of the offending sequence.
        len: usize,
    },

    /// Returned when block analysis is asked for zero blocks or zero-length blocks.
    #[error("block analysis needs positive block length and count, got {block_len} x {n_blocks}")]
    InvalidBlocks {
        /// Requested samples per block.
        block_len: usize,
        /// Requested number of blocks.
        n_blocks: usize,
    },
}
