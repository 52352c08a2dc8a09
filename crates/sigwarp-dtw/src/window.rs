//! Sliding-window and block alignment analysis over long signals.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::cost::CostMethod;
use crate::dtw::Dtw;
use crate::error::DtwError;
use crate::path::WarpingPath;

/// Smallest window size accepted by [`WindowConfig::new`].
pub const MIN_WINDOW_SIZE: usize = 5;

/// Statistic extracted from per-window costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookFor {
    /// Smallest window cost, with every window attaining it.
    Min,
    /// Largest window cost, with every window attaining it.
    Max,
    /// Arithmetic mean of all window costs.
    Mean,
}

impl LookFor {
    /// Canonical selector string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Mean => "MEAN",
        }
    }
}

impl FromStr for LookFor {
    type Err = DtwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MIN" => Ok(Self::Min),
            "MAX" => Ok(Self::Max),
            "MEAN" => Ok(Self::Mean),
            other => Err(DtwError::InvalidLookFor {
                look_for: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for LookFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated sliding-window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    window_size: usize,
    step: usize,
}

impl WindowConfig {
    /// Create a window configuration.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::WindowTooSmall`] | `window_size < 5` |
    /// | [`DtwError::InvalidStep`] | `step == 0` |
    pub fn new(window_size: usize, step: usize) -> Result<Self, DtwError> {
        if window_size < MIN_WINDOW_SIZE {
            return Err(DtwError::WindowTooSmall {
                window_size,
                min: MIN_WINDOW_SIZE,
            });
        }
        if step == 0 {
            return Err(DtwError::InvalidStep { step });
        }
        Ok(Self { window_size, step })
    }

    /// Samples per window.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Offset between consecutive window starts.
    #[must_use]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Windows starting at `0, step, 2*step, ...` that end within `len`.
    pub fn windows(&self, len: usize) -> impl Iterator<Item = Window> {
        let size = self.window_size;
        let n_starts = (len + 1).saturating_sub(size);
        (0..n_starts)
            .step_by(self.step)
            .map(move |start| Window::new(start, start + size))
    }
}

/// Half-open sample interval `[start, end)` over both input sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    /// First sample index.
    pub start: usize,
    /// One past the last sample index.
    pub end: usize,
}

impl Window {
    /// Create a window over `[start, end)`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "window start {start} after end {end}");
        Self { start, end }
    }

    /// Number of samples covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the window covers no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Slice `values` to this window, clamped to its length.
    #[must_use]
    pub fn slice<'a>(&self, values: &'a [f64]) -> &'a [f64] {
        let end = self.end.min(values.len());
        let start = self.start.min(end);
        &values[start..end]
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Alignment cost of a single window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowCost {
    /// The aligned interval.
    pub window: Window,
    /// Scalar cost of the window alignment.
    pub cost: f64,
}

/// Aggregate over all windows of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSearch {
    /// Requested statistic.
    pub look_for: LookFor,
    /// Minimum, maximum or mean window cost.
    pub value: f64,
    /// Every window cost in window order.
    pub costs: Vec<WindowCost>,
    /// Indices into `costs` attaining `value`; empty for [`LookFor::Mean`].
    pub extremal: Vec<usize>,
}

impl WindowSearch {
    fn aggregate(look_for: LookFor, costs: Vec<WindowCost>) -> Self {
        let values = costs.iter().map(|c| c.cost);
        let value = match look_for {
            LookFor::Min => values.fold(f64::INFINITY, f64::min),
            LookFor::Max => values.fold(f64::NEG_INFINITY, f64::max),
            LookFor::Mean => values.sum::<f64>() / costs.len() as f64,
        };

        #[allow(clippy::float_cmp)]
        let extremal = match look_for {
            LookFor::Mean => Vec::new(),
            LookFor::Min | LookFor::Max => costs
                .iter()
                .enumerate()
                .filter(|(_, c)| c.cost == value)
                .map(|(idx, _)| idx)
                .collect(),
        };

        Self {
            look_for,
            value,
            costs,
            extremal,
        }
    }

    /// Windows attaining the extremum, in window order.
    pub fn extremal_windows(&self) -> impl Iterator<Item = (usize, Window)> + '_ {
        self.extremal.iter().map(|&idx| (idx, self.costs[idx].window))
    }
}

/// Everything an external plotter needs to draw one window alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentView {
    /// The window that was aligned.
    pub window: Window,
    /// First sequence as aligned.
    pub x: Vec<f64>,
    /// Second sequence as aligned.
    pub y: Vec<f64>,
    /// Interior cost matrix, `x.len()` rows by `y.len()` columns.
    pub matrix: Vec<Vec<f64>>,
    /// Warping path in traceback order.
    pub path: WarpingPath,
}

impl Dtw {
    /// Compute the alignment cost of every window, in window order.
    ///
    /// Windows are aligned independently in parallel. Slices are clamped to
    /// each sequence's length, so a shorter sequence may contribute short or
    /// empty slices; an empty slice fails the whole call.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::NoWindows`] | `window_size > max(x.len(), y.len())` |
    /// | [`DtwError::DegenerateSequence`] | A window slice of either sequence is empty |
    /// | [`DtwError::TooShortForDerivative`] | Derivative variant and a slice shorter than 3 |
    #[instrument(skip(self, x, y), fields(n = x.len(), m = y.len()))]
    pub fn sliding_window(
        &self,
        x: &[f64],
        y: &[f64],
        config: &WindowConfig,
        method: CostMethod,
    ) -> Result<Vec<WindowCost>, DtwError> {
        let len = x.len().max(y.len());
        let windows: Vec<Window> = config.windows(len).collect();
        if windows.is_empty() {
            return Err(DtwError::NoWindows {
                window_size: config.window_size(),
                len,
            });
        }
        debug!(n_windows = windows.len(), "aligning windows");

        windows
            .into_par_iter()
            .map(|window| {
                let cost = self.alignment_cost(window.slice(x), window.slice(y), method)?;
                Ok(WindowCost { window, cost })
            })
            .collect()
    }

    /// Find the minimum, maximum or mean window alignment cost.
    ///
    /// # Errors
    ///
    /// Propagates every error of [`Dtw::sliding_window`].
    #[instrument(skip(self, x, y), fields(n = x.len(), m = y.len()))]
    pub fn find_alignment_cost(
        &self,
        x: &[f64],
        y: &[f64],
        config: &WindowConfig,
        method: CostMethod,
        look_for: LookFor,
    ) -> Result<WindowSearch, DtwError> {
        let costs = self.sliding_window(x, y, config, method)?;
        let search = WindowSearch::aggregate(look_for, costs);
        debug!(
            value = search.value,
            n_extremal = search.extremal.len(),
            "window search complete"
        );
        Ok(search)
    }

    /// Re-align one window and return its plotting data.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Dtw::align`].
    pub fn render_window(&self, x: &[f64], y: &[f64], window: Window) -> Result<AlignmentView, DtwError> {
        let alignment = self.align(window.slice(x), window.slice(y))?;
        Ok(AlignmentView {
            window,
            matrix: alignment.matrix().interior(),
            path: alignment.path().clone(),
            x: alignment.x().to_vec(),
            y: alignment.y().to_vec(),
        })
    }

    /// Split both sequences into `n_blocks` consecutive blocks of `block_len`
    /// samples and return the cost of each. The last block runs to the end
    /// of the longer sequence.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidBlocks`] | `block_len == 0`, `n_blocks == 0`, or block bounds overflow |
    /// | [`DtwError::DegenerateSequence`] | A block of either sequence is empty |
    #[instrument(skip(self, x, y), fields(n = x.len(), m = y.len()))]
    pub fn block_costs(
        &self,
        x: &[f64],
        y: &[f64],
        block_len: usize,
        n_blocks: usize,
        method: CostMethod,
    ) -> Result<Vec<WindowCost>, DtwError> {
        block_windows(x.len().max(y.len()), block_len, n_blocks)?
            .into_iter()
            .map(|window| {
                let cost = self.alignment_cost(window.slice(x), window.slice(y), method)?;
                Ok(WindowCost { window, cost })
            })
            .collect()
    }

    /// Split both sequences into blocks as [`Dtw::block_costs`] does, then
    /// return the MEAN sliding-window cost inside each block.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::InvalidBlocks`] | `block_len == 0`, `n_blocks == 0`, or block bounds overflow |
    /// | [`DtwError::NoWindows`] | A block is shorter than the window |
    /// | [`DtwError::DegenerateSequence`] | A window slice of either sequence is empty |
    #[instrument(skip(self, x, y, config), fields(n = x.len(), m = y.len()))]
    pub fn block_window_costs(
        &self,
        x: &[f64],
        y: &[f64],
        block_len: usize,
        n_blocks: usize,
        config: &WindowConfig,
        method: CostMethod,
    ) -> Result<Vec<WindowCost>, DtwError> {
        block_windows(x.len().max(y.len()), block_len, n_blocks)?
            .into_iter()
            .map(|window| {
                let search = self.find_alignment_cost(
                    window.slice(x),
                    window.slice(y),
                    config,
                    method,
                    LookFor::Mean,
                )?;
                debug!(%window, mean = search.value, "block averaged");
                Ok(WindowCost {
                    window,
                    cost: search.value,
                })
            })
            .collect()
    }
}

/// Bounds of `n_blocks` consecutive blocks over `len` samples, the last one
/// absorbing the remainder.
fn block_windows(len: usize, block_len: usize, n_blocks: usize) -> Result<Vec<Window>, DtwError> {
    let invalid = || DtwError::InvalidBlocks { block_len, n_blocks };
    if block_len == 0 || n_blocks == 0 {
        return Err(invalid());
    }
    (0..n_blocks)
        .map(|b| {
            let start = b.checked_mul(block_len).ok_or_else(invalid)?;
            let end = if b + 1 == n_blocks {
                len.max(start)
            } else {
                start.checked_add(block_len).ok_or_else(invalid)?
            };
            Ok(Window::new(start, end))
        })
        .collect()
}
