//! Dynamic time warping alignment of paired signals.
//!
//! Pure math library, zero I/O. Fills absolute-difference DTW cost matrices,
//! recovers warping paths with deterministic tie-breaking, reduces alignments
//! to scalar costs, and searches sliding windows for minimal, maximal or mean
//! alignment cost.

mod cost;
mod dtw;
mod error;
mod matrix;
mod path;
mod preprocess;
mod series;
mod traceback;
mod window;

pub use cost::CostMethod;
pub use dtw::{Alignment, Dtw};
pub use error::DtwError;
pub use matrix::CostMatrix;
pub use path::{AlignmentStats, StepKind, WarpingPath, WarpingStep};
pub use preprocess::{Variant, derivative};
pub use series::TimeSeries;
pub use window::{
    AlignmentView, LookFor, MIN_WINDOW_SIZE, Window, WindowConfig, WindowCost, WindowSearch,
};
