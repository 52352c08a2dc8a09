//! File I/O, validation, and serialization for the sigwarp pipeline.

mod domain;
mod error;
mod reader;
mod writer;

pub use domain::{ExperimentName, SignalPair, SignalTable};
pub use error::IoError;
pub use reader::SignalReader;
pub use writer::{PairCost, ResultWriter};
