//! CSV and JSON result writer for alignment outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sigwarp_dtw::{AlignmentView, CostMethod, StepKind, WindowCost, WindowSearch};
use tracing::{debug, info, instrument};

use crate::domain::{ExperimentName, SignalPair};
use crate::IoError;

/// Full-sequence cost of one signal pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairCost {
    /// The aligned pair.
    pub pair: SignalPair,
    /// Scalar alignment cost.
    pub cost: f64,
}

/// Writes alignment results into an output directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are prefixed with the experiment name.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write per-window costs of several pairs to `{experiment}_windows.csv`.
    ///
    /// The table is `;`-delimited with header `Window;<X-Y>...` and one row
    /// per window, the window rendered as `[start, end]`. Every pair must
    /// have been cut into the same windows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::MismatchedWindows`] | A pair's windows differ from the first pair's |
    /// | [`IoError::CsvWrite`] | The table cannot be written |
    #[instrument(skip_all, fields(n_pairs = columns.len()))]
    pub fn write_window_costs(
        &self,
        columns: &[(SignalPair, Vec<WindowCost>)],
    ) -> Result<PathBuf, IoError> {
        let path = self.file_path("windows.csv");

        let windows: Vec<_> = columns
            .first()
            .map(|(_, costs)| costs.iter().map(|c| c.window).collect())
            .unwrap_or_default();
        for (pair, costs) in columns {
            if costs.len() != windows.len() || costs.iter().zip(&windows).any(|(c, w)| c.window != *w) {
                return Err(IoError::MismatchedWindows { pair: pair.label() });
            }
        }

        let csv_err = |source: csv::Error| IoError::CsvWrite {
            path: path.clone(),
            source,
        };
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b';')
            .from_path(&path)
            .map_err(csv_err)?;

        let mut header = vec!["Window".to_string()];
        header.extend(columns.iter().map(|(pair, _)| pair.label()));
        wtr.write_record(&header).map_err(csv_err)?;

        for (row, window) in windows.iter().enumerate() {
            let mut record = vec![window.to_string()];
            record.extend(columns.iter().map(|(_, costs)| costs[row].cost.to_string()));
            wtr.write_record(&record).map_err(csv_err)?;
        }
        wtr.flush().map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), n_windows = windows.len(), "window costs written");
        Ok(path)
    }

    /// Write full-sequence costs to `{experiment}_align.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] or [`IoError::Serialize`] on failure.
    #[instrument(skip_all)]
    pub fn write_align(
        &self,
        method: CostMethod,
        variant: &str,
        costs: &[PairCost],
    ) -> Result<PathBuf, IoError> {
        let path = self.file_path("align.json");
        let artifact = AlignArtifact {
            experiment: self.experiment.as_str(),
            method: method.as_str(),
            variant,
            pairs: costs
                .iter()
                .map(|c| PairEntry {
                    pair: c.pair.label(),
                    cost: c.cost,
                })
                .collect(),
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "alignment costs written");
        Ok(path)
    }

    /// Write a window search aggregate to `{experiment}_search.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] or [`IoError::Serialize`] on failure.
    #[instrument(skip_all)]
    pub fn write_search(
        &self,
        pair: &SignalPair,
        method: CostMethod,
        search: &WindowSearch,
    ) -> Result<PathBuf, IoError> {
        let path = self.file_path("search.json");
        let artifact = SearchArtifact {
            experiment: self.experiment.as_str(),
            pair: pair.label(),
            method: method.as_str(),
            look_for: search.look_for.as_str(),
            value: search.value,
            extremal: search
                .extremal_windows()
                .map(|(index, w)| ExtremalEntry {
                    index,
                    start: w.start,
                    end: w.end,
                })
                .collect(),
            costs: search
                .costs
                .iter()
                .map(|c| WindowEntry {
                    start: c.window.start,
                    end: c.window.end,
                    cost: c.cost,
                })
                .collect(),
        };
        self.write_json(&path, &artifact)?;
        info!(path = %path.display(), "window search written");
        Ok(path)
    }

    /// Write plotting data of one window to `{experiment}_{X-Y}_w{index}.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] or [`IoError::Serialize`] on failure.
    #[instrument(skip(self, pair, view))]
    pub fn write_alignment_view(
        &self,
        pair: &SignalPair,
        index: usize,
        view: &AlignmentView,
    ) -> Result<PathBuf, IoError> {
        let path = self.file_path(&format!("{}_w{index}.json", pair.label()));
        let artifact = ViewArtifact {
            pair: pair.label(),
            x_signal: &pair.x,
            y_signal: &pair.y,
            start: view.window.start,
            end: view.window.end,
            x: &view.x,
            y: &view.y,
            cost_matrix: &view.matrix,
            path: view
                .path
                .steps()
                .iter()
                .map(|s| PathEntry {
                    a: s.a,
                    b: s.b,
                    step: match s.kind {
                        StepKind::Match => "match",
                        StepKind::Insertion => "insertion",
                        StepKind::Deletion => "deletion",
                    },
                })
                .collect(),
        };
        self.write_json(&path, &artifact)?;
        debug!(path = %path.display(), "alignment view written");
        Ok(path)
    }

    fn file_path(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{suffix}", self.experiment.as_str()))
    }

    fn write_json<T: Serialize>(&self, path: &Path, artifact: &T) -> Result<(), IoError> {
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| IoError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct AlignArtifact<'a> {
    experiment: &'a str,
    method: &'a str,
    variant: &'a str,
    pairs: Vec<PairEntry>,
}

#[derive(Serialize)]
struct PairEntry {
    pair: String,
    cost: f64,
}

#[derive(Serialize)]
struct SearchArtifact<'a> {
    experiment: &'a str,
    pair: String,
    method: &'a str,
    look_for: &'a str,
    value: f64,
    extremal: Vec<ExtremalEntry>,
    costs: Vec<WindowEntry>,
}

#[derive(Serialize)]
struct ExtremalEntry {
    index: usize,
    start: usize,
    end: usize,
}

#[derive(Serialize)]
struct WindowEntry {
    start: usize,
    end: usize,
    cost: f64,
}

#[derive(Serialize)]
struct ViewArtifact<'a> {
    pair: String,
    x_signal: &'a str,
    y_signal: &'a str,
    start: usize,
    end: usize,
    x: &'a [f64],
    y: &'a [f64],
    cost_matrix: &'a [Vec<f64>],
    path: Vec<PathEntry>,
}

#[derive(Serialize)]
struct PathEntry {
    a: usize,
    b: usize,
    step: &'static str,
}
