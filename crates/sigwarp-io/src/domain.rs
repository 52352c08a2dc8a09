//! Domain types for sigwarp-io.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use sigwarp_dtw::TimeSeries;

use crate::IoError;

/// A validated experiment name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentName(String);

impl ExperimentName {
    /// Parse and validate an experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the name is empty or
    /// contains characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidExperimentName { name });
        }
        Ok(Self(name))
    }

    /// Derive an experiment name from a file stem, replacing disallowed
    /// characters with `_`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidExperimentName`] if the path has no stem.
    pub fn from_file_stem(path: &Path) -> Result<Self, IoError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sanitized: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        Self::new(sanitized)
    }

    /// Return the experiment name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ExperimentName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two signal columns to align against each other, written `X:Y`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalPair {
    /// Column aligned as the first sequence.
    pub x: String,
    /// Column aligned as the second sequence.
    pub y: String,
}

impl SignalPair {
    /// Header label for this pair, `X-Y`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}", self.x, self.y)
    }
}

impl FromStr for SignalPair {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((x, y)) if !x.is_empty() && !y.is_empty() && !y.contains(':') => Ok(Self {
                x: x.to_string(),
                y: y.to_string(),
            }),
            _ => Err(IoError::InvalidPair { input: s.to_string() }),
        }
    }
}

impl std::fmt::Display for SignalPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// Raw rows of a signal CSV file, parsed into numeric columns on demand.
///
/// Produced by [`SignalReader`](crate::SignalReader). Cells are kept as text
/// so non-signal columns such as timestamps never need to parse.
#[derive(Debug)]
pub struct SignalTable {
    path: PathBuf,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SignalTable {
    pub(crate) fn new(path: PathBuf, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { path, columns, rows }
    }

    /// Column names from the header, in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of data rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Parse one column into a validated [`TimeSeries`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::MissingColumn`] | No header entry named `name` |
    /// | [`IoError::NonFiniteValue`] | A cell is NaN, Inf, or unparseable |
    pub fn column(&self, name: &str) -> Result<TimeSeries, IoError> {
        let col = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })?;

        let values = self
            .rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                let raw = row[col].trim();
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        column: name.to_string(),
                        raw: raw.to_string(),
                    })
            })
            .collect::<Result<Vec<f64>, IoError>>()?;

        // rows are non-empty and every value is finite
        TimeSeries::new(values).map_err(|_| IoError::EmptyDataset {
            path: self.path.clone(),
        })
    }

    /// Parse both columns of a pair.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`SignalTable::column`].
    pub fn pair(&self, pair: &SignalPair) -> Result<(TimeSeries, TimeSeries), IoError> {
        Ok((self.column(&pair.x)?, self.column(&pair.y)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_name_valid() {
        let name = ExperimentName::new("my-experiment_01".to_string()).unwrap();
        assert_eq!(name.as_str(), "my-experiment_01");
    }

    #[test]
    fn experiment_name_rejects_special_chars() {
        let name = ExperimentName::new("my experiment!".to_string());
        assert!(matches!(name, Err(IoError::InvalidExperimentName { .. })));
    }

    #[test]
    fn experiment_name_from_stem() {
        let name = ExperimentName::from_file_stem(Path::new("/data/p01 rest.v2.csv")).unwrap();
        assert_eq!(name.as_str(), "p01_rest_v2");
    }

    #[test]
    fn pair_parse_and_label() {
        let pair: SignalPair = "ABP_SPO:CBFV_SPO".parse().unwrap();
        assert_eq!(pair.x, "ABP_SPO");
        assert_eq!(pair.y, "CBFV_SPO");
        assert_eq!(pair.label(), "ABP_SPO-CBFV_SPO");
        assert_eq!(pair.to_string(), "ABP_SPO:CBFV_SPO");
    }

    #[test]
    fn pair_rejects_malformed() {
        for input in ["ABP", ":CBFV", "ABP:", "A:B:C"] {
            assert!(
                matches!(input.parse::<SignalPair>(), Err(IoError::InvalidPair { .. })),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn column_parses_and_validates() {
        let table = SignalTable::new(
            PathBuf::from("mem.csv"),
            vec!["DateTime".into(), "ABP".into(), "CBFV".into()],
            vec![
                vec!["10:00".into(), "1.5".into(), "2".into()],
                vec!["10:01".into(), " 2.5 ".into(), "nan".into()],
            ],
        );
        assert_eq!(table.column("ABP").unwrap().as_slice(), &[1.5, 2.5]);
        assert!(matches!(
            table.column("CBFV"),
            Err(IoError::NonFiniteValue { row_index: 1, .. })
        ));
        assert!(matches!(
            table.column("Toxa"),
            Err(IoError::MissingColumn { .. })
        ));
    }
}
