//! Semicolon-delimited signal CSV reader.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::domain::SignalTable;
use crate::IoError;

/// Reads preprocessed signals from a CSV file.
///
/// Expected CSV format:
/// - `;` delimiter
/// - Header row required, one named column per signal (other columns such as
///   timestamps are allowed and ignored unless requested)
/// - All rows must have the same number of columns
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::DuplicateColumn`] | Header repeats a column name |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
pub struct SignalReader {
    path: PathBuf,
    delimiter: u8,
}

impl SignalReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: b';',
        }
    }

    /// Override the field delimiter (default `;`).
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read the CSV file, returning a [`SignalTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<SignalTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so that our own InconsistentRowLength check fires
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let columns: Vec<String> = header.iter().map(|c| c.trim().to_string()).collect();

        let mut seen = HashSet::new();
        if let Some(column) = columns.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(IoError::DuplicateColumn {
                path: self.path.clone(),
                column: column.clone(),
            });
        }
        debug!(n_columns = columns.len(), "read CSV header");

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.len() != columns.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: columns.len(),
                    got: record.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_rows = rows.len(), n_columns = columns.len(), "signals loaded");
        Ok(SignalTable::new(self.path.clone(), columns, rows))
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_valid_table() {
        let f = write_csv("DateTime;ABP_SPO;CBFV_SPO\n0;1.0;2.0\n10;1.5;2.5\n20;2.0;3.0\n");
        let table = SignalReader::new(f.path()).read().unwrap();
        assert_eq!(table.columns(), &["DateTime", "ABP_SPO", "CBFV_SPO"]);
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.column("CBFV_SPO").unwrap().as_slice(), &[2.0, 2.5, 3.0]);
    }

    #[test]
    fn custom_delimiter() {
        let f = write_csv("a,b\n1,2\n");
        let table = SignalReader::new(f.path()).with_delimiter(b',').read().unwrap();
        assert_eq!(table.column("b").unwrap().as_slice(), &[2.0]);
    }

    #[test]
    fn error_file_not_found() {
        let result = SignalReader::new(Path::new("/nonexistent/file.csv")).read();
        assert!(matches!(result, Err(IoError::FileNotFound { .. })));
    }

    #[test]
    fn error_empty_dataset() {
        let f = write_csv("ABP;CBFV\n");
        let result = SignalReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::EmptyDataset { .. })));
    }

    #[test]
    fn error_inconsistent_row_length() {
        let f = write_csv("ABP;CBFV\n1;2\n3\n");
        let result = SignalReader::new(f.path()).read();
        assert!(matches!(
            result,
            Err(IoError::InconsistentRowLength { row_index: 1, expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn error_duplicate_column() {
        let f = write_csv("ABP;ABP\n1;2\n");
        let result = SignalReader::new(f.path()).read();
        assert!(matches!(result, Err(IoError::DuplicateColumn { .. })));
    }
}
