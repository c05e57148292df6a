//! Wide CSV candidate reader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::CandidateSet;

/// Reads candidate series from a wide CSV file.
///
/// Expected CSV format:
/// - Header row required (first column is the identifier, remaining are positional time steps)
/// - `id,t0,t1,...,tn`
/// - One row per candidate. Rows may be shorter or longer than the header;
///   trailing empty cells are dropped so candidates can have different lengths
/// - An empty cell or `NaN` inside a row is a missing value and is kept as NaN
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::MissingId`] | Identifier cell is empty |
/// | [`IoError::InvalidValue`] | Non-empty cell is not a float |
/// | [`IoError::DuplicateId`] | Same identifier appears twice |
pub struct CandidateReader {
    path: PathBuf,
}

impl CandidateReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the CSV file, returning a [`CandidateSet`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<CandidateSet, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        debug!(columns = header.len(), "read CSV header");

        let mut set = CandidateSet::default();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;

            let id = record.get(0).unwrap_or("").to_string();
            if id.is_empty() {
                return Err(IoError::MissingId {
                    path: self.path.clone(),
                    row_index,
                });
            }

            if let Some(&first_row) = seen.get(&id) {
                return Err(IoError::DuplicateId {
                    path: self.path.clone(),
                    id,
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(id.clone(), row_index);

            let cells: Vec<&str> = record.iter().skip(1).collect();
            let used = cells.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);

            let mut values = Vec::with_capacity(used);
            for (col_index, raw) in cells[..used].iter().enumerate() {
                values.push(self.parse_cell(raw, row_index, col_index)?);
            }

            set.ids.push(id);
            set.series.push(values);
        }

        if set.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_candidates = set.len(),
            max_len = set.series.iter().map(Vec::len).max().unwrap_or(0),
            "candidates loaded"
        );

        Ok(set)
    }

    fn parse_cell(&self, raw: &str, row_index: usize, col_index: usize) -> Result<f64, IoError> {
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return Ok(f64::NAN);
        }
        raw.parse().map_err(|_| IoError::InvalidValue {
            path: self.path.clone(),
            row_index,
            col_index,
            raw: raw.to_string(),
        })
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
