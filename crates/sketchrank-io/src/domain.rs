//! Domain types for sketchrank-io.

use serde::Deserialize;

use crate::IoError;

/// A validated run name for output file naming.
///
/// Must match `[a-zA-Z0-9_-]+`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunName(String);

impl RunName {
    /// Parse and validate a run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidRunName`] if the name is empty or contains
    /// characters outside `[a-zA-Z0-9_-]`.
    pub fn new(name: String) -> Result<Self, IoError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(IoError::InvalidRunName { name });
        }
        Ok(Self(name))
    }

    /// Return the run name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw candidate series keyed by identifier.
///
/// Produced by [`CandidateReader`](crate::CandidateReader). Identifiers and
/// series are stored in parallel vectors in file order; `ids[i]` corresponds
/// to `series[i]`. Series may differ in length and may contain NaN gaps.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    /// Candidate identifiers (for example ticker symbols).
    pub ids: Vec<String>,
    /// Raw values, one vector per identifier.
    pub series: Vec<Vec<f64>>,
}

impl CandidateSet {
    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Return `true` if there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over `(id, values)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.ids
            .iter()
            .map(String::as_str)
            .zip(self.series.iter().map(Vec::as_slice))
    }
}

/// A user-drawn query curve.
///
/// Deserialized from `{ "y": [...], "target_len": 200 }`; `target_len` is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sketch {
    /// Drawn y-values, left to right.
    pub y: Vec<f64>,
    /// Requested comparison length, if the sketch carries one.
    #[serde(default)]
    pub target_len: Option<usize>,
}
