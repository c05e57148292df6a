//! JSON result writer for similarity and validation outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use sketchrank_rank::{CacheSnapshot, ScoredCandidate, ValidationReport};
use sketchrank_series::FixedSeries;

use crate::IoError;
use crate::domain::RunName;

/// Writes similarity and validation results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{run}_similar.json` and `{run}_validate.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    run: RunName,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), run = %run))]
    pub fn new(output_dir: &Path, run: RunName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            run,
        })
    }

    /// Write a ranked result list to `{run}_similar.json`.
    ///
    /// Each item carries the candidate's normalized vector from `snapshot` and
    /// the normalized sketch, so a client can overlay the two curves.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] if the file
    /// cannot be produced.
    #[instrument(skip_all, fields(n = ranked.len()))]
    pub fn write_similar(
        &self,
        sketch_norm: &FixedSeries,
        snapshot: &CacheSnapshot,
        ranked: &[ScoredCandidate],
    ) -> Result<PathBuf, IoError> {
        let items: Vec<SimilarItem> = ranked
            .iter()
            .map(|c| SimilarItem {
                ticker: &c.id,
                score: c.score.value(),
                rank: c.rank,
                series_norm: snapshot
                    .get(&c.id)
                    .map_or(&[][..], |entry| entry.vector().as_slice()),
                sketch_norm: sketch_norm.as_slice(),
            })
            .collect();

        let artifact = SimilarArtifact {
            run: self.run.as_str(),
            target_len: snapshot.target_len(),
            generation: snapshot.generation(),
            n_candidates: snapshot.len(),
            items,
        };

        let path = self.write_artifact("similar", &artifact)?;
        info!(path = %path.display(), "similarity result written");
        Ok(path)
    }

    /// Write a validation report to `{run}_validate.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`] if the file
    /// cannot be produced.
    #[instrument(skip_all)]
    pub fn write_validation(&self, report: &ValidationReport) -> Result<PathBuf, IoError> {
        let cases: Vec<CaseEntry> = report
            .cases
            .iter()
            .map(|c| CaseEntry {
                query: c.query.name(),
                kind: c.kind.name(),
                noise: c.noise,
                retrieved: &c.retrieved,
                dissimilar: &c.dissimilar,
                precision: c.precision,
                recall: c.recall,
                ndcg: c.ndcg,
                top_hit: c.top_hit(),
                dissimilar_excluded: c.dissimilar_excluded(),
            })
            .collect();

        let artifact = ValidateArtifact {
            run: self.run.as_str(),
            mean_precision: report.mean_precision,
            mean_recall: report.mean_recall,
            mean_ndcg: report.mean_ndcg,
            hit_rate: report.hit_rate,
            exclusion_rate: report.exclusion_rate,
            cases,
        };

        let path = self.write_artifact("validate", &artifact)?;
        info!(path = %path.display(), "validation result written");
        Ok(path)
    }

    fn write_artifact<T: Serialize>(&self, suffix: &str, artifact: &T) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_{suffix}.json", self.run.as_str()));

        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct SimilarArtifact<'a> {
    run: &'a str,
    target_len: usize,
    generation: u64,
    n_candidates: usize,
    items: Vec<SimilarItem<'a>>,
}

#[derive(Serialize)]
struct SimilarItem<'a> {
    ticker: &'a str,
    score: f64,
    rank: usize,
    series_norm: &'a [f64],
    sketch_norm: &'a [f64],
}

#[derive(Serialize)]
struct ValidateArtifact<'a> {
    run: &'a str,
    mean_precision: f64,
    mean_recall: f64,
    mean_ndcg: f64,
    hit_rate: f64,
    exclusion_rate: f64,
    cases: Vec<CaseEntry<'a>>,
}

#[derive(Serialize)]
struct CaseEntry<'a> {
    query: &'static str,
    kind: &'static str,
    noise: f64,
    retrieved: &'a [String],
    dissimilar: &'a [String],
    precision: f64,
    recall: f64,
    ndcg: f64,
    top_hit: bool,
    dissimilar_excluded: bool,
}
