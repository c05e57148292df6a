//! Exact top-k selection over a cache snapshot.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::{debug, instrument};

use sketchrank_series::FixedSeries;

use crate::cache::{CacheSnapshot, CandidateEntry};
use crate::ensemble::EnsembleScorer;
use crate::error::RankError;
use crate::score::{Score, ScoredCandidate};

/// A strategy that returns the `k` best candidates for a query.
///
/// [`ExactRanker`] scores every candidate. An approximate index can implement
/// the same trait as long as it honors the ordering and error contract.
pub trait SimilaritySearch: Send + Sync {
    /// Return at most `k` candidates by descending score, ties by ascending id.
    ///
    /// # Errors
    ///
    /// Implementations return the same errors as [`ExactRanker::rank`].
    fn search(
        &self,
        query: &FixedSeries,
        snapshot: &CacheSnapshot,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, RankError>;
}

/// Brute-force ranker: scores every candidate in parallel, then selects.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExactRanker {
    scorer: EnsembleScorer,
}

impl ExactRanker {
    /// Create a ranker around an ensemble scorer.
    #[must_use]
    pub fn new(scorer: EnsembleScorer) -> Self {
        Self { scorer }
    }

    /// Return the scorer.
    #[must_use]
    pub fn scorer(&self) -> &EnsembleScorer {
        &self.scorer
    }

    /// Rank the candidates of `snapshot` against `query`.
    ///
    /// Results are sorted by non-increasing score, equal scores by ascending
    /// identifier, and carry 1-based ranks. Returns every candidate when `k`
    /// exceeds the snapshot size, and an empty list for an empty snapshot.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RankError::InvalidK`] | `k == 0` |
    /// | [`RankError::LengthMismatch`] | Snapshot is non-empty and `query.len() != snapshot.target_len()` |
    #[instrument(skip_all, fields(n = snapshot.len(), k = k))]
    pub fn rank(
        &self,
        query: &FixedSeries,
        snapshot: &CacheSnapshot,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, RankError> {
        if k == 0 {
            return Err(RankError::InvalidK { k });
        }
        if snapshot.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != snapshot.target_len() {
            return Err(RankError::LengthMismatch {
                expected: snapshot.target_len(),
                got: query.len(),
            });
        }

        let mut scored: Vec<(&CandidateEntry, Score)> = snapshot
            .entries()
            .par_iter()
            .map(|entry| (entry, self.scorer.score(query, entry.vector())))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_rank);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_rank);

        if let Some((best, score)) = scored.first() {
            debug!(best = best.id(), score = score.value(), "ranking complete");
        }

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(i, (entry, score))| ScoredCandidate {
                id: entry.id().to_owned(),
                score,
                rank: i + 1,
            })
            .collect())
    }
}

/// Descending score, then ascending id.
fn by_rank(a: &(&CandidateEntry, Score), b: &(&CandidateEntry, Score)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.id().cmp(b.0.id()))
}

impl SimilaritySearch for ExactRanker {
    fn search(
        &self,
        query: &FixedSeries,
        snapshot: &CacheSnapshot,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, RankError> {
        self.rank(query, snapshot, k)
    }
}
