use std::sync::Arc;

use sketchrank_series::{FixedSeries, SeriesError, resample_and_normalize};

use crate::cache::{CacheSnapshot, RebuildSummary, SeriesStore};
use crate::config::CacheConfig;
use crate::ensemble::EnsembleScorer;
use crate::error::RankError;
use crate::ranker::ExactRanker;
use crate::score::ScoredCandidate;

/// Application-owned facade over one series cache and one ranker.
///
/// `Send + Sync`; share it behind an `Arc` between request handlers.
#[derive(Debug, Default)]
pub struct SimilarityEngine {
    store: SeriesStore,
    ranker: ExactRanker,
}

impl SimilarityEngine {
    /// Create an engine with an empty cache.
    #[must_use]
    pub fn new(scorer: EnsembleScorer, cache: CacheConfig) -> Self {
        Self {
            store: SeriesStore::new(cache),
            ranker: ExactRanker::new(scorer),
        }
    }

    /// Resample `raw` to `target_len` points and standardize it with the
    /// cache's flat-series threshold, exactly as cached candidates are prepared.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::InvalidTargetLength`] | `target_len == 0` |
    /// | [`SeriesError::TooShort`] | `raw.len() < 2` |
    pub fn resample_and_normalize(&self, raw: &[f64], target_len: usize) -> Result<FixedSeries, SeriesError> {
        resample_and_normalize(raw, target_len, self.store.config().eps())
    }

    /// Replace the cached candidates. See [`SeriesStore::rebuild`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RankError::RebuildInProgress`] | Another rebuild holds the writer slot |
    /// | [`RankError::Series`] | `target_len == 0` |
    pub fn rebuild_cache<I, K, V>(&self, candidates: I, target_len: usize) -> Result<RebuildSummary, RankError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[f64]> + Send,
    {
        self.store.rebuild(candidates, target_len)
    }

    /// Rank the current snapshot against `query`. See [`ExactRanker::rank`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RankError::InvalidK`] | `k == 0` |
    /// | [`RankError::LengthMismatch`] | Query length differs from the cached length |
    pub fn rank(&self, query: &FixedSeries, k: usize) -> Result<Vec<ScoredCandidate>, RankError> {
        self.ranker.rank(query, &self.store.snapshot(), k)
    }

    /// Return the underlying store.
    #[must_use]
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Return the ranker.
    #[must_use]
    pub fn ranker(&self) -> &ExactRanker {
        &self.ranker
    }

    /// Return the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.store.snapshot()
    }
}
