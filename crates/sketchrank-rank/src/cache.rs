//! Snapshot cache of normalized candidate series.
//!
//! Readers clone the current `Arc<CacheSnapshot>` and rank against it without
//! holding any lock. A single writer builds a replacement snapshot off to the
//! side and swaps it in under a brief write lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use sketchrank_series::{FixedSeries, SeriesError, resample_and_normalize};

use crate::config::CacheConfig;
use crate::error::RankError;

/// One admitted candidate: an identifier and its normalized vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
    id: String,
    vector: FixedSeries,
}

impl CandidateEntry {
    /// Return the candidate identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Return the normalized, fixed-length vector.
    #[must_use]
    pub fn vector(&self) -> &FixedSeries {
        &self.vector
    }
}

/// Immutable, fully built set of candidates sharing one fixed length.
///
/// Entries are sorted by identifier. Generation 0 is the never-built snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    entries: Vec<CandidateEntry>,
    target_len: usize,
    generation: u64,
}

impl CacheSnapshot {
    /// The snapshot served before the first rebuild.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            target_len: 0,
            generation: 0,
        }
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` if the snapshot holds no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fixed length of every vector in this snapshot.
    #[must_use]
    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Rebuild counter; increases by one with every published snapshot.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All entries, sorted by identifier.
    #[must_use]
    pub fn entries(&self) -> &[CandidateEntry] {
        &self.entries
    }

    /// Look up a candidate by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CandidateEntry> {
        self.entries
            .binary_search_by(|e| e.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Iterate over entries in identifier order.
    pub fn iter(&self) -> std::slice::Iter<'_, CandidateEntry> {
        self.entries.iter()
    }
}

impl Default for CacheSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Observable lifecycle of a [`SeriesStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No snapshot has been published yet and no rebuild is running.
    Empty,
    /// A rebuild holds the writer slot. Readers still see the prior snapshot.
    Building,
    /// At least one snapshot has been published.
    Ready,
}

/// Outcome of a completed rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildSummary {
    /// Candidates admitted into the new snapshot.
    pub count: usize,
    /// Candidates skipped for having fewer points than the configured minimum.
    pub skipped_count: usize,
    /// Fixed length of the new snapshot.
    pub target_len: usize,
    /// Generation number of the new snapshot.
    pub generation: u64,
}

/// Holder of the current snapshot, with a single rebuild slot.
#[derive(Debug)]
pub struct SeriesStore {
    config: CacheConfig,
    current: RwLock<Arc<CacheSnapshot>>,
    rebuild_slot: Mutex<()>,
}

impl SeriesStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            current: RwLock::new(Arc::new(CacheSnapshot::empty())),
            rebuild_slot: Mutex::new(()),
        }
    }

    /// Return the store's configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the current snapshot. Never blocks on a running rebuild.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Return the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> CacheState {
        if self.rebuild_slot.is_locked() {
            CacheState::Building
        } else if self.current.read().generation == 0 {
            CacheState::Empty
        } else {
            CacheState::Ready
        }
    }

    /// Claim the rebuild slot without blocking.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RankError::RebuildInProgress`] | Another guard is alive |
    pub fn begin_rebuild(&self) -> Result<RebuildGuard<'_>, RankError> {
        match self.rebuild_slot.try_lock() {
            Some(slot) => Ok(RebuildGuard { store: self, _slot: slot }),
            None => {
                warn!("rejected cache rebuild: another rebuild is in progress");
                Err(RankError::RebuildInProgress)
            }
        }
    }

    /// Build a snapshot from `candidates` and swap it in.
    ///
    /// Shorthand for [`begin_rebuild`](Self::begin_rebuild) followed by
    /// [`RebuildGuard::publish`].
    ///
    /// # Errors
    ///
    /// See [`begin_rebuild`](Self::begin_rebuild) and [`RebuildGuard::publish`].
    pub fn rebuild<I, K, V>(&self, candidates: I, target_len: usize) -> Result<RebuildSummary, RankError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[f64]> + Send,
    {
        self.begin_rebuild()?.publish(candidates, target_len)
    }
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// Exclusive right to publish the next snapshot. Dropping it releases the slot.
#[derive(Debug)]
pub struct RebuildGuard<'a> {
    store: &'a SeriesStore,
    _slot: MutexGuard<'a, ()>,
}

impl RebuildGuard<'_> {
    /// Normalize `candidates` to `target_len` and publish them as the new snapshot.
    ///
    /// Candidates with fewer finite points than the configured minimum are
    /// skipped and counted; missing (NaN) cells do not count toward the minimum. When an identifier appears more than once, the last
    /// occurrence wins.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RankError::Series`] (`InvalidTargetLength`) | `target_len == 0`; the current snapshot is kept |
    #[instrument(skip(self, candidates))]
    pub fn publish<I, K, V>(self, candidates: I, target_len: usize) -> Result<RebuildSummary, RankError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[f64]> + Send,
    {
        if target_len == 0 {
            return Err(SeriesError::InvalidTargetLength { target_len }.into());
        }

        let mut unique: BTreeMap<String, V> = BTreeMap::new();
        for (id, series) in candidates {
            let id = id.into();
            if unique.contains_key(&id) {
                debug!(id = %id, "duplicate candidate id, keeping the last occurrence");
            }
            unique.insert(id, series);
        }

        let config = self.store.config;
        let total = unique.len();
        let entries: Vec<CandidateEntry> = unique
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .filter_map(|(id, series)| {
                let raw = series.as_ref();
                let finite = raw.iter().filter(|v| v.is_finite()).count();
                if finite < config.min_series_len {
                    debug!(id = %id, len = raw.len(), finite, "skipping short candidate");
                    return None;
                }
                resample_and_normalize(raw, target_len, config.eps)
                    .ok()
                    .map(|vector| CandidateEntry { id, vector })
            })
            .collect();

        let count = entries.len();
        let skipped_count = total - count;

        let generation = {
            let mut current = self.store.current.write();
            let generation = current.generation + 1;
            *current = Arc::new(CacheSnapshot {
                entries,
                target_len,
                generation,
            });
            generation
        };

        info!(count, skipped_count, generation, "cache rebuilt");

        Ok(RebuildSummary {
            count,
            skipped_count,
            target_len,
            generation,
        })
    }
}
