//! Ensemble similarity ranking over a snapshot cache of fixed-length series.
//!
//! Combines a length-normalized DTW score, Pearson correlation and cosine
//! similarity into one weighted score, selects the exact top-k candidates
//! with a deterministic tie-break, and serves queries from an immutable
//! snapshot that a single writer rebuilds and swaps atomically.

mod cache;
mod config;
mod engine;
mod ensemble;
mod error;
mod eval;
mod patterns;
mod ranker;
mod score;
mod validation;

pub use cache::{CacheSnapshot, CacheState, CandidateEntry, RebuildGuard, RebuildSummary, SeriesStore};
pub use config::{CacheConfig, EnsembleWeights, ScorerConfig};
pub use engine::SimilarityEngine;
pub use ensemble::EnsembleScorer;
pub use error::RankError;
pub use eval::{ndcg_at_k, precision_at_k, recall_at_k};
pub use patterns::{Pattern, add_noise};
pub use ranker::{ExactRanker, SimilaritySearch};
pub use score::{Score, ScoreBreakdown, ScoredCandidate};
pub use validation::{CaseKind, ValidationCase, ValidationConfig, ValidationReport};
