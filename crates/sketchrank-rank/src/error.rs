use sketchrank_series::SeriesError;

/// Errors from scoring configuration, ranking and cache rebuilds.
#[derive(Debug, thiserror::Error)]
pub enum RankError {
    /// Returned when k is zero.
    #[error("k must be at least 1, got {k}")]
    InvalidK {
        /// The invalid k value provided.
        k: usize,
    },

    /// Returned when an ensemble weight is NaN or infinite.
    #[error("ensemble weight {name} must be finite, got {value}")]
    InvalidWeight {
        /// Weight name (`alpha`, `beta` or `gamma`).
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Returned when the query length differs from the cache's fixed length.
    #[error("query has {got} points but the cache holds series of length {expected}")]
    LengthMismatch {
        /// The cache's fixed length.
        expected: usize,
        /// Length of the rejected query.
        got: usize,
    },

    /// Returned when a rebuild is requested while another one is still running.
    #[error("cache rebuild already in progress")]
    RebuildInProgress,

    /// Returned when a synthetic noise level is negative or not finite.
    #[error("noise level must be finite and non-negative, got {level}")]
    InvalidNoiseLevel {
        /// The rejected noise level.
        level: f64,
    },

    /// Wraps an input validation error from series preparation.
    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}
