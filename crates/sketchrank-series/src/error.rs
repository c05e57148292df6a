//! Error types for series preparation.

/// Errors from resampling, normalization and series validation.
///
/// Degenerate data (flat or all-NaN series) is never an error; it is absorbed
/// by the documented fallbacks in [`z_normalize`](crate::z_normalize) and the
/// metric functions.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// Returned when a raw series has fewer than two points to interpolate between.
    #[error("series must have at least 2 points, got {len}")]
    TooShort {
        /// Length of the rejected series.
        len: usize,
    },

    /// Returned when the requested output length is zero.
    #[error("target length must be at least 1, got {target_len}")]
    InvalidTargetLength {
        /// The invalid target length.
        target_len: usize,
    },

    /// Returned when an empty vector is provided as a fixed series.
    #[error("fixed series must be non-empty")]
    EmptySeries,

    /// Returned when a fixed series contains NaN, infinity, or negative infinity.
    #[error("fixed series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when a moving-average window of zero is requested.
    #[error("moving-average window must be at least 1, got {window}")]
    InvalidWindow {
        /// The invalid window.
        window: usize,
    },

    /// Returned when the series is shorter than the moving-average window.
    #[error("series of length {len} is shorter than the moving-average window {window}")]
    WindowTooLarge {
        /// Length of the input series.
        len: usize,
        /// Requested window.
        window: usize,
    },
}
