//! Fixed-length series preparation and shape metrics.
//!
//! Pure math library with zero I/O. Turns arbitrary-length input (freehand
//! sketches, moving-average curves) into fixed-length, NaN-free standardized
//! vectors and compares them with three independent similarity signals:
//! a length-normalized DTW score, Pearson correlation and cosine similarity.

mod constraint;
mod dtw;
mod error;
mod metrics;
mod normalize;
mod resample;
mod series;

pub use constraint::BandConstraint;
pub use dtw::Dtw;
pub use error::SeriesError;
pub use metrics::{cosine, pearson, warped_score};
pub use normalize::{DEFAULT_EPS, moving_average, resample_and_normalize, z_normalize};
pub use resample::resample;
pub use series::FixedSeries;
