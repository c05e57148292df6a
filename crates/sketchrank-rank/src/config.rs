//! Configuration builders for ensemble scoring and cache rebuilds.

use sketchrank_series::{BandConstraint, DEFAULT_EPS};

use crate::ensemble::EnsembleScorer;
use crate::error::RankError;

/// Weights of the three similarity signals in the ensemble score.
///
/// The defaults are empirical; they need not sum to one.
///
/// | Weight  | Signal               | Default |
/// |---------|----------------------|---------|
/// | `alpha` | Warped (DTW) score   | 0.7     |
/// | `beta`  | Pearson correlation  | 0.2     |
/// | `gamma` | Cosine similarity    | 0.1     |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleWeights {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

impl EnsembleWeights {
    /// Create a weight set.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RankError::InvalidWeight`] | Any weight is NaN or infinite |
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self, RankError> {
        for (name, value) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !value.is_finite() {
                return Err(RankError::InvalidWeight { name, value });
            }
        }
        Ok(Self { alpha, beta, gamma })
    }

    /// Return the weight of the warped score.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Return the weight of the correlation.
    #[must_use]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Return the weight of the cosine similarity.
    #[must_use]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            alpha: 0.7,
            beta: 0.2,
            gamma: 0.1,
        }
    }
}

/// Configuration for an [`EnsembleScorer`].
///
/// Construct via [`ScorerConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter    | Default                        |
/// |--------------|--------------------------------|
/// | `weights`    | [`EnsembleWeights::default`]   |
/// | `constraint` | `BandConstraint::Unconstrained`|
/// | `eps`        | 1e-8                           |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerConfig {
    pub(crate) weights: EnsembleWeights,
    pub(crate) constraint: BandConstraint,
    pub(crate) eps: f64,
}

impl ScorerConfig {
    /// Create a scorer configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            weights: EnsembleWeights::default(),
            constraint: BandConstraint::Unconstrained,
            eps: DEFAULT_EPS,
        }
    }

    /// Set the ensemble weights.
    #[must_use]
    pub fn with_weights(mut self, weights: EnsembleWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the DTW warping window.
    #[must_use]
    pub fn with_constraint(mut self, constraint: BandConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    /// Set the degeneracy threshold used by correlation and cosine.
    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Build the scorer.
    #[must_use]
    pub fn build(&self) -> EnsembleScorer {
        EnsembleScorer::new(self.weights, self.constraint, self.eps)
    }
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for cache rebuilds.
///
/// # Defaults
///
/// | Parameter        | Default |
/// |------------------|---------|
/// | `min_series_len` | 30      |
/// | `eps`            | 1e-8    |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    pub(crate) min_series_len: usize,
    pub(crate) eps: f64,
}

impl CacheConfig {
    /// Create a cache configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_series_len: 30,
            eps: DEFAULT_EPS,
        }
    }

    /// Set the minimum number of finite points a candidate needs to be admitted.
    ///
    /// Values below 2 are raised to 2, the shortest series that can be resampled.
    #[must_use]
    pub fn with_min_series_len(mut self, min_series_len: usize) -> Self {
        self.min_series_len = min_series_len.max(2);
        self
    }

    /// Set the flat-series threshold used by the normalizer.
    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// Return the minimum admitted raw length.
    #[must_use]
    pub fn min_series_len(&self) -> usize {
        self.min_series_len
    }

    /// Return the normalizer's flat-series threshold.
    #[must_use]
    pub fn eps(&self) -> f64 {
        self.eps
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights() {
        let w = EnsembleWeights::default();
        assert_eq!((w.alpha(), w.beta(), w.gamma()), (0.7, 0.2, 0.1));
    }

    #[test]
    fn rejects_non_finite_weight() {
        let result = EnsembleWeights::new(0.7, f64::NAN, 0.1);
        assert!(matches!(result, Err(RankError::InvalidWeight { name: "beta", .. })));
        let result = EnsembleWeights::new(f64::INFINITY, 0.2, 0.1);
        assert!(matches!(result, Err(RankError::InvalidWeight { name: "alpha", .. })));
    }

    #[test]
    fn weights_need_not_sum_to_one() {
        assert!(EnsembleWeights::new(1.0, 1.0, 1.0).is_ok());
        assert!(EnsembleWeights::new(0.0, -0.5, 2.0).is_ok());
    }

    #[test]
    fn min_series_len_floor() {
        assert_eq!(CacheConfig::new().with_min_series_len(0).min_series_len(), 2);
        assert_eq!(CacheConfig::new().with_min_series_len(25).min_series_len(), 25);
        assert_eq!(CacheConfig::default().min_series_len(), 30);
    }

    #[test]
    fn scorer_config_builds_with_overrides() {
        let scorer = ScorerConfig::new()
            .with_constraint(BandConstraint::SakoeChibaRadius(4))
            .with_eps(1e-6)
            .build();
        assert_eq!(scorer.dtw().constraint(), BandConstraint::SakoeChibaRadius(4));
        assert_eq!(scorer.eps(), 1e-6);
    }
}
