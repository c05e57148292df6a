//! Weighted ensemble of the three shape metrics.

use sketchrank_series::{BandConstraint, DEFAULT_EPS, Dtw, FixedSeries, cosine, pearson, warped_score};

use crate::config::EnsembleWeights;
use crate::score::{Score, ScoreBreakdown};

/// Stateless ensemble scorer. Thread-safe and copyable.
///
/// `score = alpha * warped + beta * correlation + gamma * cosine`
///
/// Each metric already maps its undefined cases to `0.0`, and the weights are
/// finite by construction, so the result is always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleScorer {
    weights: EnsembleWeights,
    dtw: Dtw,
    eps: f64,
}

impl EnsembleScorer {
    /// Create a scorer from weights, a DTW band and a degeneracy threshold.
    #[must_use]
    pub fn new(weights: EnsembleWeights, constraint: BandConstraint, eps: f64) -> Self {
        Self {
            weights,
            dtw: Dtw::from_constraint(constraint),
            eps,
        }
    }

    /// Return the ensemble weights.
    #[must_use]
    pub fn weights(&self) -> EnsembleWeights {
        self.weights
    }

    /// Return the DTW calculator.
    #[must_use]
    pub fn dtw(&self) -> Dtw {
        self.dtw
    }

    /// Return the degeneracy threshold.
    #[must_use]
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Score `candidate` against `query`.
    #[must_use]
    pub fn score(&self, query: &FixedSeries, candidate: &FixedSeries) -> Score {
        self.breakdown(query, candidate).total
    }

    /// Score `candidate` against `query` and keep the individual components.
    #[must_use]
    pub fn breakdown(&self, query: &FixedSeries, candidate: &FixedSeries) -> ScoreBreakdown {
        let (q, c) = (query.as_slice(), candidate.as_slice());
        let warped = warped_score(&self.dtw, q, c);
        let correlation = pearson(q, c, self.eps);
        let cosine = cosine(q, c, self.eps);

        let w = &self.weights;
        let total = w.alpha() * warped + w.beta() * correlation + w.gamma() * cosine;

        ScoreBreakdown {
            warped,
            correlation,
            cosine,
            total: Score::new(total),
        }
    }
}

impl Default for EnsembleScorer {
    fn default() -> Self {
        Self::new(EnsembleWeights::default(), BandConstraint::Unconstrained, DEFAULT_EPS)
    }
}
