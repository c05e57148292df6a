use std::cmp::Ordering;
use std::fmt;

/// A finite ensemble similarity score. Larger is more similar.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    /// Create a score, mapping non-finite values to `0.0` and `-0.0` to `0.0`
    /// so that [`Score::total_cmp`] treats all zeros as ties.
    pub(crate) fn new(value: f64) -> Self {
        if value.is_finite() && value != 0.0 {
            Self(value)
        } else {
            Self(0.0)
        }
    }

    /// Return the raw score value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// Per-metric components of one ensemble score, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Negated, length-normalized DTW cost (`<= 0`).
    pub warped: f64,
    /// Pearson correlation in `[-1, 1]`.
    pub correlation: f64,
    /// Cosine similarity in `[-1, 1]`.
    pub cosine: f64,
    /// Weighted sum of the three components.
    pub total: Score,
}

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Candidate identifier (for example a ticker symbol).
    pub id: String,
    /// Ensemble score against the query.
    pub score: Score,
    /// One-based position in the result list.
    pub rank: usize,
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::Score;

    #[test]
    fn roundtrip() {
        let score = Score::new(-0.125);
        assert_eq!(score.value(), -0.125);
    }

    #[test]
    fn display_format() {
        assert_eq!(format!("{}", Score::new(1.5)), "1.500000");
    }

    #[test]
    fn non_finite_becomes_zero() {
        assert_eq!(Score::new(f64::NAN).value(), 0.0);
        assert_eq!(Score::new(f64::NEG_INFINITY).value(), 0.0);
    }

    #[test]
    fn negative_zero_ties_with_zero() {
        assert_eq!(Score::new(-0.0).total_cmp(&Score::new(0.0)), Ordering::Equal);
    }

    #[test]
    fn total_cmp_ordering() {
        let a = Score::new(-1.0);
        let b = Score::new(0.5);
        assert_eq!(a.total_cmp(&b), Ordering::Less);
        assert_eq!(b.total_cmp(&a), Ordering::Greater);
    }
}
