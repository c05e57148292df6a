//! Reference chart shapes for synthetic retrieval checks.

use std::f64::consts::PI;
use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::RankError;

/// A canonical chart shape on the unit interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Straight rise from 0 to 1.
    Uptrend,
    /// Straight fall from 1 to 0.
    Downtrend,
    /// Rise to 1 at the midpoint, then fall back to 0.
    Peak,
    /// Fall to 0 at the midpoint, then rise back to 1.
    Valley,
    /// Two full sine periods around 0.5.
    Sine,
    /// Constant 0.5.
    Flat,
}

impl Pattern {
    /// The patterns with a distinguishable shape (everything except [`Pattern::Flat`]).
    pub const SHAPES: [Pattern; 5] = [
        Pattern::Uptrend,
        Pattern::Downtrend,
        Pattern::Peak,
        Pattern::Valley,
        Pattern::Sine,
    ];

    /// The mirror-image shape, if there is one.
    #[must_use]
    pub fn opposite(self) -> Option<Pattern> {
        match self {
            Pattern::Uptrend => Some(Pattern::Downtrend),
            Pattern::Downtrend => Some(Pattern::Uptrend),
            Pattern::Peak => Some(Pattern::Valley),
            Pattern::Valley => Some(Pattern::Peak),
            Pattern::Sine | Pattern::Flat => None,
        }
    }

    /// Lowercase name, used as an identifier prefix.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Pattern::Uptrend => "uptrend",
            Pattern::Downtrend => "downtrend",
            Pattern::Peak => "peak",
            Pattern::Valley => "valley",
            Pattern::Sine => "sine",
            Pattern::Flat => "flat",
        }
    }

    /// Sample the shape at `len` evenly spaced points of `[0, 1]`.
    #[must_use]
    pub fn generate(self, len: usize) -> Vec<f64> {
        let denom = (len.max(2) - 1) as f64;
        (0..len)
            .map(|i| {
                let x = i as f64 / denom;
                match self {
                    Pattern::Uptrend => x,
                    Pattern::Downtrend => 1.0 - x,
                    Pattern::Peak if x < 0.5 => 2.0 * x,
                    Pattern::Peak => 2.0 * (1.0 - x),
                    Pattern::Valley if x < 0.5 => 1.0 - 2.0 * x,
                    Pattern::Valley => 2.0 * x - 1.0,
                    Pattern::Sine => 0.5 + 0.5 * (4.0 * PI * x).sin(),
                    Pattern::Flat => 0.5,
                }
            })
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Add independent Gaussian noise with standard deviation `level` to each value.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RankError::InvalidNoiseLevel`] | `level` is negative or not finite |
pub fn add_noise<R: Rng + ?Sized>(values: &[f64], level: f64, rng: &mut R) -> Result<Vec<f64>, RankError> {
    if !level.is_finite() || level < 0.0 {
        return Err(RankError::InvalidNoiseLevel { level });
    }
    if level == 0.0 {
        return Ok(values.to_vec());
    }
    let normal = Normal::new(0.0, level).map_err(|_| RankError::InvalidNoiseLevel { level })?;
    Ok(values.iter().map(|v| v + normal.sample(&mut *rng)).collect())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn shapes_hit_their_landmarks() {
        let up = Pattern::Uptrend.generate(11);
        assert_eq!((up[0], up[10]), (0.0, 1.0));

        let down = Pattern::Downtrend.generate(11);
        assert_eq!((down[0], down[10]), (1.0, 0.0));

        let peak = Pattern::Peak.generate(11);
        assert_eq!((peak[0], peak[5], peak[10]), (0.0, 1.0, 0.0));

        let valley = Pattern::Valley.generate(11);
        assert_eq!((valley[0], valley[5], valley[10]), (1.0, 0.0, 1.0));

        assert!(Pattern::Flat.generate(7).iter().all(|&v| v == 0.5));
    }

    #[test]
    fn sine_stays_in_unit_band() {
        let sine = Pattern::Sine.generate(200);
        assert!(sine.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!((sine[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn generate_handles_tiny_lengths() {
        assert!(Pattern::Peak.generate(0).is_empty());
        assert_eq!(Pattern::Uptrend.generate(1), vec![0.0]);
    }

    #[test]
    fn shapes_excludes_flat() {
        assert!(!Pattern::SHAPES.contains(&Pattern::Flat));
        assert_eq!(Pattern::Sine.to_string(), "sine");
    }

    #[test]
    fn opposites_are_mirrored() {
        for shape in Pattern::SHAPES {
            if let Some(other) = shape.opposite() {
                assert_eq!(other.opposite(), Some(shape));
                let a = shape.generate(21);
                let b = other.generate(21);
                assert!(a.iter().zip(&b).all(|(x, y)| (x + y - 1.0).abs() < 1e-12));
            }
        }
        assert_eq!(Pattern::Sine.opposite(), None);
        assert_eq!(Pattern::Flat.opposite(), None);
    }

    #[test]
    fn noise_is_seeded() {
        let base = Pattern::Uptrend.generate(50);
        let a = add_noise(&base, 0.1, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = add_noise(&base, 0.1, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, base);
    }

    #[test]
    fn zero_noise_is_identity() {
        let base = Pattern::Valley.generate(20);
        let out = add_noise(&base, 0.0, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert_eq!(out, base);
    }

    #[test]
    fn invalid_noise_level_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            add_noise(&[1.0], -0.1, &mut rng),
            Err(RankError::InvalidNoiseLevel { .. })
        ));
        assert!(matches!(
            add_noise(&[1.0], f64::NAN, &mut rng),
            Err(RankError::InvalidNoiseLevel { .. })
        ));
    }
}
