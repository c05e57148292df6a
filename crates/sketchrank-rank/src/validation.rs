//! Synthetic retrieval check: can the engine find a shape's own family?
//!
//! A library is built from every [`Pattern::SHAPES`] entry (the clean shape plus
//! `variants` noisy copies) and a flat distractor. Each shape is then queried
//! as-is, with low noise and with high noise; the shape's whole family counts
//! as relevant. Shapes with a mirror image are also queried once more to check
//! that the mirrored family stays out of the top `k`.

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use sketchrank_series::{DEFAULT_EPS, SeriesError, z_normalize};

use crate::config::{CacheConfig, ScorerConfig};
use crate::engine::SimilarityEngine;
use crate::error::RankError;
use crate::eval::{ndcg_at_k, precision_at_k, recall_at_k};
use crate::patterns::{Pattern, add_noise};

/// Configuration for a synthetic validation run.
///
/// # Defaults
///
/// | Parameter    | Default                     |
/// |--------------|-----------------------------|
/// | `length`     | 200                         |
/// | `k`          | 5                           |
/// | `noise`      | 0.1                         |
/// | `high_noise` | 0.3                         |
/// | `variants`   | 3                           |
/// | `seed`       | 42                          |
/// | `scorer`     | [`ScorerConfig::default`]   |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationConfig {
    pub(crate) length: usize,
    pub(crate) k: usize,
    pub(crate) noise: f64,
    pub(crate) high_noise: f64,
    pub(crate) variants: usize,
    pub(crate) seed: u64,
    pub(crate) scorer: ScorerConfig,
}

impl ValidationConfig {
    /// Create a validation configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            length: 200,
            k: 5,
            noise: 0.1,
            high_noise: 0.3,
            variants: 3,
            seed: 42,
            scorer: ScorerConfig::default(),
        }
    }

    /// Set the number of points per pattern (and the cached length).
    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Set the number of results retrieved per query.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the noise standard deviation of the library copies and of the
    /// low-noise queries, relative to a standardized pattern.
    #[must_use]
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the noise standard deviation of the high-noise queries.
    #[must_use]
    pub fn with_high_noise(mut self, high_noise: f64) -> Self {
        self.high_noise = high_noise;
        self
    }

    /// Set the number of noisy copies of each shape in the library.
    #[must_use]
    pub fn with_variants(mut self, variants: usize) -> Self {
        self.variants = variants;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the scorer used by the engine under test.
    #[must_use]
    pub fn with_scorer(mut self, scorer: ScorerConfig) -> Self {
        self.scorer = scorer;
        self
    }

    /// Build the pattern library, run every query case and aggregate the metrics.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RankError::InvalidK`] | `k == 0` |
    /// | [`RankError::Series`] (`InvalidTargetLength`) | `length < 2` |
    /// | [`RankError::InvalidNoiseLevel`] | `noise` or `high_noise` is negative or not finite |
    #[instrument(skip(self), fields(length = self.length, k = self.k, noise = self.noise))]
    pub fn run(&self) -> Result<ValidationReport, RankError> {
        if self.k == 0 {
            return Err(RankError::InvalidK { k: self.k });
        }
        if self.length < 2 {
            return Err(SeriesError::InvalidTargetLength {
                target_len: self.length,
            }
            .into());
        }
        for level in [self.noise, self.high_noise] {
            if !level.is_finite() || level < 0.0 {
                return Err(RankError::InvalidNoiseLevel { level });
            }
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut library: Vec<(String, Vec<f64>)> = Vec::new();
        let mut families: Vec<(Pattern, Vec<f64>, Vec<String>)> = Vec::new();

        for shape in Pattern::SHAPES {
            let base = z_normalize(&shape.generate(self.length), DEFAULT_EPS).into_inner();
            let mut family = vec![format!("{shape}_original")];
            library.push((family[0].clone(), base.clone()));
            for v in 0..self.variants {
                let id = format!("{shape}_noisy_{v}");
                library.push((id.clone(), add_noise(&base, self.noise, &mut rng)?));
                family.push(id);
            }
            families.push((shape, base, family));
        }
        library.push((format!("{}_original", Pattern::Flat), Pattern::Flat.generate(self.length)));

        let engine = SimilarityEngine::new(self.scorer.build(), CacheConfig::new().with_min_series_len(2));
        let summary = engine.rebuild_cache(library, self.length)?;
        debug!(count = summary.count, "pattern library loaded");

        let family_of = |shape: Pattern| {
            families
                .iter()
                .find(|(s, _, _)| *s == shape)
                .map(|(_, _, ids)| ids.clone())
                .unwrap_or_default()
        };

        let mut cases = Vec::new();
        for (shape, base, relevant) in &families {
            let mirror = shape.opposite().map(family_of);
            let mut kinds = vec![
                (CaseKind::Original, 0.0),
                (CaseKind::LowNoise, self.noise),
                (CaseKind::HighNoise, self.high_noise),
            ];
            if mirror.is_some() {
                kinds.push((CaseKind::Opposite, 0.0));
            }

            for (kind, noise) in kinds {
                let dissimilar = match kind {
                    CaseKind::Opposite => mirror.clone().unwrap_or_default(),
                    _ => Vec::new(),
                };
                let values = add_noise(base, noise, &mut rng)?;
                let query = engine.resample_and_normalize(&values, self.length)?;
                let retrieved: Vec<String> = engine
                    .rank(&query, self.k)?
                    .into_iter()
                    .map(|c| c.id)
                    .collect();

                let case = ValidationCase {
                    precision: precision_at_k(&retrieved, relevant, self.k),
                    recall: recall_at_k(&retrieved, relevant, self.k),
                    ndcg: ndcg_at_k(&retrieved, relevant, self.k),
                    query: *shape,
                    kind,
                    noise,
                    retrieved,
                    dissimilar,
                };
                debug!(
                    query = %shape,
                    kind = %kind,
                    precision = case.precision,
                    recall = case.recall,
                    ndcg = case.ndcg,
                    "case scored"
                );
                cases.push(case);
            }
        }

        let report = ValidationReport::from_cases(cases);
        info!(
            cases = report.cases.len(),
            mean_precision = report.mean_precision,
            mean_recall = report.mean_recall,
            mean_ndcg = report.mean_ndcg,
            hit_rate = report.hit_rate,
            exclusion_rate = report.exclusion_rate,
            "validation complete"
        );
        Ok(report)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What a validation query is checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseKind {
    /// The clean shape itself; its own original must come back first.
    Original,
    /// The shape with the configured `noise`.
    LowNoise,
    /// The shape with the configured `high_noise`.
    HighNoise,
    /// The clean shape, checked against its mirror image's family.
    Opposite,
}

impl CaseKind {
    /// Lowercase name used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CaseKind::Original => "original",
            CaseKind::LowNoise => "low_noise",
            CaseKind::HighNoise => "high_noise",
            CaseKind::Opposite => "opposite",
        }
    }
}

impl fmt::Display for CaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one query in a validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCase {
    /// The queried shape.
    pub query: Pattern,
    /// Which check this query performs.
    pub kind: CaseKind,
    /// Noise standard deviation applied to the query.
    pub noise: f64,
    /// Retrieved identifiers, best first.
    pub retrieved: Vec<String>,
    /// Identifiers that must not appear among the retrieved ones.
    pub dissimilar: Vec<String>,
    /// Precision@k.
    pub precision: f64,
    /// Recall@k.
    pub recall: f64,
    /// NDCG@k.
    pub ndcg: f64,
}

impl ValidationCase {
    /// Return `true` if the top result belongs to the queried shape's family.
    #[must_use]
    pub fn top_hit(&self) -> bool {
        self.retrieved
            .first()
            .is_some_and(|id| id.starts_with(&format!("{}_", self.query)))
    }

    /// Return `true` if none of the dissimilar identifiers was retrieved.
    #[must_use]
    pub fn dissimilar_excluded(&self) -> bool {
        !self.retrieved.iter().any(|id| self.dissimilar.contains(id))
    }
}

/// Aggregated validation metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Per-query outcomes, grouped by shape in [`Pattern::SHAPES`] order.
    pub cases: Vec<ValidationCase>,
    /// Mean precision@k.
    pub mean_precision: f64,
    /// Mean recall@k.
    pub mean_recall: f64,
    /// Mean NDCG@k.
    pub mean_ndcg: f64,
    /// Fraction of queries whose top result is in the right family.
    pub hit_rate: f64,
    /// Fraction of cases with a dissimilar set that kept it out of the top `k`.
    /// `1.0` when no case has one.
    pub exclusion_rate: f64,
}

impl ValidationReport {
    fn from_cases(cases: Vec<ValidationCase>) -> Self {
        let n = cases.len().max(1) as f64;
        let mean = |f: fn(&ValidationCase) -> f64| cases.iter().map(f).sum::<f64>() / n;
        let mean_precision = mean(|c| c.precision);
        let mean_recall = mean(|c| c.recall);
        let mean_ndcg = mean(|c| c.ndcg);
        let hit_rate = cases.iter().filter(|c| c.top_hit()).count() as f64 / n;

        let checked: Vec<&ValidationCase> = cases.iter().filter(|c| !c.dissimilar.is_empty()).collect();
        let exclusion_rate = if checked.is_empty() {
            1.0
        } else {
            checked.iter().filter(|c| c.dissimilar_excluded()).count() as f64 / checked.len() as f64
        };

        Self {
            cases,
            mean_precision,
            mean_recall,
            mean_ndcg,
            hit_rate,
            exclusion_rate,
        }
    }

    /// Iterate over the cases of one kind.
    pub fn cases_of(&self, kind: CaseKind) -> impl Iterator<Item = &ValidationCase> {
        self.cases.iter().filter(move |c| c.kind == kind)
    }
}
