use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use sketchrank_io::{CandidateReader, CandidateSet, ResultWriter, RunName, SketchReader};
use sketchrank_rank::{
    CacheConfig, EnsembleWeights, ScorerConfig, SimilarityEngine, ValidationConfig,
};
use sketchrank_series::{BandConstraint, moving_average};

#[derive(Parser)]
#[command(name = "sketchrank")]
#[command(about = "Find the series whose shape best matches a hand-drawn sketch")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Ensemble weights and DTW band shared by both subcommands.
#[derive(Args, Debug, Clone)]
struct ScoringArgs {
    /// Weight of the length-normalized DTW score
    #[arg(long, default_value_t = 0.7)]
    alpha: f64,

    /// Weight of the Pearson correlation
    #[arg(long, default_value_t = 0.2)]
    beta: f64,

    /// Weight of the cosine similarity
    #[arg(long, default_value_t = 0.1)]
    gamma: f64,

    /// Sakoe-Chiba warping window radius (0 = unconstrained)
    #[arg(long, default_value_t = 0)]
    warping_window: usize,
}

impl ScoringArgs {
    fn scorer_config(&self) -> Result<ScorerConfig> {
        let weights = EnsembleWeights::new(self.alpha, self.beta, self.gamma)?;
        Ok(ScorerConfig::new()
            .with_weights(weights)
            .with_constraint(BandConstraint::from_radius(self.warping_window)))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Rank candidate series by similarity to a sketch
    Similar {
        /// Path to the wide candidate CSV (`id,t0,t1,...`)
        #[arg(long)]
        data: PathBuf,

        /// Path to the sketch JSON (`{"y": [...], "target_len": N}`)
        #[arg(long)]
        sketch: PathBuf,

        /// Number of results to return
        #[arg(long, default_value_t = 5)]
        k: usize,

        /// Comparison length (defaults to the sketch's target_len, then 200)
        #[arg(long)]
        target_len: Option<usize>,

        /// Minimum points a candidate needs to be ranked
        #[arg(long, default_value_t = 30)]
        min_len: usize,

        /// Replace each candidate by its trailing moving average of this window
        #[arg(long)]
        ma_window: Option<usize>,

        /// Minimum finite closes required before computing the moving average
        #[arg(long, default_value_t = 25)]
        min_ma_points: usize,

        /// Run name for the output file (must match [a-zA-Z0-9_-]+); no file is written without it
        #[arg(long)]
        name: Option<String>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Measure retrieval quality on synthetic chart patterns
    Validate {
        /// Points per pattern
        #[arg(long, default_value_t = 200)]
        length: usize,

        /// Number of results retrieved per query
        #[arg(long, default_value_t = 5)]
        k: usize,

        /// Gaussian noise standard deviation on standardized patterns
        #[arg(long, default_value_t = 0.1)]
        noise: f64,

        /// Gaussian noise standard deviation of the high-noise queries
        #[arg(long, default_value_t = 0.3)]
        high_noise: f64,

        /// Noisy copies of each pattern in the library
        #[arg(long, default_value_t = 3)]
        variants: usize,

        /// Run name for the output file (must match [a-zA-Z0-9_-]+); no file is written without it
        #[arg(long)]
        name: Option<String>,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct SimilarOutput {
    run: Option<String>,
    target_len: usize,
    n_candidates: usize,
    n_ma_dropped: usize,
    n_cached: usize,
    n_skipped: usize,
    k: usize,
    items: Vec<SimilarItemOutput>,
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct SimilarItemOutput {
    ticker: String,
    score: f64,
    rank: usize,
}

#[derive(Serialize)]
struct ValidateOutput {
    run: Option<String>,
    length: usize,
    k: usize,
    noise: f64,
    variants: usize,
    mean_precision: f64,
    mean_recall: f64,
    mean_ndcg: f64,
    hit_rate: f64,
    exclusion_rate: f64,
    cases: Vec<CaseOutput>,
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct CaseOutput {
    query: String,
    kind: String,
    noise: f64,
    top_hit: bool,
    dissimilar_excluded: bool,
    precision: f64,
    recall: f64,
    ndcg: f64,
}

const DEFAULT_TARGET_LEN: usize = 200;

/// Replace each candidate's closes by their trailing moving average.
///
/// Candidates with fewer than `min_points` finite closes, or fewer than
/// `window`, are dropped. Returns the averaged set and the number dropped.
fn apply_moving_average(
    candidates: CandidateSet,
    window: usize,
    min_points: usize,
) -> Result<(CandidateSet, usize)> {
    let mut out = CandidateSet::default();
    let mut dropped = 0usize;
    for (id, closes) in candidates.ids.into_iter().zip(candidates.series) {
        let finite = closes.iter().filter(|v| v.is_finite()).count();
        if finite < min_points.max(window) {
            debug!(id = %id, finite, "too few closes for moving average");
            dropped += 1;
            continue;
        }
        let averaged = moving_average(&closes, window)
            .with_context(|| format!("moving average failed for {id}"))?;
        out.ids.push(id);
        out.series.push(averaged);
    }
    info!(window, kept = out.len(), dropped, "moving averages computed");
    Ok((out, dropped))
}

fn writer_for(name: Option<&str>, output_dir: &Path) -> Result<Option<ResultWriter>> {
    name.map(|n| {
        let run = RunName::new(n.to_string())?;
        Ok(ResultWriter::new(output_dir, run)?)
    })
    .transpose()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Similar {
            data,
            sketch,
            k,
            target_len,
            min_len,
            ma_window,
            min_ma_points,
            name,
            output_dir,
            scoring,
        } => {
            let writer = writer_for(name.as_deref(), &output_dir)?;
            let scorer = scoring.scorer_config()?.build();

            // 1. Read inputs
            let mut candidates = CandidateReader::new(&data)
                .read()
                .context("failed to read candidate CSV")?;
            let n_candidates = candidates.len();
            let sketch = SketchReader::new(&sketch)
                .read()
                .context("failed to read sketch JSON")?;
            let target_len = target_len.or(sketch.target_len).unwrap_or(DEFAULT_TARGET_LEN);

            // 2. Optional moving-average preprocessing
            let mut n_ma_dropped = 0;
            if let Some(window) = ma_window {
                (candidates, n_ma_dropped) = apply_moving_average(candidates, window, min_ma_points)?;
            }

            // 3. Build the cache
            let engine = SimilarityEngine::new(scorer, CacheConfig::new().with_min_series_len(min_len));
            let summary = engine
                .rebuild_cache(candidates.iter(), target_len)
                .context("failed to build series cache")?;

            // 4. Rank against one snapshot so the written vectors match the scores
            let query = engine
                .resample_and_normalize(&sketch.y, target_len)
                .context("failed to normalize sketch")?;
            let snapshot = engine.snapshot();
            let ranked = engine
                .ranker()
                .rank(&query, &snapshot, k)
                .context("ranking failed")?;

            // 5. Write JSON artifact
            let output = match &writer {
                Some(w) => Some(w.write_similar(&query, &snapshot, &ranked)?),
                None => None,
            };

            // 6. Print summary
            let summary_out = SimilarOutput {
                run: name,
                target_len,
                n_candidates,
                n_ma_dropped,
                n_cached: summary.count,
                n_skipped: summary.skipped_count,
                k,
                items: ranked
                    .into_iter()
                    .map(|c| SimilarItemOutput {
                        score: c.score.value(),
                        rank: c.rank,
                        ticker: c.id,
                    })
                    .collect(),
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary_out)?);
        }

        Command::Validate {
            length,
            k,
            noise,
            high_noise,
            variants,
            name,
            output_dir,
            scoring,
        } => {
            let writer = writer_for(name.as_deref(), &output_dir)?;

            let config = ValidationConfig::new()
                .with_length(length)
                .with_k(k)
                .with_noise(noise)
                .with_high_noise(high_noise)
                .with_variants(variants)
                .with_seed(cli.seed)
                .with_scorer(scoring.scorer_config()?);
            let report = config.run().context("validation failed")?;

            let output = match &writer {
                Some(w) => Some(w.write_validation(&report)?),
                None => None,
            };

            let summary_out = ValidateOutput {
                run: name,
                length,
                k,
                noise,
                variants,
                mean_precision: report.mean_precision,
                mean_recall: report.mean_recall,
                mean_ndcg: report.mean_ndcg,
                hit_rate: report.hit_rate,
                exclusion_rate: report.exclusion_rate,
                cases: report
                    .cases
                    .iter()
                    .map(|c| CaseOutput {
                        query: c.query.to_string(),
                        kind: c.kind.to_string(),
                        noise: c.noise,
                        top_hit: c.top_hit(),
                        dissimilar_excluded: c.dissimilar_excluded(),
                        precision: c.precision,
                        recall: c.recall,
                        ndcg: c.ndcg,
                    })
                    .collect(),
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary_out)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(rows: Vec<(&str, Vec<f64>)>) -> CandidateSet {
        let mut out = CandidateSet::default();
        for (id, series) in rows {
            out.ids.push(id.to_string());
            out.series.push(series);
        }
        out
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn moving_average_and_cache_skips_are_counted_apart() {
        let mut gappy = ramp(60);
        for v in &mut gappy[..40] {
            *v = f64::NAN;
        }
        let candidates = set(vec![("LONG", ramp(80)), ("MID", ramp(45)), ("FEW", ramp(24)), ("GAPPY", gappy)]);

        // FEW and GAPPY have fewer than 25 finite closes.
        let (averaged, dropped) = apply_moving_average(candidates, 20, 25).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(averaged.ids, ["LONG", "MID"]);
        assert_eq!(averaged.series[0].len(), 61);
        assert_eq!(averaged.series[1].len(), 26);

        // MID survives averaging with 26 points but misses the cache minimum.
        let engine = SimilarityEngine::new(
            ScorerConfig::new().build(),
            CacheConfig::new().with_min_series_len(30),
        );
        let summary = engine.rebuild_cache(averaged.iter(), 50).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.skipped_count, 1);
    }

    #[test]
    fn writer_requires_valid_run_name() {
        assert!(writer_for(None, Path::new(".")).unwrap().is_none());
        assert!(writer_for(Some("bad name!"), Path::new(".")).is_err());
    }
}
