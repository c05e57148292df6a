//! Accuracy regression tests for sketchrank-rank.
//!
//! These tests pin the ranking contract (ordering, ties, degenerate inputs) and
//! the single-writer cache behavior, and check that the synthetic shape library
//! stays separable at the default noise level.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use sketchrank_rank::{
    CacheConfig, CacheState, CaseKind, EnsembleScorer, ExactRanker, RankError, SimilarityEngine,
    ValidationConfig,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn linspace(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
}

fn random_walk(rng: &mut ChaCha8Rng, n: usize) -> Vec<f64> {
    let mut level = 100.0;
    (0..n)
        .map(|_| {
            level += rng.gen_range(-1.0..1.0);
            level
        })
        .collect()
}

fn engine() -> SimilarityEngine {
    SimilarityEngine::new(EnsembleScorer::default(), CacheConfig::default())
}

// ---------------------------------------------------------------------------
// a) flat_query_against_flat_and_ramp
// ---------------------------------------------------------------------------

/// A query of 128 zeros against a flat and a ramp candidate ranks both without
/// error. The flat candidate scores exactly zero (every metric falls back) and
/// wins; the order is identical across repeated queries.
#[test]
fn flat_query_against_flat_and_ramp() {
    let engine = engine();
    engine
        .rebuild_cache(vec![("FLAT", vec![0.0; 128]), ("RAMP", linspace(128))], 128)
        .unwrap();

    let query = engine.resample_and_normalize(&[0.0; 128], 128).unwrap();
    assert!(query.as_slice().iter().all(|&v| v == 0.0));

    let first = engine.rank(&query, 5).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].id, "FLAT");
    assert_eq!(first[0].score.value(), 0.0);
    assert_eq!(first[1].id, "RAMP");
    assert!(first[1].score.value() < 0.0);

    let snapshot = engine.snapshot();
    let flat = snapshot.get("FLAT").unwrap();
    let breakdown = engine.ranker().scorer().breakdown(&query, flat.vector());
    assert_eq!(breakdown.correlation, 0.0);
    assert_eq!(breakdown.cosine, 0.0);

    for _ in 0..5 {
        assert_eq!(engine.rank(&query, 5).unwrap(), first);
    }
}

// ---------------------------------------------------------------------------
// b) ranking_is_sorted_and_prefix_stable
// ---------------------------------------------------------------------------

/// Output is sorted by non-increasing score with ascending-id tie-break, and
/// top-k is exactly the k-prefix of the full ranking.
#[test]
fn ranking_is_sorted_and_prefix_stable() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut candidates: Vec<(String, Vec<f64>)> = (0..60)
        .map(|i| (format!("T{i:03}"), random_walk(&mut rng, 90)))
        .collect();
    // Two exact duplicates of one series force a tie.
    let twin = candidates[7].1.clone();
    candidates.push(("TWIN_B".into(), twin.clone()));
    candidates.push(("TWIN_A".into(), twin.clone()));

    let engine = engine();
    let summary = engine.rebuild_cache(candidates, 100).unwrap();
    assert_eq!(summary.count, 62);

    let query = engine.resample_and_normalize(&twin, 100).unwrap();
    let full = engine.rank(&query, 1000).unwrap();
    assert_eq!(full.len(), 62);

    for (i, pair) in full.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.score.value() >= b.score.value(), "not sorted at {i}");
        if a.score == b.score {
            assert!(a.id < b.id, "tie not broken by id at {i}: {} vs {}", a.id, b.id);
        }
        assert_eq!(a.rank, i + 1);
    }

    // The three copies of the query series tie at the top, ordered by id.
    let top: Vec<&str> = full.iter().take(3).map(|c| c.id.as_str()).collect();
    assert_eq!(top, ["T007", "TWIN_A", "TWIN_B"]);

    for k in [1, 2, 3, 10, 61] {
        let partial = engine.rank(&query, k).unwrap();
        assert_eq!(partial.as_slice(), &full[..k], "k = {k}");
    }
}

// ---------------------------------------------------------------------------
// c) scores_are_always_finite
// ---------------------------------------------------------------------------

/// Hostile candidates (NaN gaps, infinities, huge magnitudes) never produce a
/// non-finite score, and a candidate with no finite values never enters the
/// cache.
#[test]
fn scores_are_always_finite() {
    let mut hostile = vec![1.0; 40];
    hostile[3] = f64::NAN;
    hostile[10] = f64::INFINITY;
    let all_nan = vec![f64::NAN; 40];
    let huge: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 1e300 } else { -1e300 }).collect();

    let engine = engine();
    engine
        .rebuild_cache(
            vec![("HOSTILE", hostile), ("ALL_NAN", all_nan), ("HUGE", huge), ("RAMP", linspace(40))],
            50,
        )
        .unwrap();
    let query = engine.resample_and_normalize(&[3.0, 1.0, 4.0, 1.0, 5.0], 50).unwrap();
    let ranked = engine.rank(&query, 10).unwrap();
    assert_eq!(ranked.len(), 3);
    assert!(ranked.iter().all(|c| c.id != "ALL_NAN"));
    assert!(ranked.iter().all(|c| c.score.value().is_finite()));

    // A flat sketch must not be matched by series that carry no data.
    let mut one_point = vec![f64::NAN; 40];
    one_point[0] = 5.0;
    let summary = engine
        .rebuild_cache(
            vec![("ALL_NAN", vec![f64::NAN; 40]), ("ONE_PT", one_point), ("RAMP", linspace(40))],
            64,
        )
        .unwrap();
    assert_eq!((summary.count, summary.skipped_count), (1, 2));
    let flat = engine.resample_and_normalize(&[0.5; 16], 64).unwrap();
    let ranked = engine.rank(&flat, 5).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].id, "RAMP");
}

// ---------------------------------------------------------------------------
// d) rebuild_conflict_keeps_prior_snapshot
// ---------------------------------------------------------------------------

/// While one writer holds the rebuild slot, a second rebuild from another
/// thread fails immediately and concurrent readers keep ranking the prior
/// snapshot.
#[test]
fn rebuild_conflict_keeps_prior_snapshot() {
    let engine = engine();
    engine.rebuild_cache(vec![("OLD", linspace(60))], 60).unwrap();
    let query = engine.resample_and_normalize(&linspace(10), 60).unwrap();

    let guard = engine.store().begin_rebuild().unwrap();
    assert_eq!(engine.store().state(), CacheState::Building);

    std::thread::scope(|scope| {
        let writer = scope.spawn(|| engine.rebuild_cache(vec![("NEW", linspace(60))], 60));
        let reader = scope.spawn(|| engine.rank(&query, 3));

        assert!(matches!(writer.join().unwrap(), Err(RankError::RebuildInProgress)));
        let ranked = reader.join().unwrap().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "OLD");
    });

    let summary = guard.publish(vec![("NEW", linspace(60))], 60).unwrap();
    assert_eq!(summary.generation, 2);
    assert_eq!(engine.rank(&query, 3).unwrap()[0].id, "NEW");
}

// ---------------------------------------------------------------------------
// e) degenerate_rank_requests
// ---------------------------------------------------------------------------

/// Empty cache yields an empty list; k = 0 and a mismatched query length are
/// rejected once the cache holds data.
#[test]
fn degenerate_rank_requests() {
    let engine = engine();
    let query = engine.resample_and_normalize(&[1.0, 2.0], 200).unwrap();
    assert!(engine.rank(&query, 5).unwrap().is_empty());
    assert!(matches!(engine.rank(&query, 0), Err(RankError::InvalidK { k: 0 })));

    engine.rebuild_cache(vec![("A", linspace(30))], 64).unwrap();
    assert!(matches!(
        engine.rank(&query, 5),
        Err(RankError::LengthMismatch { expected: 64, got: 200 })
    ));

    let ranker = ExactRanker::default();
    let short = engine.resample_and_normalize(&[1.0, 2.0], 64).unwrap();
    assert_eq!(ranker.rank(&short, &engine.snapshot(), 5).unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// f) synthetic_shapes_are_retrieved
// ---------------------------------------------------------------------------

/// At the default noise levels every shape's top result is from its own
/// family, all four family members fill the first four slots, the clean shape
/// retrieves itself first and mirrored shapes never enter the top k.
#[test]
fn synthetic_shapes_are_retrieved() {
    let report = ValidationConfig::new().with_length(100).run().unwrap();
    assert_eq!(report.cases.len(), 19);
    assert_eq!(report.hit_rate, 1.0);
    assert_eq!(report.exclusion_rate, 1.0);
    assert!((report.mean_recall - 1.0).abs() < 1e-12, "recall {}", report.mean_recall);
    assert!((report.mean_precision - 0.8).abs() < 1e-12, "precision {}", report.mean_precision);
    assert!(report.mean_ndcg > 0.99);

    for case in report.cases_of(CaseKind::Original) {
        assert_eq!(case.retrieved[0], format!("{}_original", case.query));
    }
    for case in report.cases_of(CaseKind::HighNoise) {
        assert!(case.top_hit(), "{} lost its family at noise {}", case.query, case.noise);
        assert!((case.recall - 1.0).abs() < 1e-12);
    }
    for case in report.cases_of(CaseKind::Opposite) {
        assert!(case.dissimilar_excluded(), "{} retrieved its mirror", case.query);
        assert!(!case.retrieved.iter().any(|id| id == "flat_original"));
    }
}
