//! Retrieval quality metrics over identifier lists.
//!
//! Relevance is binary: an identifier is relevant if it appears in `relevant`.
//! Every function returns `0.0` for degenerate input instead of dividing by zero.

use std::collections::HashSet;

fn relevant_set<T: AsRef<str>>(relevant: &[T]) -> HashSet<&str> {
    relevant.iter().map(|id| id.as_ref()).collect()
}

fn is_relevant<S: AsRef<str>>(id: &S, relevant: &HashSet<&str>) -> bool {
    relevant.contains(id.as_ref())
}

fn hits<S: AsRef<str>>(retrieved: &[S], relevant: &HashSet<&str>, k: usize) -> usize {
    retrieved
        .iter()
        .take(k)
        .filter(|id| is_relevant(*id, relevant))
        .count()
}

/// Fraction of the first `k` slots that hold a relevant identifier.
///
/// The denominator is `k`, not the number retrieved, so a short result list
/// is penalized.
#[must_use]
pub fn precision_at_k<S: AsRef<str>, T: AsRef<str>>(retrieved: &[S], relevant: &[T], k: usize) -> f64 {
    if k == 0 || retrieved.is_empty() {
        return 0.0;
    }
    hits(retrieved, &relevant_set(relevant), k) as f64 / k as f64
}

/// Fraction of the relevant identifiers found in the first `k` results.
#[must_use]
pub fn recall_at_k<S: AsRef<str>, T: AsRef<str>>(retrieved: &[S], relevant: &[T], k: usize) -> f64 {
    let relevant = relevant_set(relevant);
    if k == 0 || relevant.is_empty() {
        return 0.0;
    }
    hits(retrieved, &relevant, k) as f64 / relevant.len() as f64
}

/// Normalized discounted cumulative gain with binary relevance.
///
/// `DCG = sum(rel_i / log2(i + 2))` over the first `k` results; the ideal DCG
/// places `min(|relevant|, k)` relevant items first.
#[must_use]
pub fn ndcg_at_k<S: AsRef<str>, T: AsRef<str>>(retrieved: &[S], relevant: &[T], k: usize) -> f64 {
    let relevant = relevant_set(relevant);
    let discount = |i: usize| 1.0 / ((i + 2) as f64).log2();

    let dcg: f64 = retrieved
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, id)| is_relevant(*id, &relevant))
        .map(|(i, _)| discount(i))
        .sum();
    let ideal: f64 = (0..relevant.len().min(k)).map(discount).sum();

    if ideal == 0.0 { 0.0 } else { dcg / ideal }
}
