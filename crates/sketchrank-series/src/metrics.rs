//! Shape-similarity metrics on equal-length series.
//!
//! All three follow the same "larger is more similar" convention and never
//! return a non-finite value: every undefined case collapses to `0.0`.

use crate::dtw::Dtw;

/// Length-normalized, negated DTW alignment cost.
///
/// Returns `-cost(a, b) / a.len()`, so identical inputs score the maximum `0.0`
/// and worse alignments score increasingly negative values. Returns `0.0` for
/// empty input or when the cost is not finite (a NaN that slipped through, or a
/// band too narrow to complete the alignment).
#[must_use]
pub fn warped_score(dtw: &Dtw, a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let score = -dtw.cost(a, b) / a.len() as f64;
    if score.is_finite() { score } else { 0.0 }
}

/// Pearson correlation coefficient in `[-1, 1]`.
///
/// Returns `0.0` instead of the undefined value when:
///
/// - the lengths differ or there are fewer than 2 points,
/// - either input contains a non-finite value,
/// - either input's population standard deviation is below `eps`,
/// - the computation yields a non-finite result.
#[must_use]
pub fn pearson(a: &[f64], b: &[f64], eps: f64) -> f64 {
    let n = a.len();
    if n != b.len() || n < 2 {
        return 0.0;
    }
    if a.iter().chain(b).any(|v| !v.is_finite()) {
        return 0.0;
    }

    let nf = n as f64;
    let mean_a = a.iter().sum::<f64>() / nf;
    let mean_b = b.iter().sum::<f64>() / nf;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let std_a = (var_a / nf).sqrt();
    let std_b = (var_b / nf).sqrt();
    if std_a < eps || std_b < eps {
        return 0.0;
    }

    let r = cov / (var_a.sqrt() * var_b.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Cosine similarity in `[-1, 1]`.
///
/// Returns `0.0` when the lengths differ, when either vector's Euclidean norm
/// is below `eps`, or when the result is not finite.
#[must_use]
pub fn cosine(a: &[f64], b: &[f64], eps: f64) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if !(norm_a >= eps && norm_b >= eps) {
        return 0.0;
    }

    let s = dot / (norm_a * norm_b);
    if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DEFAULT_EPS;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn warped_identity_is_maximum() {
        let dtw = Dtw::unconstrained();
        let a = vec![0.3, -1.2, 0.8, 2.0, -0.5];
        assert_eq!(warped_score(&dtw, &a, &a), 0.0);
        let b = vec![0.3, -1.0, 0.8, 2.5, -0.5];
        assert!(warped_score(&dtw, &a, &b) < 0.0);
    }

    #[test]
    fn warped_divides_by_length() {
        // Constant offset of 1 along a forced diagonal: cost = 4, length = 4.
        let dtw = Dtw::with_sakoe_chiba(0);
        let score = warped_score(&dtw, &[0.0; 4], &[1.0; 4]);
        assert!((score + 1.0).abs() < 1e-12);
    }

    #[test]
    fn warped_non_finite_falls_back_to_zero() {
        let dtw = Dtw::unconstrained();
        assert_eq!(warped_score(&dtw, &[1.0, f64::NAN], &[1.0, 2.0]), 0.0);
        assert_eq!(warped_score(&dtw, &[], &[1.0]), 0.0);
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let a = ramp(20);
        let b: Vec<f64> = a.iter().map(|x| 3.0 * x + 7.0).collect();
        let c: Vec<f64> = a.iter().map(|x| -x).collect();
        assert!((pearson(&a, &b, DEFAULT_EPS) - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c, DEFAULT_EPS) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_flat_input_is_zero() {
        let a = ramp(16);
        let flat = vec![2.5; 16];
        assert_eq!(pearson(&a, &flat, DEFAULT_EPS), 0.0);
        assert_eq!(pearson(&flat, &a, DEFAULT_EPS), 0.0);
        assert_eq!(pearson(&flat, &flat, DEFAULT_EPS), 0.0);
    }

    #[test]
    fn pearson_degenerate_shapes_are_zero() {
        assert_eq!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0], DEFAULT_EPS), 0.0);
        assert_eq!(pearson(&[1.0], &[1.0], DEFAULT_EPS), 0.0);
        assert_eq!(pearson(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0], DEFAULT_EPS), 0.0);
    }

    #[test]
    fn cosine_self_is_one() {
        let a = vec![0.5, -2.0, 3.0, 1.0];
        assert!((cosine(&a, &a, DEFAULT_EPS) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_orthogonal_and_opposite() {
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0], DEFAULT_EPS).abs() < 1e-12);
        assert!((cosine(&[1.0, 2.0], &[-1.0, -2.0], DEFAULT_EPS) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn cosine_zero_vector_is_zero() {
        assert_eq!(cosine(&[0.0; 8], &ramp(8), DEFAULT_EPS), 0.0);
        assert_eq!(cosine(&[0.0; 8], &[0.0; 8], DEFAULT_EPS), 0.0);
    }

    #[test]
    fn cosine_non_finite_is_zero() {
        assert_eq!(cosine(&[f64::NAN, 1.0], &[1.0, 1.0], DEFAULT_EPS), 0.0);
        assert_eq!(cosine(&[1.0, 2.0], &[1.0], DEFAULT_EPS), 0.0);
    }
}
