//! Piecewise-linear resampling onto a uniform grid.

/// Resample `raw` to exactly `target_len` points by linear interpolation.
///
/// Input knots sit at normalized positions `j / (n - 1)` and output samples at
/// `i / (target_len - 1)`; both grids span `[0, 1]`, so the first and last
/// output points are the first and last input points. A single-point output
/// takes the first knot.
///
/// Returns an empty vector when `raw` has fewer than 2 points or
/// `target_len` is zero; callers reject that downstream.
///
/// Non-finite input values propagate into the neighbouring interpolated
/// points and are cleaned up by [`z_normalize`](crate::z_normalize).
#[must_use]
pub fn resample(raw: &[f64], target_len: usize) -> Vec<f64> {
    let n = raw.len();
    if n < 2 || target_len == 0 {
        return Vec::new();
    }
    if target_len == 1 {
        return vec![raw[0]];
    }

    let last_knot = n - 1;
    let steps = (target_len - 1) as f64;

    (0..target_len)
        .map(|i| {
            // Position on the knot axis; integer numerator keeps exact knots exact.
            let pos = (i * last_knot) as f64 / steps;
            let lo = (pos.floor() as usize).min(last_knot - 1);
            let frac = (pos - lo as f64).clamp(0.0, 1.0);
            if frac == 0.0 {
                raw[lo]
            } else if frac == 1.0 {
                raw[lo + 1]
            } else {
                raw[lo] + (raw[lo + 1] - raw[lo]) * frac
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_short_yields_empty() {
        assert!(resample(&[], 5).is_empty());
        assert!(resample(&[1.0], 5).is_empty());
    }

    #[test]
    fn zero_target_yields_empty() {
        assert!(resample(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn single_output_takes_first_knot() {
        assert_eq!(resample(&[4.0, 9.0, 1.0], 1), vec![4.0]);
    }

    #[test]
    fn upsample_three_knots_to_five() {
        let out = resample(&[1.0, 2.0, 3.0], 5);
        let expected = [1.0, 1.5, 2.0, 2.5, 3.0];
        assert_eq!(out.len(), 5);
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
    }

    #[test]
    fn downsample_keeps_endpoints() {
        let raw: Vec<f64> = (0..101).map(|i| (i as f64 * 0.1).sin()).collect();
        let out = resample(&raw, 7);
        assert_eq!(out.len(), 7);
        assert_eq!(out[0], raw[0]);
        assert_eq!(out[6], raw[100]);
    }

    #[test]
    fn same_length_is_identity() {
        let raw = vec![3.0, -1.0, 4.0, 1.0, -5.0, 9.0, 2.0];
        let out = resample(&raw, raw.len());
        for (got, want) in out.iter().zip(&raw) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn output_stays_within_knot_range() {
        let raw = vec![0.0, 10.0, -10.0, 5.0];
        let out = resample(&raw, 50);
        for v in out {
            assert!((-10.0..=10.0).contains(&v), "{v} escaped the knot range");
        }
    }
}
