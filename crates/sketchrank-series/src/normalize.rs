//! Series preprocessing: NaN-safe z-normalization and trailing moving average.

use tracing::instrument;

use crate::error::SeriesError;
use crate::resample::resample;
use crate::series::FixedSeries;

/// Standard deviation below which a series is treated as flat.
pub const DEFAULT_EPS: f64 = 1e-8;

/// Z-normalize a series to zero mean and unit variance.
///
/// Uses population standard deviation (divides by n, not n-1). The function is
/// total; degenerate input is absorbed rather than reported:
///
/// | Input | Output |
/// |---|---|
/// | Some non-finite values | Replaced by the mean of the finite values first |
/// | No finite values | All zeros |
/// | `std < eps` (flat) | `x - mean`, zero-centered but unscaled |
/// | Otherwise | `(x - mean) / std` |
///
/// Any residual non-finite result (for example from overflow) becomes `0.0`,
/// so the returned [`FixedSeries`] never holds a non-finite value.
#[must_use = "returns a new normalized series; the input is unchanged"]
pub fn z_normalize(values: &[f64], eps: f64) -> FixedSeries {
    let (finite_sum, finite_count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0_f64, 0usize), |(s, c), &v| (s + v, c + 1));

    if finite_count == 0 {
        return FixedSeries::new_unchecked(vec![0.0; values.len()]);
    }

    let fill = finite_sum / finite_count as f64;
    let cleaned: Vec<f64> = values
        .iter()
        .map(|&v| if v.is_finite() { v } else { fill })
        .collect();

    let n = cleaned.len() as f64;
    let mean = cleaned.iter().sum::<f64>() / n;
    let variance = cleaned.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    let flat = std.is_nan() || std < eps;
    let normalized = cleaned
        .into_iter()
        .map(|x| {
            let z = if flat { x - mean } else { (x - mean) / std };
            if z.is_finite() { z } else { 0.0 }
        })
        .collect();

    FixedSeries::new_unchecked(normalized)
}

/// Resample a raw series to `target_len` points and z-normalize the result.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SeriesError::InvalidTargetLength`] | `target_len` is zero |
/// | [`SeriesError::TooShort`] | `raw` has fewer than 2 points |
#[instrument(level = "trace", skip(raw), fields(len = raw.len()))]
pub fn resample_and_normalize(
    raw: &[f64],
    target_len: usize,
    eps: f64,
) -> Result<FixedSeries, SeriesError> {
    if target_len == 0 {
        return Err(SeriesError::InvalidTargetLength { target_len });
    }
    if raw.len() < 2 {
        return Err(SeriesError::TooShort { len: raw.len() });
    }
    Ok(z_normalize(&resample(raw, target_len), eps))
}

/// Compute the trailing simple moving average of a price series.
///
/// Non-finite closes are dropped before averaging. The first `window - 1`
/// positions, which lack a full window, are omitted, so the output has
/// `len - window + 1` points.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SeriesError::InvalidWindow`] | `window` is zero |
/// | [`SeriesError::WindowTooLarge`] | Fewer finite closes than `window` |
pub fn moving_average(closes: &[f64], window: usize) -> Result<Vec<f64>, SeriesError> {
    if window == 0 {
        return Err(SeriesError::InvalidWindow { window });
    }
    let data: Vec<f64> = closes.iter().copied().filter(|v| v.is_finite()).collect();
    if data.len() < window {
        return Err(SeriesError::WindowTooLarge {
            len: data.len(),
            window,
        });
    }

    let w = window as f64;
    let mut sum: f64 = data[..window].iter().sum();
    let mut out = Vec::with_capacity(data.len() - window + 1);
    out.push(sum / w);
    for i in window..data.len() {
        sum += data[i] - data[i - window];
        out.push(sum / w);
    }
    Ok(out)
}
