//! Descriptive statistics over latency samples.

use serde::Serialize;

/// Summary of one sample.
///
/// Variance and standard deviation are population figures (divisor `n`);
/// percentiles use linear interpolation between closest ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize `values`; `None` for an empty sample.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let variance = central_moment(values, mean, 2);
        let sorted = sorted(values);
        Some(Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            variance,
            min: percentile(&sorted, 0.0),
            q1: percentile(&sorted, 25.0),
            median: percentile(&sorted, 50.0),
            q3: percentile(&sorted, 75.0),
            max: percentile(&sorted, 100.0),
        })
    }

    /// Interquartile range.
    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Arithmetic mean; `None` for an empty sample.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Unbiased sample variance (divisor `n - 1`); `None` below two observations.
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// `k`-th central moment with divisor `n`.
pub(crate) fn central_moment(values: &[f64], mean: f64, k: i32) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(k)).sum::<f64>() / values.len() as f64
}

/// Ascending copy of `values`.
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Percentile `p` in `[0, 100]` of an ascending slice, linearly interpolated.
///
/// Returns NaN for an empty slice.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return f64::NAN;
    };
    if sorted.len() == 1 {
        return last;
    }
    let rank = p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
