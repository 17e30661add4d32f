//! D'Agostino–Pearson omnibus normality test.
//!
//! Combines the skewness z-score and the kurtosis z-score into
//! `K² = Z_s² + Z_k²`, which is chi-squared with two degrees of freedom under
//! the null hypothesis of normality.

use serde::Serialize;

use rangebench_core::constants::{MIN_NORMALITY_SAMPLES, SIGNIFICANCE_LEVEL};

use crate::descriptive::{central_moment, mean};
use crate::distributions::chi2_sf_2df;

/// Outcome of a normality test on one sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalityResult {
    /// `K²` statistic.
    pub statistic: f64,
    pub p_value: f64,
}

impl NormalityResult {
    /// Normality is not rejected at the significance level.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        self.p_value >= SIGNIFICANCE_LEVEL
    }
}

/// Run the omnibus test.
///
/// `None` when the sample is too small, has zero variance, or the kurtosis
/// transform is undefined; callers treat that as "not normal".
#[must_use]
pub fn dagostino_pearson(values: &[f64]) -> Option<NormalityResult> {
    if values.len() < MIN_NORMALITY_SAMPLES {
        return None;
    }
    let m = mean(values)?;
    let m2 = central_moment(values, m, 2);
    if m2 <= 0.0 || !m2.is_finite() {
        return None;
    }
    let skewness = central_moment(values, m, 3) / m2.powf(1.5);
    let kurtosis = central_moment(values, m, 4) / (m2 * m2);

    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let zs = skew_z(skewness, n);
    let zk = kurtosis_z(kurtosis, n)?;
    let statistic = zs * zs + zk * zk;
    if !statistic.is_finite() {
        return None;
    }
    Some(NormalityResult {
        statistic,
        p_value: chi2_sf_2df(statistic),
    })
}

fn skew_z(b2: f64, n: f64) -> f64 {
    let y = b2 * (((n + 1.0) * (n + 3.0)) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    delta * (y / alpha).asinh()
}

fn kurtosis_z(b2: f64, n: f64) -> Option<f64> {
    let expected = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 = 24.0 * n * (n - 2.0) * (n - 3.0)
        / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - expected) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * ((6.0 * (n + 3.0) * (n + 5.0)) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return None;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    Some((term1 - term2) / (2.0 / (9.0 * a)).sqrt())
}
