//! Two-sample hypothesis tests.

use std::fmt;

use serde::Serialize;

use crate::descriptive::{mean, sample_variance};
use crate::distributions::{normal_sf, student_t_two_sided};

/// Which test produced a [`HypothesisTest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    /// Welch's unequal-variance t-test.
    Welch,
    /// Two-sided Mann–Whitney U test, normal approximation.
    MannWhitney,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Welch => write!(f, "Welch t-test"),
            Self::MannWhitney => write!(f, "Mann-Whitney U"),
        }
    }
}

/// Result of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HypothesisTest {
    pub kind: TestKind,
    /// `t` for Welch, `U` of the first sample for Mann–Whitney.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Welch–Satterthwaite degrees of freedom (Welch only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<f64>,
}

/// Welch's t-test; `None` unless both samples have at least two observations.
///
/// Two zero-variance samples give `p = 1` when their means are equal and
/// `p = 0` otherwise.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<HypothesisTest> {
    let (ma, mb) = (mean(a)?, mean(b)?);
    let (va, vb) = (sample_variance(a)?, sample_variance(b)?);
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (sa, sb) = (va / na, vb / nb);
    let se2 = sa + sb;

    if se2 <= 0.0 {
        let df = na + nb - 2.0;
        #[allow(clippy::float_cmp)]
        let (statistic, p_value) = if ma == mb {
            (0.0, 1.0)
        } else {
            ((ma - mb).signum() * f64::INFINITY, 0.0)
        };
        return Some(HypothesisTest {
            kind: TestKind::Welch,
            statistic,
            p_value,
            df: Some(df),
        });
    }

    let t = (ma - mb) / se2.sqrt();
    let df = se2 * se2 / (sa * sa / (na - 1.0) + sb * sb / (nb - 1.0));
    Some(HypothesisTest {
        kind: TestKind::Welch,
        statistic: t,
        p_value: student_t_two_sided(t, df),
        df: Some(df),
    })
}

/// Two-sided Mann–Whitney U test with tie and continuity correction.
///
/// `None` if either sample is empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Option<HypothesisTest> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let n = n1 + n2;

    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|&v| (v, true))
        .chain(b.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut rank_sum_a = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i + 1;
        while j < pooled.len() && pooled[j].0.total_cmp(&pooled[i].0).is_eq() {
            j += 1;
        }
        // Ranks i+1..=j share their average.
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let from_a = pooled[i..j].iter().filter(|(_, first)| *first).count();
        rank_sum_a += avg_rank * from_a as f64;
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }

    let u1 = rank_sum_a - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;
    let u = u1.max(u2);
    let mu = n1 * n2 / 2.0;
    let sigma = (n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)))).sqrt();

    let p_value = if sigma > 0.0 && sigma.is_finite() {
        let z = (u - mu - 0.5) / sigma;
        (2.0 * normal_sf(z)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    Some(HypothesisTest {
        kind: TestKind::MannWhitney,
        statistic: u1,
        p_value,
        df: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn welch_known_statistic() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0];
        let b = [2.0, 4.0, 6.0, 8.0, 10.0];
        let r = welch_t_test(&a, &b).unwrap();
        assert_eq!(r.kind, TestKind::Welch);
        assert!(close(r.statistic, -3.0 / 2.5_f64.sqrt(), 1e-12));
        assert!(close(r.df.unwrap(), 6.25 / 1.0625, 1e-12));
        assert!(r.p_value > 0.05 && r.p_value < 0.2, "p = {}", r.p_value);
    }

    #[test]
    fn welch_is_symmetric_in_p() {
        let a = [1.0, 1.5, 2.0, 2.5, 3.5];
        let b = [2.0, 3.0, 3.5, 5.0, 6.0, 6.5];
        let ab = welch_t_test(&a, &b).unwrap();
        let ba = welch_t_test(&b, &a).unwrap();
        assert!(close(ab.p_value, ba.p_value, 1e-12));
        assert!(close(ab.statistic, -ba.statistic, 1e-12));
    }

    #[test]
    fn welch_degenerate_variances() {
        let same = welch_t_test(&[2.0; 5], &[2.0; 7]).unwrap();
        assert!(close(same.p_value, 1.0, 1e-15));
        let differ = welch_t_test(&[2.0; 5], &[3.0; 7]).unwrap();
        assert!(close(differ.p_value, 0.0, 1e-15));
        assert!(differ.statistic.is_infinite() && differ.statistic < 0.0);
    }

    #[test]
    fn welch_needs_two_observations() {
        assert!(welch_t_test(&[1.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn mann_whitney_separated_samples() {
        let r = mann_whitney_u(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(r.kind, TestKind::MannWhitney);
        assert!(close(r.statistic, 0.0, 1e-12));
        assert!(close(r.p_value, 0.080_855_6, 1e-4), "p = {}", r.p_value);
    }

    #[test]
    fn mann_whitney_handles_ties() {
        let r = mann_whitney_u(&[1.0, 2.0, 2.0, 3.0], &[2.0, 3.0, 3.0, 4.0]).unwrap();
        // Ranks: 1 -> 1, 2 -> 3 (x3), 3 -> 6 (x3), 4 -> 8.
        assert!(close(r.statistic, (1.0 + 3.0 + 3.0 + 6.0) - 10.0, 1e-12));
        assert!(r.p_value > 0.05 && r.p_value <= 1.0);
    }

    #[test]
    fn mann_whitney_all_tied_is_not_significant() {
        let r = mann_whitney_u(&[5.0; 30], &[5.0; 30]).unwrap();
        assert!(close(r.p_value, 1.0, 1e-15));
    }
}
