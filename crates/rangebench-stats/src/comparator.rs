//! Statistical comparison of two strategies' samples.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use rangebench_core::constants::{MIN_HYPOTHESIS_SAMPLES, SIGNIFICANCE_LEVEL};
use rangebench_core::sample::{Metric, SampleSet};
use rangebench_core::strategy::Strategy;

use crate::descriptive::Summary;
use crate::hypothesis::{mann_whitney_u, welch_t_test, HypothesisTest};
use crate::normality::{dagostino_pearson, NormalityResult};

/// Descriptive statistics and normality for one strategy's sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySummary {
    pub strategy: Strategy,
    pub summary: Option<Summary>,
    /// `None` when the sample could not be assessed.
    pub normality: Option<NormalityResult>,
}

impl StrategySummary {
    fn from_values(strategy: Strategy, values: &[f64]) -> Self {
        Self {
            strategy,
            summary: Summary::from_values(values),
            normality: dagostino_pearson(values),
        }
    }

    /// Sample size.
    #[must_use]
    pub fn count(&self) -> usize {
        self.summary.as_ref().map_or(0, |s| s.count)
    }

    /// Whether normality was assessed and not rejected.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        self.normality.is_some_and(|n| n.is_normal())
    }
}

/// Outcome of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Verdict {
    /// At least one sample is below the hypothesis-test minimum.
    InsufficientSamples { required: usize },
    /// No significant difference at the significance level.
    NotSignificant,
    /// Significant difference; `faster` has the lower mean.
    Significant { faster: Strategy },
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientSamples { required } => {
                write!(f, "descriptive only (a hypothesis test needs {required} samples per strategy)")
            }
            Self::NotSignificant => write!(f, "no significant difference"),
            Self::Significant { faster } => write!(f, "{} is significantly faster", faster.label()),
        }
    }
}

/// Full comparison of two strategies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub metric: Metric,
    pub first: StrategySummary,
    pub second: StrategySummary,
    /// `None` below the sample minimum.
    pub test: Option<HypothesisTest>,
    pub alpha: f64,
    pub verdict: Verdict,
}

impl ComparisonReport {
    #[must_use]
    pub fn is_significant(&self) -> bool {
        matches!(self.verdict, Verdict::Significant { .. })
    }
}

/// Compares samples and selects the hypothesis test.
///
/// Both samples normal selects Welch's t-test; anything else (including a
/// sample whose normality could not be assessed) selects Mann–Whitney U.
#[derive(Debug, Clone, Copy)]
pub struct StatsComparator {
    alpha: f64,
    min_samples: usize,
}

impl Default for StatsComparator {
    fn default() -> Self {
        Self {
            alpha: SIGNIFICANCE_LEVEL,
            min_samples: MIN_HYPOTHESIS_SAMPLES,
        }
    }
}

impl StatsComparator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare two sample sets on `metric`.
    #[must_use]
    pub fn compare(&self, a: &SampleSet, b: &SampleSet, metric: Metric) -> ComparisonReport {
        self.compare_values(
            (a.strategy(), &a.values(metric)),
            (b.strategy(), &b.values(metric)),
            metric,
        )
    }

    /// Compare raw values, labelled with their strategies.
    #[must_use]
    pub fn compare_values(
        &self,
        (sa, a): (Strategy, &[f64]),
        (sb, b): (Strategy, &[f64]),
        metric: Metric,
    ) -> ComparisonReport {
        let first = StrategySummary::from_values(sa, a);
        let second = StrategySummary::from_values(sb, b);

        let (test, verdict) = if a.len() < self.min_samples || b.len() < self.min_samples {
            (
                None,
                Verdict::InsufficientSamples {
                    required: self.min_samples,
                },
            )
        } else {
            let test = if first.is_normal() && second.is_normal() {
                welch_t_test(a, b)
            } else {
                mann_whitney_u(a, b)
            };
            let verdict = match (&test, &first.summary, &second.summary) {
                (Some(t), Some(x), Some(y)) if t.p_value < self.alpha => Verdict::Significant {
                    faster: if x.mean <= y.mean { sa } else { sb },
                },
                _ => Verdict::NotSignificant,
            };
            (test, verdict)
        };

        debug!(
            first = %sa,
            second = %sb,
            n_first = a.len(),
            n_second = b.len(),
            test = ?test.map(|t| t.kind),
            verdict = %verdict,
            "compared samples"
        );

        ComparisonReport {
            metric,
            first,
            second,
            test,
            alpha: self.alpha,
            verdict,
        }
    }

    /// Compare every pair of sample sets, in order.
    #[must_use]
    pub fn compare_all(&self, sets: &[SampleSet], metric: Metric) -> Vec<ComparisonReport> {
        let mut reports = Vec::new();
        for (i, a) in sets.iter().enumerate() {
            for b in &sets[i + 1..] {
                reports.push(self.compare(a, b, metric));
            }
        }
        reports
    }
}
