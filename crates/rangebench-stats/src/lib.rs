//! # rangebench-stats
//!
//! Descriptive statistics, normality testing, and the two-sample hypothesis
//! tests used to compare strategy latencies.

pub mod comparator;
pub mod descriptive;
pub mod distributions;
pub mod hypothesis;
pub mod normality;

pub use comparator::{ComparisonReport, StatsComparator, StrategySummary, Verdict};
pub use descriptive::Summary;
pub use hypothesis::{HypothesisTest, TestKind};
pub use normality::NormalityResult;
