//! Benchmark run options.

use serde::{Deserialize, Serialize};

use crate::catalog::Coordinate;
use crate::constants::{DEFAULT_MARGIN, DEFAULT_QUERIES_PER_ROUND, DEFAULT_QUERY_LENGTH};
use crate::error::BenchError;
use crate::sample::Metric;
use crate::strategy::Strategy;

/// Whether strategies share one query per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Every strategy runs the same query and the counts are validated.
    #[default]
    CrossCheck,
    /// Every strategy invocation draws its own query; counts are not compared.
    Independent,
}

/// Options for a benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// Rounds to run; `None` runs until the process is stopped.
    pub rounds: Option<u64>,
    /// Passes per round.
    pub queries_per_round: u64,
    /// Query interval length.
    pub query_length: Coordinate,
    /// Matching margin.
    pub margin: Coordinate,
    /// Strategies to compare, in initial order.
    pub strategies: Vec<Strategy>,
    /// Shared or independent queries.
    pub mode: ExecutionMode,
    /// Quantity compared.
    pub metric: Metric,
    /// Emit an intermediate report every N rounds (0 = final report only).
    pub report_every: u64,
    /// Shuffle the strategy order once before the first pass.
    pub shuffle: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            rounds: Some(1),
            queries_per_round: DEFAULT_QUERIES_PER_ROUND,
            query_length: DEFAULT_QUERY_LENGTH,
            margin: DEFAULT_MARGIN,
            strategies: Strategy::ALL.to_vec(),
            mode: ExecutionMode::CrossCheck,
            metric: Metric::Latency,
            report_every: 0,
            shuffle: true,
        }
    }
}

impl RunOptions {
    /// Normalize options, applying defaults where values are zero.
    ///
    /// Continuous runs always report at every round boundary.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.queries_per_round == 0 {
            self.queries_per_round = DEFAULT_QUERIES_PER_ROUND;
        }
        if self.strategies.is_empty() {
            self.strategies = Strategy::ALL.to_vec();
        }
        if self.rounds.is_none() && self.report_every == 0 {
            self.report_every = 1;
        }
        self
    }

    /// Reject values no run can satisfy.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.query_length < 0 {
            return Err(BenchError::Config(format!(
                "query length must not be negative (got {})",
                self.query_length
            )));
        }
        if self.margin < 0 {
            return Err(BenchError::Config(format!(
                "margin must not be negative (got {})",
                self.margin
            )));
        }
        if self.rounds == Some(0) {
            return Err(BenchError::Config("runs must be at least 1".into()));
        }
        if self.mode == ExecutionMode::CrossCheck && self.strategies.len() < 2 {
            return Err(BenchError::Config(
                "cross-check mode needs at least two strategies".into(),
            ));
        }
        Ok(())
    }

    /// Whether the run has no natural end.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        self.rounds.is_none()
    }

    /// Total passes for a bounded run.
    #[must_use]
    pub fn total_passes(&self) -> Option<u64> {
        self.rounds
            .map(|r| r.saturating_mul(self.queries_per_round))
    }
}
