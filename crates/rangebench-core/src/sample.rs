//! Per-strategy latency samples accumulated during a run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::executor::ExecutionResult;
use crate::strategy::Strategy;

/// Which quantity a comparison is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Raw round-trip latency in seconds.
    #[default]
    Latency,
    /// Latency divided by the number of matching records.
    PerRecord,
}

/// Ordered samples for one strategy. Grows monotonically.
#[derive(Debug, Clone)]
pub struct SampleSet {
    strategy: Strategy,
    latencies: Vec<Duration>,
    per_record: Vec<f64>,
}

impl SampleSet {
    #[must_use]
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            latencies: Vec::new(),
            per_record: Vec::new(),
        }
    }

    /// Strategy the samples belong to.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Record one execution. Results for other strategies are ignored.
    pub fn record(&mut self, result: &ExecutionResult) {
        if result.strategy != self.strategy {
            return;
        }
        self.latencies.push(result.latency);
        if let Some(v) = result.latency_per_record() {
            self.per_record.push(v);
        }
    }

    /// Number of latency samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.latencies.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latencies.is_empty()
    }

    /// Raw latencies in recording order.
    #[must_use]
    pub fn latencies(&self) -> &[Duration] {
        &self.latencies
    }

    /// Values for `metric`, in seconds (per record for `PerRecord`).
    ///
    /// Zero-count executions have no per-record value and are absent there.
    #[must_use]
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        match metric {
            Metric::Latency => self.latencies.iter().map(Duration::as_secs_f64).collect(),
            Metric::PerRecord => self.per_record.clone(),
        }
    }
}
