//! Orchestration interfaces.

use std::io;

use rangebench_core::executor::ExecutionResult;
use rangebench_core::query::Query;
use rangebench_stats::ComparisonReport;

/// Receives events while a run progresses.
///
/// All methods default to doing nothing.
pub trait RunObserver {
    /// A query was generated for `pass`.
    fn on_query(&mut self, _pass: u64, _query: &Query) {}

    /// One strategy finished executing `query`.
    fn on_execution(&mut self, _query: &Query, _result: &ExecutionResult) -> io::Result<()> {
        Ok(())
    }

    /// Comparison reports at a round boundary. `is_final` marks the last
    /// report of a bounded run.
    fn on_report(&mut self, _round: u64, _reports: &[ComparisonReport], _is_final: bool) {}

    /// The run ended.
    fn on_finish(&mut self) {}
}

/// Trait for presenting results to the user.
pub trait ResultPresenter {
    /// Present one comparison report.
    fn present_report(&self, report: &ComparisonReport);

    /// Present an error.
    fn present_error(&self, error: &str);
}

/// Observer that ignores everything.
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Fans events out to several observers, in registration order.
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn RunObserver>>,
}

impl ObserverSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer.
    pub fn push(&mut self, observer: Box<dyn RunObserver>) {
        self.observers.push(observer);
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl RunObserver for ObserverSet {
    fn on_query(&mut self, pass: u64, query: &Query) {
        for o in &mut self.observers {
            o.on_query(pass, query);
        }
    }

    fn on_execution(&mut self, query: &Query, result: &ExecutionResult) -> io::Result<()> {
        for o in &mut self.observers {
            o.on_execution(query, result)?;
        }
        Ok(())
    }

    fn on_report(&mut self, round: u64, reports: &[ComparisonReport], is_final: bool) {
        for o in &mut self.observers {
            o.on_report(round, reports, is_final);
        }
    }

    fn on_finish(&mut self) {
        for o in &mut self.observers {
            o.on_finish();
        }
    }
}
