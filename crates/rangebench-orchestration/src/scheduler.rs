//! Interleaved execution of competing strategies.
//!
//! A pass executes every selected strategy once; a round is
//! `queries_per_round` passes. At round boundaries the accumulated samples
//! are compared and the reports handed to the observer.

use serde::Serialize;
use tracing::{debug, info};

use rangebench_core::error::BenchError;
use rangebench_core::executor::{ExecutionResult, QueryExecutor};
use rangebench_core::generator::WorkloadGenerator;
use rangebench_core::options::{ExecutionMode, RunOptions};
use rangebench_core::query::Query;
use rangebench_core::sample::SampleSet;
use rangebench_core::store::RangeStore;
use rangebench_stats::{ComparisonReport, StatsComparator};

use crate::interfaces::RunObserver;
use crate::rotation::Rotation;
use crate::validator::ResultValidator;

/// What a finished (or interrupted) run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rounds: u64,
    pub passes: u64,
    pub executions: u64,
    /// Transient faults recovered from across all executions.
    pub retries: u64,
    pub reports: Vec<ComparisonReport>,
}

/// Owns the datastore handle and the per-run samples.
pub struct ExecutionScheduler<S> {
    store: S,
    generator: WorkloadGenerator,
    executor: QueryExecutor,
    options: RunOptions,
    comparator: StatsComparator,
    validator: ResultValidator,
    rotation: Rotation,
    samples: Vec<SampleSet>,
    rounds: u64,
    passes: u64,
    executions: u64,
    retries: u64,
}

impl<S: RangeStore> ExecutionScheduler<S> {
    /// Build a scheduler; options are normalized and validated here.
    ///
    /// With `shuffle` set, the strategy order is shuffled once using the
    /// generator's RNG before the round-robin starts.
    pub fn new(
        store: S,
        mut generator: WorkloadGenerator,
        executor: QueryExecutor,
        options: RunOptions,
    ) -> Result<Self, BenchError> {
        let options = options.normalize();
        options.validate()?;

        let samples = options.strategies.iter().map(|&s| SampleSet::new(s)).collect();
        let mut order = options.strategies.clone();
        if options.shuffle {
            generator.shuffle(&mut order);
        }
        debug!(?order, mode = ?options.mode, "initial strategy order");

        Ok(Self {
            store,
            generator,
            executor,
            options,
            comparator: StatsComparator::new(),
            validator: ResultValidator,
            rotation: Rotation::new(order),
            samples,
            rounds: 0,
            passes: 0,
            executions: 0,
            retries: 0,
        })
    }

    /// Effective options.
    #[must_use]
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Round-robin in use.
    #[must_use]
    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    /// Accumulated samples, in configured strategy order.
    #[must_use]
    pub fn samples(&self) -> &[SampleSet] {
        &self.samples
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Give the datastore back.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Rounds completed so far.
    #[must_use]
    pub fn rounds_completed(&self) -> u64 {
        self.rounds
    }

    /// Comparison of the samples accumulated so far.
    #[must_use]
    pub fn reports(&self) -> Vec<ComparisonReport> {
        self.comparator.compare_all(&self.samples, self.options.metric)
    }

    /// Whether a bounded run has completed all its rounds.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.options.rounds.is_some_and(|r| self.rounds >= r)
    }

    /// Run to completion.
    ///
    /// Bounded runs end after their last round with a final report;
    /// continuous runs only return on error.
    pub fn run(&mut self, observer: &mut dyn RunObserver) -> Result<RunSummary, BenchError> {
        while !self.is_done() {
            self.run_round(observer)?;
        }
        observer.on_finish();
        Ok(self.summary())
    }

    /// Run one round, reporting at the boundary when one is due.
    ///
    /// Returns the reports handed to the observer, if any.
    pub fn run_round(
        &mut self,
        observer: &mut dyn RunObserver,
    ) -> Result<Option<Vec<ComparisonReport>>, BenchError> {
        for _ in 0..self.options.queries_per_round {
            self.run_pass(observer)?;
        }
        self.rounds += 1;
        info!(
            round = self.rounds,
            passes = self.passes,
            executions = self.executions,
            "round complete"
        );

        let is_final = self.is_done();
        let every = self.options.report_every;
        if !is_final && (every == 0 || self.rounds % every != 0) {
            return Ok(None);
        }
        let reports = self.reports();
        observer.on_report(self.rounds, &reports, is_final);
        Ok(Some(reports))
    }

    /// Snapshot of the run so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rounds: self.rounds,
            passes: self.passes,
            executions: self.executions,
            retries: self.retries,
            reports: self.reports(),
        }
    }

    fn run_pass(&mut self, observer: &mut dyn RunObserver) -> Result<(), BenchError> {
        let pass = self.passes;
        let order = self.rotation.order_for(pass);
        match self.options.mode {
            ExecutionMode::CrossCheck => {
                let query = self.next_query()?;
                observer.on_query(pass, &query);
                let mut results = Vec::with_capacity(order.len());
                for strategy in order {
                    results.push(self.execute(observer, strategy, &query)?);
                }
                self.validator.validate(&query, &results)?;
            }
            ExecutionMode::Independent => {
                for strategy in order {
                    let query = self.next_query()?;
                    observer.on_query(pass, &query);
                    self.execute(observer, strategy, &query)?;
                }
            }
        }
        self.passes += 1;
        Ok(())
    }

    fn next_query(&mut self) -> Result<Query, BenchError> {
        self.generator
            .generate(self.options.query_length, self.options.margin)
    }

    fn execute(
        &mut self,
        observer: &mut dyn RunObserver,
        strategy: rangebench_core::strategy::Strategy,
        query: &Query,
    ) -> Result<ExecutionResult, BenchError> {
        let result = self.executor.execute(&mut self.store, strategy, query)?;
        self.executions += 1;
        self.retries += u64::from(result.retries);
        if let Some(set) = self.samples.iter_mut().find(|s| s.strategy() == strategy) {
            set.record(&result);
        }
        observer
            .on_execution(query, &result)
            .map_err(|e| BenchError::Output(e.to_string()))?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    use rangebench_core::catalog::PartitionCatalog;
    use rangebench_core::error::StoreError;
    use rangebench_core::executor::RetryPolicy;
    use rangebench_core::memory_store::MemoryStore;
    use rangebench_core::query::{IntervalRecord, Predicate};
    use rangebench_core::store::FaultInjector;
    use rangebench_core::strategy::Strategy;

    use crate::interfaces::NullObserver;

    fn catalog() -> Arc<PartitionCatalog> {
        Arc::new(PartitionCatalog::grch37())
    }

    fn store() -> MemoryStore {
        MemoryStore::from_records(vec![
            IntervalRecord::new("1", 1_000_000, 1_000_100),
            IntervalRecord::new("13", 20_000_000, 20_000_500),
        ])
    }

    fn scheduler<S: RangeStore>(store: S, options: RunOptions) -> ExecutionScheduler<S> {
        ExecutionScheduler::new(
            store,
            WorkloadGenerator::seeded(catalog(), 99),
            QueryExecutor::new(RetryPolicy::unbounded()),
            options,
        )
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        queries: Vec<(u64, Query)>,
        executions: Vec<Strategy>,
        reports: Vec<(u64, usize, bool)>,
        finished: bool,
    }

    impl RunObserver for Recorder {
        fn on_query(&mut self, pass: u64, query: &Query) {
            self.queries.push((pass, query.clone()));
        }
        fn on_execution(&mut self, _query: &Query, result: &ExecutionResult) -> io::Result<()> {
            self.executions.push(result.strategy);
            Ok(())
        }
        fn on_report(&mut self, round: u64, reports: &[ComparisonReport], is_final: bool) {
            self.reports.push((round, reports.len(), is_final));
        }
        fn on_finish(&mut self) {
            self.finished = true;
        }
    }

    #[test]
    fn bounded_run_counts_passes() {
        let mut s = scheduler(
            store(),
            RunOptions {
                rounds: Some(2),
                queries_per_round: 5,
                ..Default::default()
            },
        );
        let mut rec = Recorder::default();
        let summary = s.run(&mut rec).unwrap();
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.passes, 10);
        assert_eq!(summary.executions, 20);
        assert_eq!(rec.queries.len(), 10);
        assert_eq!(rec.reports, [(2, 1, true)]);
        assert!(rec.finished);
        for set in s.samples() {
            assert_eq!(set.len(), 10);
        }
    }

    #[test]
    fn cross_check_alternates_leaders() {
        let mut s = scheduler(
            store(),
            RunOptions {
                rounds: Some(1),
                queries_per_round: 6,
                shuffle: false,
                ..Default::default()
            },
        );
        let mut rec = Recorder::default();
        s.run(&mut rec).unwrap();
        let leaders: Vec<Strategy> = rec.executions.chunks(2).map(|c| c[0]).collect();
        assert_eq!(
            leaders,
            [
                Strategy::FindCount,
                Strategy::AggregateCount,
                Strategy::FindCount,
                Strategy::AggregateCount,
                Strategy::FindCount,
                Strategy::AggregateCount,
            ]
        );
    }

    #[test]
    fn independent_mode_draws_a_query_per_invocation() {
        let mut s = scheduler(
            store(),
            RunOptions {
                rounds: Some(1),
                queries_per_round: 3,
                mode: ExecutionMode::Independent,
                ..Default::default()
            },
        );
        let mut rec = Recorder::default();
        s.run(&mut rec).unwrap();
        assert_eq!(rec.queries.len(), 6);
        assert_eq!(rec.executions.len(), 6);
        assert_eq!(rec.queries[0].0, rec.queries[1].0);
    }

    /// Store whose two counts disagree.
    struct SkewedStore;

    impl RangeStore for SkewedStore {
        fn count_matching(&self, _predicate: &Predicate) -> Result<u64, StoreError> {
            Ok(42)
        }
        fn count_matching_grouped(&self, _predicate: &Predicate) -> Result<u64, StoreError> {
            Ok(43)
        }
        fn reconnect(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
        fn describe(&self) -> String {
            "skewed".into()
        }
    }

    #[test]
    fn cross_check_mismatch_is_fatal() {
        let mut s = scheduler(
            SkewedStore,
            RunOptions {
                shuffle: false,
                ..Default::default()
            },
        );
        let err = s.run(&mut NullObserver).unwrap_err();
        assert!(matches!(
            err,
            BenchError::CountMismatch {
                expected: 42,
                actual: 43,
                ..
            }
        ));
    }

    #[test]
    fn independent_mode_skips_validation() {
        let mut s = scheduler(
            SkewedStore,
            RunOptions {
                mode: ExecutionMode::Independent,
                ..Default::default()
            },
        );
        assert!(s.run(&mut NullObserver).is_ok());
    }

    #[test]
    fn transient_faults_are_counted() {
        let mut s = scheduler(FaultInjector::new(store(), 3), RunOptions::default());
        let summary = s.run(&mut NullObserver).unwrap();
        assert_eq!(summary.retries, 3);
        assert_eq!(s.into_store().reconnects(), 3);
    }

    #[test]
    fn continuous_reports_every_round() {
        let mut s = scheduler(
            store(),
            RunOptions {
                rounds: None,
                queries_per_round: 4,
                ..Default::default()
            },
        );
        let mut rec = Recorder::default();
        for round in 1..=3 {
            let reports = s.run_round(&mut rec).unwrap();
            assert!(reports.is_some());
            assert_eq!(s.rounds_completed(), round);
            assert!(!s.is_done());
        }
        assert_eq!(rec.reports, [(1, 1, false), (2, 1, false), (3, 1, false)]);
        assert_eq!(s.samples()[0].len(), 12);
    }

    #[test]
    fn report_every_n_rounds() {
        let mut s = scheduler(
            store(),
            RunOptions {
                rounds: Some(5),
                report_every: 2,
                ..Default::default()
            },
        );
        let mut rec = Recorder::default();
        s.run(&mut rec).unwrap();
        assert_eq!(rec.reports, [(2, 1, false), (4, 1, false), (5, 1, true)]);
    }

    #[test]
    fn invalid_options_rejected() {
        let result = ExecutionScheduler::new(
            store(),
            WorkloadGenerator::seeded(catalog(), 1),
            QueryExecutor::default(),
            RunOptions {
                strategies: vec![Strategy::FindCount],
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(BenchError::Config(_))));
    }

    struct FailingSink;

    impl RunObserver for FailingSink {
        fn on_execution(&mut self, _query: &Query, _result: &ExecutionResult) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn sink_failure_is_fatal() {
        let mut s = scheduler(store(), RunOptions::default());
        let err = s.run(&mut FailingSink).unwrap_err();
        assert!(matches!(err, BenchError::Output(_)));
    }
}
