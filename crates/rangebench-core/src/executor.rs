//! Timed query execution with transient-fault retry.

use std::time::{Duration, Instant, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_BACKOFF_MS, MAX_RETRY_BACKOFF_MS};
use crate::error::BenchError;
use crate::query::Query;
use crate::store::RangeStore;
use crate::strategy::Strategy;

/// Outcome of one executed query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Strategy that produced the count.
    pub strategy: Strategy,
    /// Wall-clock duration of the successful round-trip.
    pub latency: Duration,
    /// Number of matching records.
    pub count: u64,
    /// When the successful attempt was issued.
    pub issued_at: SystemTime,
    /// Transient faults recovered from before succeeding.
    pub retries: u32,
}

impl ExecutionResult {
    /// Latency divided by the number of matching records, if any matched.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn latency_per_record(&self) -> Option<f64> {
        (self.count > 0).then(|| self.latency.as_secs_f64() / self.count as f64)
    }

    /// Issue time as fractional seconds since the Unix epoch.
    #[must_use]
    pub fn issued_unix_secs(&self) -> f64 {
        self.issued_at
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64()
    }
}

/// How transient faults are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retries per query; `None` retries forever.
    pub max_retries: Option<u32>,
    /// Delay before the first retry; doubled after each further fault.
    pub initial_backoff: Duration,
    /// Ceiling for the doubled delay.
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Retry forever with no delay.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            max_retries: None,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Bounded retries with exponential backoff.
    #[must_use]
    pub fn bounded(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries: Some(max_retries),
            initial_backoff,
            max_backoff: Duration::from_millis(MAX_RETRY_BACKOFF_MS).max(initial_backoff),
        }
    }

    /// Delay to wait before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        if self.initial_backoff.is_zero() {
            return Duration::ZERO;
        }
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Whether another retry is allowed after `retries` have been spent.
    #[must_use]
    pub fn allows(&self, retries: u32) -> bool {
        self.max_retries.map_or(true, |max| retries < max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::bounded(
            DEFAULT_MAX_RETRIES,
            Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        )
    }
}

/// Executes a strategy against a store, timing only the round-trip.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor {
    policy: RetryPolicy,
}

impl QueryExecutor {
    /// Executor retrying transient faults under `policy`.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// The active retry policy.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `strategy` for `query`.
    ///
    /// A transient fault triggers `reconnect()` and a retry of the same
    /// query; anything else is returned immediately with context.
    pub fn execute(
        &self,
        store: &mut dyn RangeStore,
        strategy: Strategy,
        query: &Query,
    ) -> Result<ExecutionResult, BenchError> {
        let predicate = query.predicate();
        let mut retries = 0u32;
        loop {
            let issued_at = SystemTime::now();
            let start = Instant::now();
            let outcome = strategy.count(store, &predicate);
            let latency = start.elapsed();

            match outcome {
                Ok(count) => {
                    debug!(%strategy, %query, count, ?latency, retries, "query executed");
                    return Ok(ExecutionResult {
                        strategy,
                        latency,
                        count,
                        issued_at,
                        retries,
                    });
                }
                Err(err) if err.is_transient() => {
                    if !self.policy.allows(retries) {
                        return Err(BenchError::RetriesExhausted {
                            strategy,
                            query: query.clone(),
                            attempts: retries + 1,
                        });
                    }
                    retries += 1;
                    warn!(%strategy, %query, retry = retries, "transient fault, reconnecting");
                    let delay = self.policy.backoff(retries);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    match store.reconnect() {
                        Ok(()) => {}
                        Err(e) if e.is_transient() => {
                            warn!(%strategy, error = %e, "reconnect failed, will retry");
                        }
                        Err(source) => {
                            return Err(BenchError::Store {
                                strategy,
                                query: query.clone(),
                                source,
                            });
                        }
                    }
                }
                Err(source) => {
                    return Err(BenchError::Store {
                        strategy,
                        query: query.clone(),
                        source,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::memory_store::MemoryStore;
    use crate::query::{IntervalRecord, Predicate};
    use crate::store::FaultInjector;

    fn store() -> MemoryStore {
        MemoryStore::from_records(vec![
            IntervalRecord::new("1", 150, 160),
            IntervalRecord::new("1", 170, 180),
        ])
    }

    fn query() -> Query {
        Query::new("1", 100, 200, 10)
    }

    fn no_wait(max: u32) -> RetryPolicy {
        RetryPolicy::bounded(max, Duration::ZERO)
    }

    #[test]
    fn executes_both_strategies() {
        let mut s = store();
        let exec = QueryExecutor::new(no_wait(0));
        for strategy in Strategy::ALL {
            let r = exec.execute(&mut s, strategy, &query()).unwrap();
            assert_eq!(r.strategy, strategy);
            assert_eq!(r.count, 2);
            assert_eq!(r.retries, 0);
        }
    }

    #[test]
    fn one_fault_then_success() {
        let mut s = FaultInjector::new(store(), 1);
        let exec = QueryExecutor::new(no_wait(5));
        let r = exec
            .execute(&mut s, Strategy::AggregateCount, &query())
            .unwrap();
        assert_eq!(r.count, 2);
        assert_eq!(r.retries, 1);
        assert_eq!(s.reconnects(), 1);
    }

    #[test]
    fn unbounded_policy_outlasts_many_faults() {
        let mut s = FaultInjector::new(store(), 50);
        let exec = QueryExecutor::new(RetryPolicy::unbounded());
        let r = exec.execute(&mut s, Strategy::FindCount, &query()).unwrap();
        assert_eq!(r.retries, 50);
        assert_eq!(s.reconnects(), 50);
    }

    #[test]
    fn bounded_policy_gives_up() {
        let mut s = FaultInjector::new(store(), 10);
        let exec = QueryExecutor::new(no_wait(3));
        let err = exec
            .execute(&mut s, Strategy::AggregateCount, &query())
            .unwrap_err();
        assert!(matches!(
            err,
            BenchError::RetriesExhausted { attempts: 4, strategy: Strategy::AggregateCount, .. }
        ));
        assert_eq!(s.reconnects(), 3);
    }

    struct BrokenStore;

    impl RangeStore for BrokenStore {
        fn count_matching(&self, _: &Predicate) -> Result<u64, StoreError> {
            Err(StoreError::Authentication("bad credentials".into()))
        }
        fn count_matching_grouped(&self, _: &Predicate) -> Result<u64, StoreError> {
            Err(StoreError::Query("bad pipeline".into()))
        }
        fn reconnect(&mut self) -> Result<(), StoreError> {
            panic!("non-transient errors must not reconnect");
        }
        fn describe(&self) -> String {
            "broken".into()
        }
    }

    #[test]
    fn non_transient_error_is_fatal_with_context() {
        let exec = QueryExecutor::new(RetryPolicy::unbounded());
        let err = exec
            .execute(&mut BrokenStore, Strategy::FindCount, &query())
            .unwrap_err();
        match err {
            BenchError::Store {
                strategy,
                query: q,
                source,
            } => {
                assert_eq!(strategy, Strategy::FindCount);
                assert_eq!(q, query());
                assert!(matches!(source, StoreError::Authentication(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    /// Faults on every count and rejects the credentials on reconnect.
    struct ExpiredCredentials {
        reconnects: u32,
    }

    impl RangeStore for ExpiredCredentials {
        fn count_matching(&self, _: &Predicate) -> Result<u64, StoreError> {
            Err(StoreError::CursorExhausted)
        }
        fn count_matching_grouped(&self, _: &Predicate) -> Result<u64, StoreError> {
            Err(StoreError::CursorExhausted)
        }
        fn reconnect(&mut self) -> Result<(), StoreError> {
            self.reconnects += 1;
            Err(StoreError::Authentication("bad credentials".into()))
        }
        fn describe(&self) -> String {
            "expired".into()
        }
    }

    #[test]
    fn failed_reconnect_is_fatal_with_context() {
        for policy in [no_wait(5), RetryPolicy::unbounded()] {
            let mut s = ExpiredCredentials { reconnects: 0 };
            let err = QueryExecutor::new(policy)
                .execute(&mut s, Strategy::FindCount, &query())
                .unwrap_err();
            match err {
                BenchError::Store { strategy, source, .. } => {
                    assert_eq!(strategy, Strategy::FindCount);
                    assert_eq!(source, StoreError::Authentication("bad credentials".into()));
                }
                other => panic!("unexpected error {other:?}"),
            }
            assert_eq!(s.reconnects, 1);
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_retries: Some(10),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn unbounded_has_no_delay() {
        let policy = RetryPolicy::unbounded();
        assert!(policy.allows(u32::MAX - 1));
        assert_eq!(policy.backoff(7), Duration::ZERO);
    }

    #[test]
    fn latency_per_record() {
        let r = ExecutionResult {
            strategy: Strategy::FindCount,
            latency: Duration::from_millis(10),
            count: 4,
            issued_at: SystemTime::UNIX_EPOCH,
            retries: 0,
        };
        assert!((r.latency_per_record().unwrap() - 0.0025).abs() < 1e-12);
        let empty = ExecutionResult { count: 0, ..r };
        assert!(empty.latency_per_record().is_none());
        assert!(empty.issued_unix_secs().abs() < f64::EPSILON);
    }
}
