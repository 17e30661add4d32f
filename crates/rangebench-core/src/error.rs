//! Error types shared by every stage of a benchmark run.

use crate::query::Query;
use crate::strategy::Strategy;

/// Failure reported by a datastore collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The aggregation cursor yielded no document: the connection was dropped
    /// underneath the driver and must be reacquired.
    #[error("cursor exhausted before yielding a result")]
    CursorExhausted,

    /// The datastore rejected the credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Could not establish a connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The datastore rejected or failed the query itself.
    #[error("query failed: {0}")]
    Query(String),
}

impl StoreError {
    /// Whether the fault is recoverable by reconnecting and retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::CursorExhausted)
    }
}

/// Error type for a benchmark run.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// The partition identifier is not in the catalog.
    #[error("unknown partition: {0}")]
    UnknownPartition(String),

    /// No valid start coordinate exists for the requested length.
    #[error("invalid query length {length} for partition {partition} (span {span})")]
    InvalidLength {
        partition: String,
        length: i64,
        span: i64,
    },

    /// Two strategies disagree on the count for the same query.
    #[error(
        "count mismatch for query {query}: {expected_strategy} returned {expected}, \
         {actual_strategy} returned {actual}"
    )]
    CountMismatch {
        expected: u64,
        actual: u64,
        expected_strategy: Strategy,
        actual_strategy: Strategy,
        query: Query,
    },

    /// A bounded retry policy ran out while the fault was still transient.
    #[error("{strategy} gave up on query {query} after {attempts} attempts")]
    RetriesExhausted {
        strategy: Strategy,
        query: Query,
        attempts: u32,
    },

    /// Non-transient datastore failure.
    #[error("{strategy} failed on query {query}: {source}")]
    Store {
        strategy: Strategy,
        query: Query,
        #[source]
        source: StoreError,
    },

    /// Strategy name not recognised.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Writing results (log rows, reports) failed.
    #[error("cannot write results: {0}")]
    Output(String),
}
