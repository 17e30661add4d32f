//! Constants for workload defaults, retry behaviour, and statistical thresholds.

/// Default query interval length in bases.
pub const DEFAULT_QUERY_LENGTH: i64 = 1_000_000;

/// Default margin added around the query interval when matching records.
pub const DEFAULT_MARGIN: i64 = 1_000;

/// Default number of passes that make up one round.
pub const DEFAULT_QUERIES_PER_ROUND: u64 = 1;

/// Default cap on transient-fault retries for a single query.
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Default initial backoff between retries, in milliseconds.
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 50;

/// Upper bound for exponential retry backoff, in milliseconds.
pub const MAX_RETRY_BACKOFF_MS: u64 = 5_000;

/// Smallest sample size (per strategy) for which a hypothesis test is run.
///
/// Below this only descriptive statistics are reported.
pub const MIN_HYPOTHESIS_SAMPLES: usize = 21;

/// Smallest sample size the D'Agostino-Pearson normality test accepts.
pub const MIN_NORMALITY_SAMPLES: usize = 8;

/// Significance level used for both the normality check and the comparison.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Default MongoDB port when a host is given without one.
pub const DEFAULT_MONGO_PORT: u16 = 27017;

/// Default synthetic records per partition for the in-memory backend.
pub const DEFAULT_SYNTHETIC_RECORDS: usize = 1_000;

/// Longest synthetic record, in bases.
pub const SYNTHETIC_MAX_RECORD_LENGTH: i64 = 10_000;

/// Exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Any fatal error: invalid arguments, unknown strategy, mismatch, datastore failure.
    pub const ERROR_GENERIC: i32 = 1;
}
