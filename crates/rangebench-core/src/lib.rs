//! # rangebench-core
//!
//! Core library for the rangebench query-strategy harness: the partition
//! catalog, randomized workload generation, the competing count strategies,
//! datastore collaborators, and timed execution with transient-fault retry.

pub mod catalog;
pub mod connection;
pub mod constants;
pub mod error;
pub mod executor;
pub mod generator;
pub mod memory_store;
pub mod options;
pub mod query;
pub mod sample;
pub mod store;
pub mod strategy;

#[cfg(feature = "mongo")]
pub mod mongo_store;

// Re-exports
pub use catalog::{Coordinate, PartitionCatalog, PartitionRange};
pub use connection::ConnectionSettings;
pub use constants::exit_codes;
pub use error::{BenchError, StoreError};
pub use executor::{ExecutionResult, QueryExecutor, RetryPolicy};
pub use generator::WorkloadGenerator;
pub use memory_store::MemoryStore;
pub use options::{ExecutionMode, RunOptions};
pub use query::{IntervalRecord, Predicate, Query};
pub use sample::{Metric, SampleSet};
pub use store::{FaultInjector, RangeStore};
pub use strategy::Strategy;
