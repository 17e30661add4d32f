//! # rangebench-orchestration
//!
//! Interleaved scheduling of competing strategies, cross-strategy result
//! validation, and round-boundary reporting.

pub mod interfaces;
pub mod rotation;
pub mod scheduler;
pub mod validator;

pub use interfaces::{NullObserver, ObserverSet, ResultPresenter, RunObserver};
pub use rotation::Rotation;
pub use scheduler::{ExecutionScheduler, RunSummary};
pub use validator::ResultValidator;
