//! rangebench library: configuration, dispatch, and run reports for the
//! `rangebench` binary.

pub mod app;
pub mod config;
pub mod errors;
pub mod report;
pub mod version;
