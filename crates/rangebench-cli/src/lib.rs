//! # rangebench-cli
//!
//! CLI output, the append-only run log, offline history analysis, progress
//! display, and shell completion.

pub mod completion;
pub mod history;
pub mod output;
pub mod presenter;
pub mod progress;
pub mod ui;

pub use history::{History, HistoryError};
pub use output::LogSink;
pub use presenter::CliPresenter;
pub use progress::ProgressDisplay;
