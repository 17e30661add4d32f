//! Progress display for benchmark runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use rangebench_core::executor::ExecutionResult;
use rangebench_core::query::Query;
use rangebench_orchestration::RunObserver;

use crate::output::{format_duration, format_number};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} passes {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {pos} passes {msg}";

/// Bar for bounded runs, spinner for continuous ones.
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    /// Progress over `total_passes`, or a spinner when `None`.
    #[must_use]
    pub fn new(total_passes: Option<u64>) -> Self {
        let bar = ProgressBar::with_draw_target(total_passes, ProgressDrawTarget::stderr());
        match total_passes {
            Some(_) => {
                if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                    bar.set_style(style.progress_chars("=> "));
                }
            }
            None => {
                if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                    bar.set_style(style);
                }
                bar.enable_steady_tick(Duration::from_millis(120));
            }
        }
        Self { bar }
    }

    /// A display that draws nothing.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Passes started so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl RunObserver for ProgressDisplay {
    fn on_query(&mut self, pass: u64, _query: &Query) {
        // Independent mode draws several queries per pass.
        self.bar.set_position(pass + 1);
    }

    fn on_execution(&mut self, query: &Query, result: &ExecutionResult) -> std::io::Result<()> {
        self.bar.set_message(format!(
            "{} {} -> {} in {}",
            result.strategy,
            query,
            format_number(result.count),
            format_duration(result.latency)
        ));
        Ok(())
    }

    fn on_finish(&mut self) {
        self.bar.finish_and_clear();
    }
}
