//! CLI result presenter.

use std::fmt::Write as _;

use rangebench_core::query::Query;
use rangebench_core::sample::Metric;
use rangebench_orchestration::{ResultPresenter, RunObserver};
use rangebench_stats::{ComparisonReport, StrategySummary, TestKind};

use crate::output::{format_number, format_seconds};
use crate::ui;

/// CLI result presenter.
pub struct CliPresenter {
    verbose: bool,
    quiet: bool,
}

impl CliPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

fn metric_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Latency => "latency",
        Metric::PerRecord => "latency per record",
    }
}

fn summary_line(out: &mut String, s: &StrategySummary) {
    let normality = match &s.normality {
        Some(n) if n.is_normal() => format!("normal (p={:.4})", n.p_value),
        Some(n) => format!("not normal (p={:.4})", n.p_value),
        None => "not assessed".to_string(),
    };
    match &s.summary {
        Some(d) => {
            let _ = writeln!(
                out,
                "  {:<18} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  {normality}",
                s.strategy.label(),
                format_number(d.count as u64),
                format_seconds(d.mean),
                format_seconds(d.std_dev),
                format_seconds(d.min),
                format_seconds(d.q1),
                format_seconds(d.median),
                format_seconds(d.q3),
                format_seconds(d.max),
            );
        }
        None => {
            let _ = writeln!(out, "  {:<18} {:>6}  no samples", s.strategy.label(), 0);
        }
    }
}

/// Plain-text rendering of one comparison report.
#[must_use]
pub fn render_report(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {:<18} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}  normality",
        "strategy", "n", "mean", "std", "min", "q1", "median", "q3", "max"
    );
    summary_line(&mut out, &report.first);
    summary_line(&mut out, &report.second);
    if let Some(test) = &report.test {
        let _ = match (test.kind, test.df) {
            (TestKind::Welch, Some(df)) => writeln!(
                out,
                "  {}: t={:.4}, df={df:.1}, p={:.4}",
                test.kind, test.statistic, test.p_value
            ),
            _ => writeln!(
                out,
                "  {}: U={:.1}, p={:.4}",
                test.kind, test.statistic, test.p_value
            ),
        };
    }
    let _ = writeln!(out, "  verdict: {} (alpha {})", report.verdict, report.alpha);
    out
}

impl ResultPresenter for CliPresenter {
    fn present_report(&self, report: &ComparisonReport) {
        if self.quiet {
            println!("{}", report.verdict);
            return;
        }
        ui::print_header(&format!(
            "{} vs {} ({})",
            report.first.strategy.label(),
            report.second.strategy.label(),
            metric_label(report.metric)
        ));
        print!("{}", render_report(report));
    }

    fn present_error(&self, error: &str) {
        ui::print_error(error);
    }
}

impl RunObserver for CliPresenter {
    fn on_query(&mut self, _pass: u64, query: &Query) {
        if self.verbose && !self.quiet {
            println!(
                "{} {} {} {}",
                query.partition, query.start, query.end, query.margin
            );
        }
    }

    fn on_report(&mut self, round: u64, reports: &[ComparisonReport], is_final: bool) {
        if !self.quiet {
            let title = if is_final {
                format!("Round {round} (final)")
            } else {
                format!("Round {round}")
            };
            ui::print_header(&title);
        }
        for report in reports {
            self.present_report(report);
        }
    }
}
