//! CLI output formatting and the append-only run log.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use rangebench_core::executor::ExecutionResult;
use rangebench_core::query::Query;
use rangebench_orchestration::RunObserver;

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.000_001 {
        format!("{}ns", d.as_nanos())
    } else if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format fractional seconds for display; non-finite or negative values as `-`.
#[must_use]
pub fn format_seconds(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "-".to_string();
    }
    format_duration(Duration::from_secs_f64(secs))
}

/// Format a number with thousand separators.
#[must_use]
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// One tab-separated log row:
/// `strategy, latency_seconds, result_count, timestamp, partition, start, end, margin`.
#[must_use]
pub fn log_row(query: &Query, result: &ExecutionResult) -> String {
    format!(
        "{}\t{:.9}\t{}\t{:.6}\t{}\t{}\t{}\t{}",
        result.strategy.code(),
        result.latency.as_secs_f64(),
        result.count,
        result.issued_unix_secs(),
        query.partition,
        query.start,
        query.end,
        query.margin,
    )
}

/// Appends one row per executed query to a log file.
pub struct LogSink<W: Write = BufWriter<File>> {
    out: W,
    rows: u64,
}

impl LogSink {
    /// Open `path` for appending, creating it if needed.
    pub fn append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> LogSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, rows: 0 }
    }

    /// Rows written so far.
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and return the writer.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> RunObserver for LogSink<W> {
    fn on_execution(&mut self, query: &Query, result: &ExecutionResult) -> io::Result<()> {
        writeln!(self.out, "{}", log_row(query, result))?;
        self.rows += 1;
        Ok(())
    }

    fn on_report(&mut self, _round: u64, _reports: &[rangebench_stats::ComparisonReport], _is_final: bool) {
        // Rows survive an interrupted continuous run up to the last report.
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "cannot flush run log");
        }
    }

    fn on_finish(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "cannot flush run log");
        }
    }
}

/// Write `value` as pretty JSON to `path`, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()
}
