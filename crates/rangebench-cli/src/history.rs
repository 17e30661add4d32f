//! Reading run logs back for offline analysis.
//!
//! Two layouts are accepted: the eight-column log written by
//! [`LogSink`](crate::output::LogSink) and a bare two-column
//! `strategy latency_seconds` layout. Columns may be separated by tabs or
//! spaces; blank lines and `#` comments are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use rangebench_core::sample::Metric;
use rangebench_core::strategy::Strategy;
use rangebench_stats::{ComparisonReport, StatsComparator};

/// Errors while reading a run log.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// One parsed row.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub strategy: Strategy,
    pub latency_secs: f64,
    /// Only present in the eight-column layout.
    pub count: Option<u64>,
}

impl HistoryRow {
    /// Value of `metric` for this row, if defined.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Latency => Some(self.latency_secs),
            Metric::PerRecord => match self.count {
                Some(c) if c > 0 => Some(self.latency_secs / c as f64),
                _ => None,
            },
        }
    }
}

/// Parsed run log.
#[derive(Debug, Default)]
pub struct History {
    rows: Vec<HistoryRow>,
    skipped: usize,
}

impl History {
    /// Open and parse `path`.
    pub fn from_path(path: &Path) -> Result<Self, HistoryError> {
        let io_err = |source| HistoryError::Io {
            path: path.display().to_string(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            HistoryError::Io { source, .. } => io_err(source),
            other => other,
        })
    }

    /// Parse a log from any reader.
    ///
    /// Rows naming an unknown strategy are skipped and counted.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, HistoryError> {
        let mut history = Self::default();
        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|source| HistoryError::Io {
                path: "<input>".into(),
                source,
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(row) = parse_row(line, line_no)? {
                history.rows.push(row);
            } else {
                history.skipped += 1;
            }
        }
        debug!(rows = history.rows.len(), skipped = history.skipped, "history parsed");
        Ok(history)
    }

    #[must_use]
    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    /// Rows skipped for naming an unknown strategy.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Values of `metric` recorded for `strategy`, in file order.
    #[must_use]
    pub fn values(&self, strategy: Strategy, metric: Metric) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.strategy == strategy)
            .filter_map(|r| r.value(metric))
            .collect()
    }

    /// Compare every pair of strategies present in the log.
    #[must_use]
    pub fn compare(&self, comparator: &StatsComparator, metric: Metric) -> Vec<ComparisonReport> {
        let present: Vec<(Strategy, Vec<f64>)> = Strategy::ALL
            .iter()
            .filter(|s| self.rows.iter().any(|r| r.strategy == **s))
            .map(|&s| (s, self.values(s, metric)))
            .collect();
        let mut reports = Vec::new();
        for (i, (sa, a)) in present.iter().enumerate() {
            for (sb, b) in &present[i + 1..] {
                reports.push(comparator.compare_values((*sa, a), (*sb, b), metric));
            }
        }
        reports
    }
}

fn parse_row(line: &str, line_no: usize) -> Result<Option<HistoryRow>, HistoryError> {
    let malformed = |reason: String| HistoryError::Malformed {
        line: line_no,
        reason,
    };
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 && fields.len() != 8 {
        return Err(malformed(format!(
            "expected 2 or 8 columns, found {}",
            fields.len()
        )));
    }

    let Ok(strategy) = fields[0].parse::<Strategy>() else {
        debug!(line = line_no, name = fields[0], "skipping unknown strategy");
        return Ok(None);
    };
    let latency_secs: f64 = fields[1]
        .parse()
        .map_err(|_| malformed(format!("bad latency {:?}", fields[1])))?;
    if !latency_secs.is_finite() || latency_secs < 0.0 {
        return Err(malformed(format!("latency out of range: {latency_secs}")));
    }
    let count = if fields.len() == 8 {
        Some(
            fields[2]
                .parse::<u64>()
                .map_err(|_| malformed(format!("bad result count {:?}", fields[2])))?,
        )
    } else {
        None
    };
    Ok(Some(HistoryRow {
        strategy,
        latency_secs,
        count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_column_layout() {
        let h = History::from_reader("fc 0.25\nac 0.5\n\nfc\t0.75\n".as_bytes()).unwrap();
        assert_eq!(h.rows().len(), 3);
        assert_eq!(h.values(Strategy::FindCount, Metric::Latency), [0.25, 0.75]);
        assert_eq!(h.values(Strategy::AggregateCount, Metric::Latency), [0.5]);
        assert!(h.values(Strategy::FindCount, Metric::PerRecord).is_empty());
    }

    #[test]
    fn eight_column_layout() {
        let text = "# run 1\nac\t0.002000000\t4\t1700000000.0\t13\t100\t200\t5\n\
                    fc\t0.001000000\t0\t1700000000.1\t13\t100\t200\t5\n";
        let h = History::from_reader(text.as_bytes()).unwrap();
        assert_eq!(h.rows()[0].count, Some(4));
        assert_eq!(h.values(Strategy::AggregateCount, Metric::PerRecord), [0.0005]);
        // Zero matches have no per-record value.
        assert!(h.values(Strategy::FindCount, Metric::PerRecord).is_empty());
    }

    #[test]
    fn method_names_accepted_and_unknown_skipped() {
        let h = History::from_reader("find_count 0.1\nagg_count 0.2\nxx 0.3\n".as_bytes()).unwrap();
        assert_eq!(h.rows().len(), 2);
        assert_eq!(h.skipped(), 1);
    }

    #[test]
    fn malformed_rows_report_line() {
        let err = History::from_reader("fc 0.1\nfc abc\n".as_bytes()).unwrap_err();
        assert!(matches!(err, HistoryError::Malformed { line: 2, .. }));
        let err = History::from_reader("fc 0.1 3\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
        let err = History::from_reader("fc -0.1\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn compare_only_present_strategies() {
        let comparator = StatsComparator::new();
        let h = History::from_reader("fc 0.1\nfc 0.2\n".as_bytes()).unwrap();
        assert!(h.compare(&comparator, Metric::Latency).is_empty());

        let h = History::from_reader("fc 0.1\nac 0.2\n".as_bytes()).unwrap();
        let reports = h.compare(&comparator, Metric::Latency);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].first.strategy, Strategy::FindCount);
        assert!(reports[0].test.is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = History::from_path(Path::new("/nonexistent/run.tsv")).unwrap_err();
        assert!(matches!(err, HistoryError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/run.tsv"));
    }
}
