//! JSON run reports.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use sysinfo::System;

use rangebench_core::options::RunOptions;
use rangebench_orchestration::RunSummary;
use rangebench_stats::ComparisonReport;

use crate::version::full_version;

/// Machine the benchmark client ran on.
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub cpu_model: String,
    pub logical_cores: usize,
    pub total_memory_bytes: u64,
    pub os: String,
}

impl HostInfo {
    /// Probe the current host.
    #[must_use]
    pub fn collect() -> Self {
        let sys = System::new_all();
        let cpu_model = sys
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_default();
        let os = match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => format!("{name} {version}"),
            (Some(name), None) => name,
            _ => std::env::consts::OS.to_string(),
        };
        Self {
            cpu_model,
            logical_cores: sys.cpus().len(),
            total_memory_bytes: sys.total_memory(),
            os,
        }
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

/// Report for a completed bounded benchmark.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub tool: String,
    pub host: HostInfo,
    pub datastore: String,
    pub finished_at: f64,
    pub options: RunOptions,
    pub summary: RunSummary,
}

impl RunReport {
    #[must_use]
    pub fn new(datastore: String, options: RunOptions, summary: RunSummary) -> Self {
        Self {
            tool: full_version(),
            host: HostInfo::collect(),
            datastore,
            finished_at: unix_now(),
            options,
            summary,
        }
    }
}

/// Report for an offline analysis of a run log.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub tool: String,
    pub source: String,
    pub rows: usize,
    pub skipped: usize,
    pub reports: Vec<ComparisonReport>,
}

impl AnalysisReport {
    #[must_use]
    pub fn new(source: String, rows: usize, skipped: usize, reports: Vec<ComparisonReport>) -> Self {
        Self {
            tool: full_version(),
            source,
            rows,
            skipped,
            reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangebench_core::strategy::Strategy;

    #[test]
    fn host_info_probes() {
        let host = HostInfo::collect();
        assert!(host.logical_cores > 0 || host.cpu_model.is_empty());
        assert!(!host.os.is_empty());
    }

    #[test]
    fn run_report_serializes() {
        let options = RunOptions {
            rounds: Some(2),
            strategies: vec![Strategy::FindCount, Strategy::AggregateCount],
            ..RunOptions::default()
        };
        let summary = RunSummary {
            rounds: 2,
            passes: 2,
            executions: 4,
            retries: 0,
            reports: Vec::new(),
        };
        let report = RunReport::new("memory (10 records)".into(), options, summary);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["executions"], 4);
        assert_eq!(json["options"]["rounds"], 2);
        assert!(json["tool"].as_str().unwrap().starts_with("rangebench"));
        assert!(json["host"]["logical_cores"].is_u64());
    }

    #[test]
    fn analysis_report_serializes() {
        let report = AnalysisReport::new("run.tsv".into(), 3, 1, Vec::new());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"], 3);
        assert_eq!(json["skipped"], 1);
        assert!(json["reports"].as_array().unwrap().is_empty());
    }
}
