//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser, ValueEnum};

use rangebench_core::connection::ConnectionSettings;
use rangebench_core::constants::{
    DEFAULT_MARGIN, DEFAULT_MAX_RETRIES, DEFAULT_QUERIES_PER_ROUND, DEFAULT_QUERY_LENGTH,
    DEFAULT_RETRY_BACKOFF_MS, DEFAULT_SYNTHETIC_RECORDS,
};
use rangebench_core::error::BenchError;
use rangebench_core::executor::RetryPolicy;
use rangebench_core::options::{ExecutionMode, RunOptions};
use rangebench_core::sample::Metric;
use rangebench_core::strategy::Strategy;

/// Where interval records are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A MongoDB collection (needs the `mongo` feature).
    Mongo,
    /// An in-process dataset, synthetic or loaded with --records.
    Memory,
}

/// How strategies share queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    /// Same query for every strategy; counts are cross-checked.
    #[default]
    CrossCheck,
    /// Fresh query per strategy invocation; no cross-check.
    Independent,
}

impl From<ModeArg> for ExecutionMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::CrossCheck => Self::CrossCheck,
            ModeArg::Independent => Self::Independent,
        }
    }
}

/// Quantity the statistics are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MetricArg {
    /// Round-trip latency.
    #[default]
    Latency,
    /// Latency divided by the number of matching records.
    PerRecord,
}

impl From<MetricArg> for Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Latency => Self::Latency,
            MetricArg::PerRecord => Self::PerRecord,
        }
    }
}

/// rangebench: randomized comparison of range-count query strategies.
#[derive(Parser, Debug)]
#[command(name = "rangebench", version, about)]
#[command(group(ArgGroup::new("duration").args(["runs", "passes"])))]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Datastore URI or host[:port]; repeat for several hosts.
    #[arg(short = 'i', long = "uri", env = "RANGEBENCH_URI")]
    pub uri: Vec<String>,

    /// Database name.
    #[arg(short = 'd', long)]
    pub database: Option<String>,

    /// Collection name.
    #[arg(short = 'l', long)]
    pub collection: Option<String>,

    /// Username (authenticated against the admin database).
    #[arg(short = 'u', long, env = "RANGEBENCH_USER")]
    pub username: Option<String>,

    /// Password.
    #[arg(short = 'p', long, env = "RANGEBENCH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Margin around the query interval when matching records.
    #[arg(short = 'm', long, default_value_t = DEFAULT_MARGIN, allow_negative_numbers = true)]
    pub margin: i64,

    /// Query interval length.
    #[arg(short = 'q', long = "query-length", default_value_t = DEFAULT_QUERY_LENGTH, allow_negative_numbers = true)]
    pub query_length: i64,

    /// Bounded run: this many rounds, then a final report.
    #[arg(short = 'r', long)]
    pub runs: Option<u64>,

    /// Continuous run: rounds of this many passes, reported after each round.
    #[arg(long)]
    pub passes: Option<u64>,

    /// Passes per round for bounded runs.
    #[arg(long, default_value_t = DEFAULT_QUERIES_PER_ROUND)]
    pub queries_per_round: u64,

    /// Strategies to compare (fc = find().count(), ac = aggregate count).
    #[arg(long, default_value = "fc,ac")]
    pub strategies: String,

    /// Shared or independent queries.
    #[arg(long, value_enum, default_value_t)]
    pub mode: ModeArg,

    /// Quantity compared.
    #[arg(long, value_enum, default_value_t)]
    pub metric: MetricArg,

    /// Seed the workload (and synthetic data) for a replayable run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Retries per query after a transient fault.
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Initial retry backoff in milliseconds (doubled per retry).
    #[arg(long, default_value_t = DEFAULT_RETRY_BACKOFF_MS)]
    pub retry_backoff_ms: u64,

    /// Retry transient faults forever, without backoff.
    #[arg(long, conflicts_with_all = ["max_retries", "retry_backoff_ms"])]
    pub unbounded_retries: bool,

    /// Keep the given strategy order instead of shuffling it once.
    #[arg(long)]
    pub no_shuffle: bool,

    /// Append one row per executed query to this file.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Write the final reports as JSON to this file.
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Datastore backend.
    #[arg(long, value_enum, default_value_t = Backend::Mongo)]
    pub backend: Backend,

    /// Load memory-backend records (tab-separated chr, start, end) from a file.
    #[arg(long, conflicts_with = "synthetic_records")]
    pub records: Option<PathBuf>,

    /// Synthetic memory-backend records per partition.
    #[arg(long, default_value_t = DEFAULT_SYNTHETIC_RECORDS)]
    pub synthetic_records: usize,

    /// Analyze a previously written run log instead of benchmarking.
    #[arg(long, conflicts_with = "duration")]
    pub analyze: Option<PathBuf>,

    /// Report every N rounds in bounded runs (0 = final report only).
    #[arg(long, default_value_t = 0)]
    pub report_every: u64,

    /// Verbose output (echo queries, info-level logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print verdicts.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }

    /// Run options for a benchmark.
    ///
    /// Exactly one of `--runs` or `--passes` must be given.
    pub fn run_options(&self) -> Result<RunOptions, BenchError> {
        let (rounds, queries_per_round) = match (self.runs, self.passes) {
            (Some(runs), None) => (Some(runs), self.queries_per_round),
            (None, Some(passes)) => {
                if passes == 0 {
                    return Err(BenchError::Config("--passes must be at least 1".into()));
                }
                (None, passes)
            }
            _ => {
                return Err(BenchError::Config(
                    "exactly one of --runs or --passes is required".into(),
                ))
            }
        };
        let options = RunOptions {
            rounds,
            queries_per_round,
            query_length: self.query_length,
            margin: self.margin,
            strategies: Strategy::parse_list(&self.strategies)?,
            mode: self.mode.into(),
            metric: self.metric.into(),
            report_every: self.report_every,
            shuffle: !self.no_shuffle,
        }
        .normalize();
        options.validate()?;
        Ok(options)
    }

    /// Retry policy from the retry flags.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.unbounded_retries {
            RetryPolicy::unbounded()
        } else {
            RetryPolicy::bounded(
                self.max_retries,
                Duration::from_millis(self.retry_backoff_ms),
            )
        }
    }

    /// Connection settings for the MongoDB backend.
    #[must_use]
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            hosts: self.uri.clone(),
            database: self.database.clone().unwrap_or_default(),
            collection: self.collection.clone().unwrap_or_default(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<AppConfig, clap::Error> {
        AppConfig::try_parse_from(std::iter::once("rangebench").chain(args.iter().copied()))
    }

    #[test]
    fn command_is_well_formed() {
        AppConfig::command().debug_assert();
    }

    #[test]
    fn bounded_run_options() {
        let c = parse(&["-r", "3", "--queries-per-round", "7", "-q", "500", "-m", "10"]).unwrap();
        let o = c.run_options().unwrap();
        assert_eq!(o.rounds, Some(3));
        assert_eq!(o.queries_per_round, 7);
        assert_eq!(o.query_length, 500);
        assert_eq!(o.margin, 10);
        assert_eq!(o.report_every, 0);
        assert!(o.shuffle);
    }

    #[test]
    fn continuous_run_options() {
        let c = parse(&["--passes", "25"]).unwrap();
        let o = c.run_options().unwrap();
        assert!(o.is_continuous());
        assert_eq!(o.queries_per_round, 25);
        assert_eq!(o.report_every, 1);
    }

    #[test]
    fn runs_and_passes_conflict() {
        assert!(parse(&["-r", "1", "--passes", "2"]).is_err());
    }

    #[test]
    fn one_of_runs_or_passes_required() {
        let c = parse(&[]).unwrap();
        assert!(matches!(c.run_options(), Err(BenchError::Config(_))));
        let c = parse(&["--passes", "0"]).unwrap();
        assert!(c.run_options().is_err());
    }

    #[test]
    fn unknown_strategy_rejected() {
        let c = parse(&["-r", "1", "--strategies", "fc,zz"]).unwrap();
        assert!(matches!(c.run_options(), Err(BenchError::UnknownStrategy(_))));
    }

    #[test]
    fn negative_length_rejected_by_options() {
        let c = parse(&["-r", "1", "-q", "-5"]).unwrap();
        assert!(matches!(c.run_options(), Err(BenchError::Config(_))));
    }

    #[test]
    fn retry_flags() {
        let c = parse(&["-r", "1"]).unwrap();
        assert_eq!(c.retry_policy(), RetryPolicy::default());
        let c = parse(&["-r", "1", "--unbounded-retries"]).unwrap();
        assert_eq!(c.retry_policy(), RetryPolicy::unbounded());
        assert!(parse(&["--unbounded-retries", "--max-retries", "3"]).is_err());
    }

    #[test]
    fn repeated_hosts_collected() {
        let c = parse(&["-i", "db1", "-i", "db2:27018", "-d", "eva", "-l", "variants"]).unwrap();
        let s = c.connection_settings();
        assert_eq!(s.hosts, ["db1", "db2:27018"]);
        assert_eq!(s.database, "eva");
        assert_eq!(s.collection, "variants");
    }

    #[test]
    fn multi_host_uri_kept_whole() {
        let uri = "mongodb://h1:27017,h2:27017/eva?replicaSet=rs0";
        let c = parse(&["-i", uri, "-d", "eva", "-l", "variants", "-u", "ana"]).unwrap();
        let s = c.connection_settings();
        assert_eq!(s.hosts, [uri]);
        assert_eq!(
            s.connection_string().unwrap(),
            "mongodb://ana@h1:27017,h2:27017/eva?replicaSet=rs0\
             &authSource=admin&readPreference=secondaryPreferred"
        );
    }

    #[test]
    fn mode_and_metric_values() {
        let c = parse(&["-r", "1", "--mode", "independent", "--metric", "per-record"]).unwrap();
        let o = c.run_options().unwrap();
        assert_eq!(o.mode, ExecutionMode::Independent);
        assert_eq!(o.metric, Metric::PerRecord);
    }

    #[test]
    fn analyze_excludes_runs() {
        assert!(parse(&["--analyze", "log.tsv"]).is_ok());
        assert!(parse(&["--analyze", "log.tsv", "-r", "2"]).is_err());
    }
}
