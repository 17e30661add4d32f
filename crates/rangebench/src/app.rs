//! Application entry point and dispatch.

use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use rangebench_cli::output::write_json;
use rangebench_cli::{ui, CliPresenter, History, LogSink, ProgressDisplay};
use rangebench_core::catalog::PartitionCatalog;
use rangebench_core::constants::SYNTHETIC_MAX_RECORD_LENGTH;
use rangebench_core::error::BenchError;
use rangebench_core::executor::QueryExecutor;
use rangebench_core::generator::WorkloadGenerator;
use rangebench_core::memory_store::MemoryStore;
use rangebench_core::store::RangeStore;
use rangebench_orchestration::{ExecutionScheduler, ObserverSet, ResultPresenter};
use rangebench_stats::StatsComparator;

use crate::config::{AppConfig, Backend};
use crate::report::{AnalysisReport, RunReport};

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        rangebench_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    if config.analyze.is_some() {
        return run_analysis(config);
    }

    run_benchmark(config)
}

fn run_benchmark(config: &AppConfig) -> Result<()> {
    let options = config.run_options()?;
    let catalog = Arc::new(PartitionCatalog::grch37());

    let generator = match config.seed {
        Some(seed) => WorkloadGenerator::seeded(Arc::clone(&catalog), seed),
        None => WorkloadGenerator::from_entropy(Arc::clone(&catalog)),
    };
    let store = open_store(config, &catalog)?;
    let datastore = store.describe();
    info!(%datastore, ?options, "starting benchmark");

    let executor = QueryExecutor::new(config.retry_policy());
    let mut scheduler = ExecutionScheduler::new(store, generator, executor, options)?;

    let mut observers = ObserverSet::new();
    if !config.quiet {
        observers.push(Box::new(ProgressDisplay::new(
            scheduler.options().total_passes(),
        )));
    }
    if let Some(path) = &config.output {
        let sink = LogSink::append(path)
            .map_err(|e| BenchError::Output(format!("{}: {e}", path.display())))?;
        observers.push(Box::new(sink));
    }
    observers.push(Box::new(CliPresenter::new(config.verbose, config.quiet)));

    let summary = scheduler.run(&mut observers)?;
    info!(
        rounds = summary.rounds,
        executions = summary.executions,
        retries = summary.retries,
        "benchmark finished"
    );

    if let Some(path) = &config.report_json {
        let report = RunReport::new(datastore, scheduler.options().clone(), summary);
        write_json(path, &report)
            .map_err(|e| BenchError::Output(format!("{}: {e}", path.display())))?;
    }
    Ok(())
}

fn open_store(config: &AppConfig, catalog: &PartitionCatalog) -> Result<Box<dyn RangeStore>> {
    match config.backend {
        Backend::Memory => {
            let store = match &config.records {
                Some(path) => MemoryStore::from_path(path)?,
                None => {
                    let mut rng = match config.seed {
                        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
                        None => StdRng::from_entropy(),
                    };
                    MemoryStore::synthetic(
                        catalog,
                        config.synthetic_records,
                        SYNTHETIC_MAX_RECORD_LENGTH,
                        &mut rng,
                    )
                }
            };
            Ok(Box::new(store))
        }
        Backend::Mongo => open_mongo(config),
    }
}

#[cfg(feature = "mongo")]
fn open_mongo(config: &AppConfig) -> Result<Box<dyn RangeStore>> {
    let store = rangebench_core::mongo_store::MongoStore::connect(config.connection_settings())?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "mongo"))]
fn open_mongo(_config: &AppConfig) -> Result<Box<dyn RangeStore>> {
    Err(BenchError::Config(
        "this build has no MongoDB support; rebuild with --features mongo or use --backend memory"
            .into(),
    )
    .into())
}

fn run_analysis(config: &AppConfig) -> Result<()> {
    let Some(path) = &config.analyze else {
        return Ok(());
    };
    let history = History::from_path(path)?;
    if history.skipped() > 0 {
        ui::print_warning(&format!(
            "{} rows with an unknown strategy skipped",
            history.skipped()
        ));
    }

    let reports = history.compare(&StatsComparator::new(), config.metric.into());
    if reports.is_empty() {
        ui::print_warning("fewer than two strategies in the log; nothing to compare");
    }
    let presenter = CliPresenter::new(config.verbose, config.quiet);
    for report in &reports {
        presenter.present_report(report);
    }

    if let Some(out) = &config.report_json {
        let report = AnalysisReport::new(
            path.display().to_string(),
            history.rows().len(),
            history.skipped(),
            reports,
        );
        write_json(out, &report)
            .map_err(|e| BenchError::Output(format!("{}: {e}", out.display())))?;
    }
    Ok(())
}
