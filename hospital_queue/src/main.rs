//! Outpatient queue - staffing comparison
//!
//! Runs the morning session (or the experiment described by a TOML file) for
//! each configured number of doctors and prints per-patient tables and
//! wait-time summaries.
//!
//! Usage:
//!   cargo run --release -p hospital_queue
//!   cargo run --release -p hospital_queue -- hospital_queue/experiments/morning_session.toml

use std::env;
use std::path::Path;
use std::process::ExitCode;

use hospital_queue::{ExperimentConfig, ExperimentError, dataset, report, run_server_counts};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ExperimentError> {
    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => ExperimentConfig::load(Path::new(path))?,
        None => ExperimentConfig::morning_session(),
    };
    let experiment = &config.experiment;
    tracing::info!(
        name = %experiment.name,
        server_counts = ?experiment.server_counts,
        "starting experiment"
    );

    let records = match &experiment.dataset {
        Some(path) => dataset::load_csv(path)?,
        None => dataset::morning_session(),
    };

    let outcomes = run_server_counts(
        &records,
        &experiment.server_counts,
        experiment.arrival_mode,
        config.execution.threads,
    )?;

    let title = if experiment.description.is_empty() {
        experiment.name.as_str()
    } else {
        experiment.description.as_str()
    };
    for outcome in &outcomes {
        if config.output.print_tables {
            println!("\n{}", report::render_table(title, outcome));
        }
        println!("{}", report::render_summary(title, outcome));
    }
    println!("{}", report::render_comparison(&outcomes));

    if let Some(path) = &config.output.results_json {
        report::write_json(path, &experiment.name, &outcomes)?;
    }
    Ok(())
}
