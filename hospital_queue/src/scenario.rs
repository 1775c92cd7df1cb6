//! Scenario runner: one process per patient, one shared pool of doctors.

use des::parallel::{ParallelRunner, simple_progress_reporter};
use des::{Environment, SimError};
use serde::{Deserialize, Serialize};

use crate::process::{Discharge, PatientProcess};
use crate::{PatientRecord, ResultRecord, ScenarioError, WaitSummary};

/// When a patient's process first runs.
///
/// Both modes produce identical results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalMode {
    /// Every process starts at t=0 and waits until its own arrival time
    #[default]
    ClockStart,
    /// Each process is first resumed directly at its arrival time
    AtArrival,
}

/// Results of one scenario together with its wait-time summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub server_count: usize,
    pub results: Vec<ResultRecord>,
    pub summary: WaitSummary,
}

impl ScenarioOutcome {
    pub fn new(server_count: usize, results: Vec<ResultRecord>) -> Self {
        let summary = WaitSummary::from_results(&results);
        ScenarioOutcome {
            server_count,
            results,
            summary,
        }
    }
}

/// Run one scenario with `server_count` doctors. Results are ordered by
/// arrival time, ties kept in input order.
pub fn run_scenario(
    records: &[PatientRecord],
    server_count: usize,
) -> Result<Vec<ResultRecord>, ScenarioError> {
    run_scenario_with(records, server_count, ArrivalMode::default())
}

pub fn run_scenario_with(
    records: &[PatientRecord],
    server_count: usize,
    mode: ArrivalMode,
) -> Result<Vec<ResultRecord>, ScenarioError> {
    let mut env = build_environment(records, server_count, mode)?;
    env.run_until_idle()?;
    let results = collect_results(env.into_records());
    tracing::info!(server_count, patients = results.len(), "scenario complete");
    Ok(results)
}

/// Validate the inputs and set up an environment ready to run.
pub fn build_environment(
    records: &[PatientRecord],
    server_count: usize,
    mode: ArrivalMode,
) -> Result<Environment<Discharge>, ScenarioError> {
    validate_inputs(records, server_count)?;
    Ok(spawn_patients(records, server_count, mode)?)
}

/// Run each server count as its own scenario, in parallel. Outcomes are
/// returned in the order of `server_counts`.
pub fn run_server_counts(
    records: &[PatientRecord],
    server_counts: &[usize],
    mode: ArrivalMode,
    threads: Option<usize>,
) -> Result<Vec<ScenarioOutcome>, ScenarioError> {
    for &count in server_counts {
        validate_inputs(records, count)?;
    }

    let mut runner = ParallelRunner::new(server_counts.len(), |scenario_id| {
        spawn_patients(records, server_counts[scenario_id], mode)
    })
    .progress(simple_progress_reporter(1));
    if let Some(n) = threads {
        runner = runner.num_threads(n);
    }

    runner
        .run()
        .into_iter()
        .zip(server_counts)
        .map(|(result, &server_count)| -> Result<ScenarioOutcome, ScenarioError> {
            let outcome = ScenarioOutcome::new(server_count, collect_results(result?));
            tracing::info!(
                server_count,
                patients = outcome.summary.count,
                mean_wait = outcome.summary.mean_wait,
                max_wait = outcome.summary.max_wait,
                "scenario complete"
            );
            Ok(outcome)
        })
        .collect()
}

fn validate_inputs(records: &[PatientRecord], server_count: usize) -> Result<(), ScenarioError> {
    if server_count == 0 {
        return Err(ScenarioError::InvalidCapacity(server_count));
    }
    records.iter().try_for_each(PatientRecord::validate)
}

fn spawn_patients(
    records: &[PatientRecord],
    server_count: usize,
    mode: ArrivalMode,
) -> Result<Environment<Discharge>, SimError> {
    let mut env = Environment::new();
    let doctors = env.add_resource(server_count)?;
    for (order, patient) in records.iter().enumerate() {
        match mode {
            ArrivalMode::ClockStart => {
                env.spawn(
                    patient.id.clone(),
                    PatientProcess::new(order, patient.clone(), doctors),
                )?;
            }
            ArrivalMode::AtArrival => {
                env.spawn_at(
                    patient.arrival_time,
                    patient.id.clone(),
                    PatientProcess::arriving(order, patient.clone(), doctors),
                )?;
            }
        }
    }
    Ok(env)
}

fn collect_results(mut discharges: Vec<Discharge>) -> Vec<ResultRecord> {
    discharges.sort_by(|a, b| {
        a.record
            .arrival_time
            .total_cmp(&b.record.arrival_time)
            .then(a.order.cmp(&b.order))
    });
    discharges.into_iter().map(|d| d.record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_sorted_by_arrival_then_input_order() {
        let discharge = |order, id: &str, arrival| Discharge {
            order,
            record: ResultRecord {
                id: id.to_string(),
                arrival_time: arrival,
                service_start_time: arrival,
                wait_time: 0.0,
                service_duration: 1.0,
                departure_time: arrival + 1.0,
            },
        };
        let sorted = collect_results(vec![
            discharge(2, "c", 1.0),
            discharge(0, "a", 5.0),
            discharge(1, "b", 1.0),
        ]);
        let ids: Vec<_> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn zero_servers_rejected_before_running() {
        let records = vec![PatientRecord::new("P1", 0.0, 1.0)];
        assert_eq!(
            run_scenario(&records, 0),
            Err(ScenarioError::InvalidCapacity(0))
        );
    }
}
