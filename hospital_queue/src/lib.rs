//! Multi-doctor outpatient queue built on the `des` engine.
//!
//! Patients arrive at scheduled times, wait for one of `server_count`
//! identical doctors, are seen for a fixed duration and leave. The core
//! entry point is [`run_scenario`]; [`run_server_counts`] runs several
//! staffing levels side by side.
//!
//! Key pieces:
//! - PatientProcess: one patient's arrival → wait → service → departure
//! - Scenario runner: one process per record, one shared doctor pool
//! - WaitSummary: count / mean / max / min wait over a scenario

pub mod config;
pub mod dataset;
pub mod error;
pub mod patient;
pub mod process;
pub mod report;
pub mod scenario;
pub mod summary;

pub use config::ExperimentConfig;
pub use error::{ExperimentError, ScenarioError};
pub use patient::{PatientRecord, ResultRecord};
pub use process::{Discharge, PatientProcess};
pub use scenario::{
    ArrivalMode, ScenarioOutcome, build_environment, run_scenario, run_scenario_with,
    run_server_counts,
};
pub use summary::WaitSummary;
