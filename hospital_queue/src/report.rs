//! Plain-text tables and JSON export of scenario outcomes.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write as _};
use std::path::Path;

use serde::Serialize;

use crate::{ExperimentError, ScenarioOutcome};

const COLUMNS: [&str; 6] = [
    "Patient_ID",
    "Arrival_Time",
    "Service_Start_Time",
    "Wait_Time",
    "Service_Time",
    "Departure_Time",
];

/// Per-patient table for one scenario, times shown to two decimals.
pub fn render_table(title: &str, outcome: &ScenarioOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- {} Table ({} doctors) ---", title, outcome.server_count);

    let rows: Vec<[String; 6]> = outcome
        .results
        .iter()
        .map(|r| {
            [
                r.id.clone(),
                format!("{:.2}", r.arrival_time),
                format!("{:.2}", r.service_start_time),
                format!("{:.2}", r.wait_time),
                format!("{:.2}", r.service_duration),
                format!("{:.2}", r.departure_time),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let header: Vec<String> = COLUMNS
        .iter()
        .zip(widths)
        .map(|(name, width)| format!("{name:>width$}"))
        .collect();
    let _ = writeln!(out, "{}", header.join("  "));
    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:>width$}"))
            .collect();
        let _ = writeln!(out, "{}", cells.join("  "));
    }
    out
}

pub fn render_summary(title: &str, outcome: &ScenarioOutcome) -> String {
    let summary = &outcome.summary;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "--- {} Performance Summary ({} doctors) ---",
        title, outcome.server_count
    );
    let _ = writeln!(out, "Number of patients served: {}", summary.count);
    let _ = writeln!(out, "Average waiting time: {:.2} minutes", summary.mean_wait);
    let _ = writeln!(out, "Maximum waiting time: {:.2} minutes", summary.max_wait);
    let _ = writeln!(out, "Minimum waiting time: {:.2} minutes", summary.min_wait);
    out
}

/// One line per scenario, for comparing staffing levels side by side.
pub fn render_comparison(outcomes: &[ScenarioOutcome]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>7}  {:>8}  {:>9}  {:>8}  {:>8}", "doctors", "patients", "mean_wait", "max_wait", "min_wait");
    for outcome in outcomes {
        let s = &outcome.summary;
        let _ = writeln!(
            out,
            "{:>7}  {:>8}  {:>9.2}  {:>8.2}  {:>8.2}",
            outcome.server_count, s.count, s.mean_wait, s.max_wait, s.min_wait
        );
    }
    out
}

#[derive(Serialize)]
struct ResultsFile<'a> {
    experiment: &'a str,
    scenarios: &'a [ScenarioOutcome],
}

/// Write every outcome to `path` as pretty-printed JSON, creating parent
/// directories as needed.
pub fn write_json(
    path: &Path,
    experiment: &str,
    outcomes: &[ScenarioOutcome],
) -> Result<(), ExperimentError> {
    let io_err = |source| ExperimentError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(
        &mut writer,
        &ResultsFile {
            experiment,
            scenarios: outcomes,
        },
    )?;
    writer.flush().map_err(io_err)?;
    tracing::info!(path = %path.display(), scenarios = outcomes.len(), "wrote results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResultRecord;

    fn outcome() -> ScenarioOutcome {
        ScenarioOutcome::new(
            1,
            vec![
                ResultRecord {
                    id: "P1".to_string(),
                    arrival_time: 0.0,
                    service_start_time: 0.0,
                    wait_time: 0.0,
                    service_duration: 10.0,
                    departure_time: 10.0,
                },
                ResultRecord {
                    id: "P2".to_string(),
                    arrival_time: 2.0,
                    service_start_time: 10.0,
                    wait_time: 8.0,
                    service_duration: 9.0,
                    departure_time: 19.0,
                },
            ],
        )
    }

    #[test]
    fn table_has_header_and_one_row_per_patient() {
        let table = render_table("Morning Session", &outcome());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "--- Morning Session Table (1 doctors) ---");
        assert!(lines[1].contains("Service_Start_Time"));
        assert_eq!(lines.len(), 4);
        assert!(lines[3].trim_start().starts_with("P2"));
        assert!(lines[3].contains("8.00"));
        assert!(lines[3].contains("19.00"));
    }

    #[test]
    fn summary_reports_two_decimals() {
        let summary = render_summary("Morning Session", &outcome());
        assert!(summary.contains("Number of patients served: 2"));
        assert!(summary.contains("Average waiting time: 4.00 minutes"));
        assert!(summary.contains("Maximum waiting time: 8.00 minutes"));
        assert!(summary.contains("Minimum waiting time: 0.00 minutes"));
    }

    #[test]
    fn comparison_has_one_line_per_scenario() {
        let text = render_comparison(&[outcome(), outcome()]);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn json_round_trips_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        write_json(&path, "demo", &[outcome()]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["experiment"], "demo");
        let scenarios: Vec<ScenarioOutcome> =
            serde_json::from_value(value["scenarios"].clone()).unwrap();
        assert_eq!(scenarios, vec![outcome()]);
    }
}
