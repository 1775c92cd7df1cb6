//! Patient datasets: the built-in morning session and CSV loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::{ExperimentError, PatientRecord};

/// Morning session at Matale General Hospital: (id, arrival, service), minutes.
const MORNING_SESSION: [(&str, f64, f64); 25] = [
    ("M001", 0.0, 10.0),
    ("M002", 2.0, 9.0),
    ("M003", 3.0, 11.0),
    ("M004", 5.0, 8.0),
    ("M005", 6.0, 12.0),
    ("M006", 8.0, 10.0),
    ("M007", 10.0, 9.0),
    ("M008", 12.0, 11.0),
    ("M009", 14.0, 10.0),
    ("M010", 16.0, 8.0),
    ("M011", 19.0, 12.0),
    ("M012", 22.0, 9.0),
    ("M013", 25.0, 11.0),
    ("M014", 28.0, 10.0),
    ("M015", 31.0, 12.0),
    ("M016", 35.0, 9.0),
    ("M017", 40.0, 11.0),
    ("M018", 45.0, 10.0),
    ("M019", 50.0, 12.0),
    ("M020", 56.0, 9.0),
    ("M021", 62.0, 11.0),
    ("M022", 69.0, 10.0),
    ("M023", 76.0, 12.0),
    ("M024", 84.0, 9.0),
    ("M025", 92.0, 11.0),
];

pub fn morning_session() -> Vec<PatientRecord> {
    MORNING_SESSION
        .iter()
        .map(|&(id, arrival, service)| PatientRecord::new(id, arrival, service))
        .collect()
}

/// Load and validate patient records from a CSV file with the header
/// `id,arrival_time,service_duration` (or `Patient_ID,Arrival,Service`).
pub fn load_csv(path: &Path) -> Result<Vec<PatientRecord>, ExperimentError> {
    let file = File::open(path).map_err(|source| ExperimentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_csv(file)?;
    tracing::info!(path = %path.display(), patients = records.len(), "loaded dataset");
    Ok(records)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<PatientRecord>, ExperimentError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        let record: PatientRecord = row?;
        record.validate()?;
        records.push(record);
    }
    Ok(records)
}
