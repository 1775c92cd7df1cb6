use serde::{Deserialize, Serialize};

use crate::ScenarioError;

/// One patient as supplied by the dataset: who, when they arrive, and how
/// long a doctor needs with them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(alias = "Patient_ID")]
    pub id: String,
    #[serde(alias = "Arrival")]
    pub arrival_time: f64,
    #[serde(alias = "Service")]
    pub service_duration: f64,
}

impl PatientRecord {
    pub fn new(id: impl Into<String>, arrival_time: f64, service_duration: f64) -> Self {
        PatientRecord {
            id: id.into(),
            arrival_time,
            service_duration,
        }
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        let reason = if self.id.trim().is_empty() {
            Some("patient id is empty".to_string())
        } else if !self.arrival_time.is_finite() || self.arrival_time < 0.0 {
            Some(format!(
                "arrival time must be a non-negative number, got {}",
                self.arrival_time
            ))
        } else if !self.service_duration.is_finite() || self.service_duration <= 0.0 {
            Some(format!(
                "service duration must be a positive number, got {}",
                self.service_duration
            ))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ScenarioError::InvalidRecord {
                id: self.id.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Outcome for one patient, produced once the patient departs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: String,
    pub arrival_time: f64,
    pub service_start_time: f64,
    pub wait_time: f64,
    pub service_duration: f64,
    pub departure_time: f64,
}
