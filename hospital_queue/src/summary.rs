use serde::{Deserialize, Serialize};

use crate::ResultRecord;

/// Aggregate wait-time statistics for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitSummary {
    pub count: usize,
    pub mean_wait: f64,
    pub max_wait: f64,
    pub min_wait: f64,
}

impl WaitSummary {
    /// Summarize the `wait_time` of each record. An empty slice gives zeros.
    pub fn from_results(results: &[ResultRecord]) -> Self {
        if results.is_empty() {
            return WaitSummary::default();
        }

        let waits = results.iter().map(|r| r.wait_time);
        let total: f64 = waits.clone().sum();
        WaitSummary {
            count: results.len(),
            mean_wait: total / results.len() as f64,
            max_wait: waits.clone().fold(f64::NEG_INFINITY, f64::max),
            min_wait: waits.fold(f64::INFINITY, f64::min),
        }
    }
}
