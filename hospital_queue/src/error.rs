use std::path::PathBuf;

use des::SimError;
use des::parallel::ScenarioFailure;
use thiserror::Error;

/// Failures of a single scenario run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("invalid patient record {id:?}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("server count must be positive, got {0}")]
    InvalidCapacity(usize),

    #[error(transparent)]
    Engine(#[from] SimError),

    #[error(transparent)]
    Failed(#[from] ScenarioFailure),
}

/// Failures around a scenario: reading config and data, writing results.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid experiment file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not serialize results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid experiment config: {0}")]
    Config(String),

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
