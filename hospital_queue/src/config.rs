//! Experiment configuration, read from TOML.
//!
//! ```toml
//! [experiment]
//! name = "morning_session"
//! dataset = "../data/morning_session.csv"   # optional, built-in data if absent
//! server_counts = [3, 4, 5]
//! arrival_mode = "clock_start"              # or "at_arrival"
//!
//! [execution]
//! threads = 3
//!
//! [output]
//! print_tables = true
//! results_json = "../results/morning_session.json"
//! ```
//!
//! Relative paths are resolved against the directory of the TOML file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{ArrivalMode, ExperimentError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment: ExperimentMetadata,
    #[serde(default)]
    pub execution: ExecutionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dataset: Option<PathBuf>,
    pub server_counts: Vec<usize>,
    #[serde(default)]
    pub arrival_mode: ArrivalMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Worker threads for running scenarios; rayon's default pool when absent
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default = "default_print_tables")]
    pub print_tables: bool,
    pub results_json: Option<PathBuf>,
}

fn default_print_tables() -> bool {
    true
}

impl Default for OutputSettings {
    fn default() -> Self {
        OutputSettings {
            print_tables: default_print_tables(),
            results_json: None,
        }
    }
}

impl ExperimentConfig {
    /// The morning OPD session run at 3, 4 and 5 doctors on the built-in data.
    pub fn morning_session() -> Self {
        ExperimentConfig {
            experiment: ExperimentMetadata {
                name: "morning_session".to_string(),
                description: "Morning OPD session".to_string(),
                dataset: None,
                server_counts: vec![3, 4, 5],
                arrival_mode: ArrivalMode::ClockStart,
            },
            execution: ExecutionSettings::default(),
            output: OutputSettings::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ExperimentError> {
        let text = fs::read_to_string(path).map_err(|source| ExperimentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ExperimentError> {
        let config: ExperimentConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.experiment.name.trim().is_empty() {
            return Err(ExperimentError::Config("experiment name is empty".to_string()));
        }
        if self.experiment.server_counts.is_empty() {
            return Err(ExperimentError::Config(
                "server_counts must list at least one value".to_string(),
            ));
        }
        if self.experiment.server_counts.contains(&0) {
            return Err(ExperimentError::Config(
                "server_counts must all be positive".to_string(),
            ));
        }
        if self.execution.threads == Some(0) {
            return Err(ExperimentError::Config("threads must be positive".to_string()));
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(dataset) = self.experiment.dataset.as_mut() {
            resolve(dataset);
        }
        if let Some(json) = self.output.results_json.as_mut() {
            resolve(json);
        }
    }
}
