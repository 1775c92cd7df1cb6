use thiserror::Error;

use crate::{ProcessId, ResourceId, SimTime};

/// Errors raised by the simulation engine.
///
/// `InvalidTime`, `InvalidDuration` and `InvalidCapacity` are caller errors.
/// `ResourceInvariant` means the engine itself is broken and the run must stop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("cannot schedule {process} at t={due} (current time t={now})")]
    InvalidTime {
        process: ProcessId,
        due: SimTime,
        now: SimTime,
    },

    #[error("{process} requested an invalid wait of {duration} at t={now}")]
    InvalidDuration {
        process: ProcessId,
        duration: SimTime,
        now: SimTime,
    },

    #[error("resource capacity must be positive, got {capacity}")]
    InvalidCapacity { capacity: usize },

    #[error("resource invariant violated on {resource} by {process} at t={now}: {detail}")]
    ResourceInvariant {
        resource: ResourceId,
        process: ProcessId,
        now: SimTime,
        detail: String,
    },

    #[error("unknown {0}")]
    UnknownProcess(ProcessId),

    #[error("unknown {0}")]
    UnknownResource(ResourceId),
}

impl SimError {
    /// True for errors that indicate an engine defect rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::ResourceInvariant { .. })
    }
}
