//! A patient's visit as a `des` process: arrive, queue for a doctor, be
//! seen, leave.

use des::{Context, Process, ResourceId, SimError, SimTime, Yield};

use crate::{PatientRecord, ResultRecord};

/// Result of one visit, tagged with the patient's position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Discharge {
    pub order: usize,
    pub record: ResultRecord,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    /// Resumed at clock start, still has to wait for the arrival time
    NotArrived,
    Arrived,
    Queued,
    InService { start: SimTime },
    Departed,
}

pub struct PatientProcess {
    order: usize,
    patient: PatientRecord,
    doctors: ResourceId,
    stage: Stage,
}

impl PatientProcess {
    /// Process started at clock start that waits out the arrival time itself.
    pub fn new(order: usize, patient: PatientRecord, doctors: ResourceId) -> Self {
        PatientProcess {
            order,
            patient,
            doctors,
            stage: Stage::NotArrived,
        }
    }

    /// Process whose first resumption is already scheduled at the arrival time.
    pub fn arriving(order: usize, patient: PatientRecord, doctors: ResourceId) -> Self {
        PatientProcess {
            stage: Stage::Arrived,
            ..PatientProcess::new(order, patient, doctors)
        }
    }
}

impl Process<Discharge> for PatientProcess {
    fn resume(&mut self, ctx: &mut Context<'_, Discharge>) -> Result<Yield, SimError> {
        let now = ctx.now();
        match self.stage {
            Stage::NotArrived => {
                self.stage = Stage::Arrived;
                Ok(Yield::SuspendFor(self.patient.arrival_time - now))
            }
            Stage::Arrived => {
                tracing::trace!(patient = %self.patient.id, now, "arrived");
                self.stage = Stage::Queued;
                Ok(Yield::Acquire(self.doctors))
            }
            Stage::Queued => {
                tracing::trace!(patient = %self.patient.id, now, "seen by doctor");
                self.stage = Stage::InService { start: now };
                Ok(Yield::SuspendFor(self.patient.service_duration))
            }
            Stage::InService { start } => {
                ctx.release(self.doctors)?;
                self.stage = Stage::Departed;
                ctx.record(Discharge {
                    order: self.order,
                    record: ResultRecord {
                        id: self.patient.id.clone(),
                        arrival_time: self.patient.arrival_time,
                        service_start_time: start,
                        wait_time: start - self.patient.arrival_time,
                        service_duration: self.patient.service_duration,
                        departure_time: ctx.now(),
                    },
                });
                Ok(Yield::Finished)
            }
            Stage::Departed => Ok(Yield::Finished),
        }
    }
}
