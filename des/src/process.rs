//! Suspendable processes, driven one step at a time by the `Environment`.

use std::fmt;

use crate::environment::release_and_wake;
use crate::queue::EventQueue;
use crate::resource::{Resource, ResourceId};
use crate::{SimError, SimTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub usize);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process#{}", self.0)
    }
}

/// Lifecycle of a process as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessState {
    /// Spawned, first resumption pending
    Scheduled,
    Running,
    WaitingOnTimer(SimTime),
    WaitingOnResource(ResourceId),
    Finished,
    Cancelled,
}

impl ProcessState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessState::Finished | ProcessState::Cancelled)
    }
}

/// What a process asks for when it hands control back to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Yield {
    /// Resume after the given duration has elapsed
    SuspendFor(SimTime),
    /// Resume once a slot of the resource has been granted
    Acquire(ResourceId),
    Finished,
}

/// An entity whose lifecycle is a sequence of suspension points.
///
/// `resume` runs the process from its last suspension point up to the next
/// one. Processes keep their position as explicit state between calls.
pub trait Process<R> {
    fn resume(&mut self, ctx: &mut Context<'_, R>) -> Result<Yield, SimError>;
}

/// The slice of the environment a process may touch while it runs.
pub struct Context<'a, R> {
    pub(crate) process: ProcessId,
    pub(crate) queue: &'a mut EventQueue,
    pub(crate) resources: &'a mut [Resource],
    pub(crate) records: &'a mut Vec<R>,
}

impl<R> Context<'_, R> {
    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    /// Id of the process currently running.
    pub fn process(&self) -> ProcessId {
        self.process
    }

    /// Give back one slot of `resource`. The next queued requester, if any, is
    /// woken at the current time.
    pub fn release(&mut self, resource: ResourceId) -> Result<(), SimError> {
        release_and_wake(self.queue, self.resources, self.process, resource)
    }

    /// Append a result record to the environment's output.
    pub fn record(&mut self, record: R) {
        self.records.push(record);
    }
}
