//! The scheduler: owns the clock, the processes and the resources, and
//! resumes processes in event order until nothing is left to do.

use crate::process::{Context, Process, ProcessId, ProcessState, Yield};
use crate::queue::EventQueue;
use crate::resource::{Grant, Resource, ResourceId};
use crate::{SimError, SimTime};

struct Entry<R> {
    label: String,
    state: ProcessState,
    process: Box<dyn Process<R>>,
}

/// A single, self-contained simulation run.
///
/// Nothing is shared between environments, so independent runs can execute on
/// separate threads.
pub struct Environment<R> {
    queue: EventQueue,
    processes: Vec<Entry<R>>,
    resources: Vec<Resource>,
    records: Vec<R>,
    events_processed: u64,
}

impl<R> Default for Environment<R> {
    fn default() -> Self {
        Environment::new()
    }
}

impl<R> Environment<R> {
    pub fn new() -> Environment<R> {
        Environment {
            queue: EventQueue::new(),
            processes: Vec::new(),
            resources: Vec::new(),
            records: Vec::new(),
            events_processed: 0,
        }
    }

    pub fn now(&self) -> SimTime {
        self.queue.now()
    }

    pub fn add_resource(&mut self, capacity: usize) -> Result<ResourceId, SimError> {
        let id = ResourceId(self.resources.len());
        self.resources.push(Resource::new(id, capacity)?);
        Ok(id)
    }

    /// Register a process whose first resumption happens at the current time.
    pub fn spawn<P>(&mut self, label: impl Into<String>, process: P) -> Result<ProcessId, SimError>
    where
        P: Process<R> + 'static,
    {
        let now = self.now();
        self.spawn_at(now, label, process)
    }

    /// Register a process whose first resumption happens at `at`.
    pub fn spawn_at<P>(
        &mut self,
        at: SimTime,
        label: impl Into<String>,
        process: P,
    ) -> Result<ProcessId, SimError>
    where
        P: Process<R> + 'static,
    {
        let id = ProcessId(self.processes.len());
        self.queue.schedule(at, id)?;
        self.processes.push(Entry {
            label: label.into(),
            state: ProcessState::Scheduled,
            process: Box::new(process),
        });
        Ok(id)
    }

    /// Pop and handle one event. Returns false once the queue is empty.
    pub fn step(&mut self) -> Result<bool, SimError> {
        let Some(event) = self.queue.pop_next() else {
            return Ok(false);
        };
        self.events_processed += 1;
        tracing::trace!(now = event.due, sequence = event.sequence, process = %event.process, "event");
        self.resume(event.process)?;
        Ok(true)
    }

    /// Run until no events remain. Stops at the first error.
    pub fn run_until_idle(&mut self) -> Result<(), SimError> {
        loop {
            match self.step() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    tracing::error!(now = self.now(), error = %err, "simulation aborted");
                    return Err(err);
                }
            }
        }

        let stuck = self.processes.iter().filter(|e| !e.state.is_terminal()).count();
        if stuck > 0 {
            tracing::warn!(stuck, now = self.now(), "idle with unfinished processes");
        }
        tracing::debug!(
            now = self.now(),
            events = self.events_processed,
            processes = self.processes.len(),
            "simulation idle"
        );
        Ok(())
    }

    /// Stop a process wherever it is: its pending wake-up and any queued
    /// request are dropped and held slots are released. Returns false when the
    /// process had already terminated.
    pub fn cancel(&mut self, id: ProcessId) -> Result<bool, SimError> {
        let entry = self
            .processes
            .get_mut(id.0)
            .ok_or(SimError::UnknownProcess(id))?;
        if entry.state.is_terminal() {
            return Ok(false);
        }
        entry.state = ProcessState::Cancelled;
        tracing::debug!(process = %id, label = %entry.label, now = self.queue.now(), "cancelled");

        self.queue.cancel(id);
        for resource in &mut self.resources {
            resource.withdraw(id);
        }
        release_held(&mut self.queue, &mut self.resources, id)?;
        Ok(true)
    }

    fn resume(&mut self, id: ProcessId) -> Result<(), SimError> {
        let entry = self
            .processes
            .get_mut(id.0)
            .ok_or(SimError::UnknownProcess(id))?;
        if entry.state.is_terminal() {
            return Ok(());
        }
        entry.state = ProcessState::Running;

        loop {
            let now = self.queue.now();
            let mut ctx = Context {
                process: id,
                queue: &mut self.queue,
                resources: &mut self.resources,
                records: &mut self.records,
            };

            match entry.process.resume(&mut ctx)? {
                Yield::SuspendFor(duration) => {
                    if !duration.is_finite() || duration < 0.0 {
                        return Err(SimError::InvalidDuration {
                            process: id,
                            duration,
                            now,
                        });
                    }
                    let due = now + duration;
                    self.queue.schedule(due, id)?;
                    entry.state = ProcessState::WaitingOnTimer(due);
                    return Ok(());
                }
                Yield::Acquire(rid) => {
                    let resource = self
                        .resources
                        .get_mut(rid.0)
                        .ok_or(SimError::UnknownResource(rid))?;
                    match resource.request(id, now)? {
                        Grant::Immediate => {
                            tracing::debug!(process = %id, label = %entry.label, resource = %rid, now, "granted");
                        }
                        Grant::Queued { position } => {
                            tracing::debug!(process = %id, label = %entry.label, resource = %rid, now, position, "queued");
                            entry.state = ProcessState::WaitingOnResource(rid);
                            return Ok(());
                        }
                    }
                }
                Yield::Finished => {
                    entry.state = ProcessState::Finished;
                    tracing::trace!(process = %id, label = %entry.label, now, "finished");
                    return release_held(&mut self.queue, &mut self.resources, id);
                }
            }
        }
    }

    pub fn state(&self, id: ProcessId) -> Option<ProcessState> {
        self.processes.get(id.0).map(|e| e.state)
    }

    pub fn label(&self, id: ProcessId) -> Option<&str> {
        self.processes.get(id.0).map(|e| e.label.as_str())
    }

    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id.0)
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

/// Release one slot and wake whoever it was handed to.
pub(crate) fn release_and_wake(
    queue: &mut EventQueue,
    resources: &mut [Resource],
    process: ProcessId,
    resource: ResourceId,
) -> Result<(), SimError> {
    let now = queue.now();
    let target = resources
        .get_mut(resource.0)
        .ok_or(SimError::UnknownResource(resource))?;
    if let Some(next) = target.release(process, now)? {
        tracing::debug!(process = %next, %resource, now, "granted from queue");
        queue.schedule(now, next)?;
    }
    Ok(())
}

/// Release every slot `process` still holds.
fn release_held(
    queue: &mut EventQueue,
    resources: &mut [Resource],
    process: ProcessId,
) -> Result<(), SimError> {
    for index in 0..resources.len() {
        while resources[index].holds(process) {
            tracing::warn!(%process, resource = %ResourceId(index), now = queue.now(), "releasing slot left held at exit");
            release_and_wake(queue, resources, process, ResourceId(index))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Wait(SimTime),
        Acquire(ResourceId),
        Release(ResourceId),
        Mark(&'static str),
    }

    /// Walks a fixed list of steps, recording `(label, step name, time)`.
    struct Script {
        label: &'static str,
        steps: VecDeque<Step>,
    }

    impl Script {
        fn new(label: &'static str, steps: &[Step]) -> Script {
            Script {
                label,
                steps: steps.iter().copied().collect(),
            }
        }
    }

    type Mark = (&'static str, &'static str, SimTime);

    impl Process<Mark> for Script {
        fn resume(&mut self, ctx: &mut Context<'_, Mark>) -> Result<Yield, SimError> {
            while let Some(step) = self.steps.pop_front() {
                match step {
                    Step::Wait(d) => return Ok(Yield::SuspendFor(d)),
                    Step::Acquire(r) => return Ok(Yield::Acquire(r)),
                    Step::Release(r) => ctx.release(r)?,
                    Step::Mark(name) => {
                        let now = ctx.now();
                        ctx.record((self.label, name, now));
                    }
                }
            }
            Ok(Yield::Finished)
        }
    }

    fn marks(env: &Environment<Mark>, name: &str) -> Vec<(&'static str, SimTime)> {
        env.records()
            .iter()
            .filter(|(_, n, _)| *n == name)
            .map(|(label, _, t)| (*label, *t))
            .collect()
    }

    #[test]
    fn timers_advance_the_clock() {
        let mut env = Environment::new();
        env.spawn("a", Script::new("a", &[Step::Wait(3.0), Step::Mark("woke"), Step::Wait(2.5), Step::Mark("woke")]))
            .unwrap();

        env.run_until_idle().unwrap();

        assert_eq!(marks(&env, "woke"), vec![("a", 3.0), ("a", 5.5)]);
        assert_eq!(env.now(), 5.5);
        assert_eq!(env.state(ProcessId(0)), Some(ProcessState::Finished));
    }

    #[test]
    fn empty_environment_is_idle_immediately() {
        let mut env: Environment<Mark> = Environment::new();
        env.run_until_idle().unwrap();
        assert_eq!(env.now(), 0.0);
        assert_eq!(env.events_processed(), 0);
    }

    #[test]
    fn immediate_grant_resumes_in_the_same_step() {
        let mut env = Environment::new();
        let doctor = env.add_resource(1).unwrap();
        env.spawn("a", Script::new("a", &[Step::Acquire(doctor), Step::Mark("start"), Step::Release(doctor)]))
            .unwrap();

        env.run_until_idle().unwrap();

        assert_eq!(marks(&env, "start"), vec![("a", 0.0)]);
        // Only the spawn event was needed
        assert_eq!(env.events_processed(), 1);
    }

    #[test]
    fn blocked_process_waits_for_release() {
        let mut env = Environment::new();
        let doctor = env.add_resource(1).unwrap();
        let service = |label| {
            Script::new(
                label,
                &[Step::Acquire(doctor), Step::Mark("start"), Step::Wait(10.0), Step::Release(doctor)],
            )
        };
        env.spawn("first", service("first")).unwrap();
        let second = env.spawn("second", service("second")).unwrap();

        env.step().unwrap();
        env.step().unwrap();
        assert_eq!(env.state(second), Some(ProcessState::WaitingOnResource(doctor)));

        env.run_until_idle().unwrap();
        assert_eq!(marks(&env, "start"), vec![("first", 0.0), ("second", 10.0)]);
    }

    #[test]
    fn simultaneous_requests_are_served_in_spawn_order() {
        let mut env = Environment::new();
        let doctor = env.add_resource(1).unwrap();
        let labels = ["p0", "p1", "p2", "p3"];
        for label in labels {
            env.spawn_at(
                4.0,
                label,
                Script::new(label, &[Step::Acquire(doctor), Step::Mark("start"), Step::Wait(1.0), Step::Release(doctor)]),
            )
            .unwrap();
        }

        env.run_until_idle().unwrap();

        let order: Vec<_> = marks(&env, "start").into_iter().map(|(l, _)| l).collect();
        assert_eq!(order, labels);
    }

    #[test]
    fn negative_wait_is_rejected() {
        let mut env = Environment::new();
        let id = env.spawn("a", Script::new("a", &[Step::Wait(-1.0)])).unwrap();

        let err = env.run_until_idle().unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidDuration {
                process: id,
                duration: -1.0,
                now: 0.0
            }
        );
    }

    #[test]
    fn spawning_in_the_past_is_rejected() {
        let mut env = Environment::new();
        env.spawn("a", Script::new("a", &[Step::Wait(5.0)])).unwrap();
        env.run_until_idle().unwrap();

        let err = env.spawn_at(1.0, "late", Script::new("late", &[])).unwrap_err();
        assert!(matches!(err, SimError::InvalidTime { due, now, .. } if due == 1.0 && now == 5.0));
        assert_eq!(env.process_count(), 1);
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let mut env = Environment::new();
        env.spawn("a", Script::new("a", &[Step::Acquire(ResourceId(3))])).unwrap();
        assert_eq!(
            env.run_until_idle().unwrap_err(),
            SimError::UnknownResource(ResourceId(3))
        );
    }

    #[test]
    fn releasing_unheld_resource_is_fatal() {
        let mut env = Environment::new();
        let doctor = env.add_resource(1).unwrap();
        env.spawn("a", Script::new("a", &[Step::Release(doctor)])).unwrap();

        let err = env.run_until_idle().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn held_slot_is_released_when_process_finishes() {
        let mut env = Environment::new();
        let doctor = env.add_resource(1).unwrap();
        // Forgets to release
        env.spawn("a", Script::new("a", &[Step::Acquire(doctor), Step::Wait(2.0)])).unwrap();
        env.spawn("b", Script::new("b", &[Step::Acquire(doctor), Step::Mark("start"), Step::Release(doctor)]))
            .unwrap();

        env.run_until_idle().unwrap();

        assert_eq!(marks(&env, "start"), vec![("b", 2.0)]);
        assert_eq!(env.resource(doctor).unwrap().in_use(), 0);
    }

    #[test]
    fn cancel_waiting_process_removes_its_request() {
        let mut env = Environment::new();
        let doctor = env.add_resource(1).unwrap();
        let service = |label| {
            Script::new(
                label,
                &[Step::Acquire(doctor), Step::Mark("start"), Step::Wait(5.0), Step::Release(doctor)],
            )
        };
        env.spawn("a", service("a")).unwrap();
        let b = env.spawn("b", service("b")).unwrap();
        env.spawn("c", service("c")).unwrap();
        for _ in 0..3 {
            env.step().unwrap();
        }
        assert_eq!(env.resource(doctor).unwrap().queue_len(), 2);

        assert!(env.cancel(b).unwrap());
        assert!(!env.cancel(b).unwrap());
        env.run_until_idle().unwrap();

        assert_eq!(marks(&env, "start"), vec![("a", 0.0), ("c", 5.0)]);
        assert_eq!(env.state(b), Some(ProcessState::Cancelled));
        assert_eq!(env.resource(doctor).unwrap().stats().total_withdrawn, 1);
    }

    #[test]
    fn cancel_holder_passes_slot_on() {
        let mut env = Environment::new();
        let doctor = env.add_resource(1).unwrap();
        let a = env
            .spawn("a", Script::new("a", &[Step::Acquire(doctor), Step::Wait(100.0), Step::Release(doctor)]))
            .unwrap();
        env.spawn_at(
            3.0,
            "b",
            Script::new("b", &[Step::Acquire(doctor), Step::Mark("start"), Step::Release(doctor)]),
        )
        .unwrap();
        env.step().unwrap();
        env.step().unwrap();

        env.cancel(a).unwrap();
        env.run_until_idle().unwrap();

        assert_eq!(marks(&env, "start"), vec![("b", 3.0)]);
        assert_eq!(env.now(), 3.0, "cancelled timer never fires");
    }

    #[test]
    fn cancel_unknown_process_is_an_error() {
        let mut env: Environment<Mark> = Environment::new();
        assert_eq!(
            env.cancel(ProcessId(7)).unwrap_err(),
            SimError::UnknownProcess(ProcessId(7))
        );
    }
}
