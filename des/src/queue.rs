//! Simulation clock and the time-ordered set of pending wake-ups.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::{ProcessId, SimError, SimTime};

/// A pending wake-up for one process.
///
/// Ordered by `due`, then by `sequence`, so that events sharing a time pop in
/// the order they were scheduled.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub due: SimTime,
    pub sequence: u64,
    pub process: ProcessId,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl Ord for Event {
    // Reversed so the max-heap yields the earliest event first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Clock plus min-queue of events.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: BinaryHeap<Event>,
    now: SimTime,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> EventQueue {
        EventQueue {
            queue: BinaryHeap::new(),
            now: 0.0,
            next_sequence: 0,
        }
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Schedule `process` to resume at `due`. Returns the tie-break sequence
    /// number assigned to the event.
    pub fn schedule(&mut self, due: SimTime, process: ProcessId) -> Result<u64, SimError> {
        if !due.is_finite() || due < self.now {
            return Err(SimError::InvalidTime {
                process,
                due,
                now: self.now,
            });
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push(Event {
            due,
            sequence,
            process,
        });
        tracing::trace!(due, sequence, %process, "scheduled");
        Ok(sequence)
    }

    /// Remove the earliest event and advance the clock to its due time.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.queue.pop()?;
        self.now = event.due;
        Some(event)
    }

    pub fn peek(&self) -> Option<&Event> {
        self.queue.peek()
    }

    /// Drop every pending event for `process`, returning how many were removed.
    pub fn cancel(&mut self, process: ProcessId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|event| event.process != process);
        before - self.queue.len()
    }
}
