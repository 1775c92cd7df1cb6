//! Capacity-limited shared resource with a FIFO waiting list.

use std::collections::VecDeque;
use std::fmt;

use crate::{ProcessId, SimError, SimTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRequest {
    pub requester: ProcessId,
    pub enqueue_time: SimTime,
}

/// Outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Immediate,
    /// Zero-based position in the waiting list
    Queued { position: usize },
}

/// Observable state of a resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceStats {
    pub capacity: usize,
    pub current_in_use: usize,
    pub current_queue_length: usize,

    pub total_requests: usize,
    pub total_granted: usize,
    /// Requests that had to queue before being granted
    pub total_queued_grants: usize,
    pub total_withdrawn: usize,
    pub total_wait_time: SimTime,
    pub max_wait_time: SimTime,

    pub peak_in_use: usize,
    pub peak_queue_length: usize,
}

impl ResourceStats {
    pub fn is_at_capacity(&self) -> bool {
        self.current_in_use >= self.capacity
    }

    pub fn has_queue(&self) -> bool {
        self.current_queue_length > 0
    }

    /// Fraction of capacity currently in use
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.current_in_use as f64 / self.capacity as f64
    }

    /// Mean time spent queueing over all granted requests
    pub fn mean_wait_time(&self) -> SimTime {
        if self.total_granted == 0 {
            return 0.0;
        }
        self.total_wait_time / self.total_granted as f64
    }
}

#[derive(Debug, Clone)]
pub struct Resource {
    id: ResourceId,
    capacity: usize,
    holders: Vec<ProcessId>,
    waiting: VecDeque<PendingRequest>,
    stats: ResourceStats,
}

impl Resource {
    pub fn new(id: ResourceId, capacity: usize) -> Result<Resource, SimError> {
        if capacity == 0 {
            return Err(SimError::InvalidCapacity { capacity });
        }
        Ok(Resource {
            id,
            capacity,
            holders: Vec::with_capacity(capacity),
            waiting: VecDeque::new(),
            stats: ResourceStats {
                capacity,
                ..ResourceStats::default()
            },
        })
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn in_use(&self) -> usize {
        self.holders.len()
    }

    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn holds(&self, process: ProcessId) -> bool {
        self.holders.contains(&process)
    }

    pub fn is_waiting(&self, process: ProcessId) -> bool {
        self.waiting.iter().any(|p| p.requester == process)
    }

    pub fn waiting(&self) -> impl Iterator<Item = &PendingRequest> {
        self.waiting.iter()
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            current_in_use: self.holders.len(),
            current_queue_length: self.waiting.len(),
            ..self.stats.clone()
        }
    }

    /// Grant a slot now if one is free, otherwise join the back of the queue.
    pub fn request(&mut self, process: ProcessId, now: SimTime) -> Result<Grant, SimError> {
        self.stats.total_requests += 1;

        if self.holders.len() < self.capacity {
            // Free slots imply an empty queue, so nobody is overtaken
            self.holders.push(process);
            self.stats.total_granted += 1;
            self.stats.peak_in_use = self.stats.peak_in_use.max(self.holders.len());
            self.check_invariants(process, now)?;
            return Ok(Grant::Immediate);
        }

        self.waiting.push_back(PendingRequest {
            requester: process,
            enqueue_time: now,
        });
        self.stats.peak_queue_length = self.stats.peak_queue_length.max(self.waiting.len());
        self.check_invariants(process, now)?;
        Ok(Grant::Queued {
            position: self.waiting.len() - 1,
        })
    }

    /// Free the slot held by `process`. When someone is queued the slot passes
    /// straight to the head of the queue and that process is returned.
    pub fn release(
        &mut self,
        process: ProcessId,
        now: SimTime,
    ) -> Result<Option<ProcessId>, SimError> {
        let Some(index) = self.holders.iter().position(|&p| p == process) else {
            return Err(self.violation(process, now, "release by a process that holds no slot"));
        };
        self.holders.swap_remove(index);

        let granted = match self.waiting.pop_front() {
            Some(next) => {
                let waited = now - next.enqueue_time;
                self.holders.push(next.requester);
                self.stats.total_granted += 1;
                self.stats.total_queued_grants += 1;
                self.stats.total_wait_time += waited;
                self.stats.max_wait_time = self.stats.max_wait_time.max(waited);
                Some(next.requester)
            }
            None => None,
        };

        self.check_invariants(process, now)?;
        Ok(granted)
    }

    /// Remove a pending request without granting it. Returns false when the
    /// process was not waiting here.
    pub fn withdraw(&mut self, process: ProcessId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|p| p.requester != process);
        let removed = before != self.waiting.len();
        if removed {
            self.stats.total_withdrawn += 1;
        }
        removed
    }

    /// Capacity and FIFO checks. A failure here is an engine bug.
    pub fn check_invariants(&self, process: ProcessId, now: SimTime) -> Result<(), SimError> {
        if self.holders.len() > self.capacity {
            return Err(self.violation(
                process,
                now,
                &format!("{} holders exceed capacity {}", self.holders.len(), self.capacity),
            ));
        }
        if !self.waiting.is_empty() && self.holders.len() < self.capacity {
            return Err(self.violation(
                process,
                now,
                &format!(
                    "{} requests queued while only {} of {} slots are in use",
                    self.waiting.len(),
                    self.holders.len(),
                    self.capacity
                ),
            ));
        }
        let out_of_order = self
            .waiting
            .iter()
            .zip(self.waiting.iter().skip(1))
            .any(|(a, b)| a.enqueue_time > b.enqueue_time);
        if out_of_order {
            return Err(self.violation(process, now, "waiting list is not in arrival order"));
        }
        Ok(())
    }

    fn violation(&self, process: ProcessId, now: SimTime, detail: &str) -> SimError {
        tracing::error!(resource = %self.id, %process, now, detail, "resource invariant violated");
        SimError::ResourceInvariant {
            resource: self.id,
            process,
            now,
            detail: detail.to_string(),
        }
    }
}
