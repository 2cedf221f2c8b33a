//! Job abstraction and observable lifecycle status.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Status of a job in the scheduler lifecycle.
///
/// Transitions are monotonic: an observed sequence is always a subsequence of
/// `Created, Queued, Claimed, Completed, Retrieved` with no regressions, and a
/// producer may poll the status without taking any lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum JobStatus {
    /// Constructed, not yet submitted.
    Created = 0,
    /// In the submitted backlog, waiting for a worker.
    Queued = 1,
    /// Removed from the backlog by a worker; execution is imminent or running.
    Claimed = 2,
    /// Execution finished; waiting in the completed backlog.
    Completed = 3,
    /// Popped from the completed backlog by a producer.
    Retrieved = 4,
}

impl JobStatus {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Created,
            1 => Self::Queued,
            2 => Self::Claimed,
            3 => Self::Completed,
            _ => Self::Retrieved,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Queued => write!(f, "queued"),
            Self::Claimed => write!(f, "claimed"),
            Self::Completed => write!(f, "completed"),
            Self::Retrieved => write!(f, "retrieved"),
        }
    }
}

/// Lock-free status cell shared between the scheduler's backlog slot and the
/// producer's [`JobHandle`].
///
/// `advance` uses `fetch_max`, so a write can never move the observable status
/// backwards regardless of which thread applies it.
#[derive(Debug)]
pub(crate) struct StatusCell(AtomicU8);

impl StatusCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(JobStatus::Created as u8))
    }

    pub(crate) fn get(&self) -> JobStatus {
        JobStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn advance(&self, next: JobStatus) {
        self.0.fetch_max(next as u8, Ordering::AcqRel);
    }
}

/// One schedulable, opaque unit of work.
///
/// `execute` is invoked by exactly one worker, exactly once, and never
/// concurrently with any other invocation of the same job. Any failure inside
/// a job's execution is the job's own responsibility to record into its own
/// fields; the scheduler does not catch, retry, or report job-internal
/// failures. It only guarantees the call happens and that status transitions
/// afterward.
pub trait Job: Send + 'static {
    /// Run the unit of work. Called on a worker thread, off the submitting
    /// thread.
    fn execute(&mut self);

    /// Bitmask intended to restrict which workers may execute this job.
    ///
    /// Present in the data model but not consulted by the claim logic: any
    /// worker may claim any job regardless of mask value.
    fn affinity_mask(&self) -> u64 {
        u64::MAX
    }
}

impl Job for Box<dyn Job> {
    fn execute(&mut self) {
        self.as_mut().execute();
    }

    fn affinity_mask(&self) -> u64 {
        self.as_ref().affinity_mask()
    }
}

/// Producer-side view of a submitted job.
///
/// The handle shares the job's status cell, so [`JobHandle::status`] reflects
/// worker-side progress without any locking. Cloning is cheap; callers that
/// need richer correlation attach their own ids to the job payload.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: u64,
    status: Arc<StatusCell>,
}

impl JobHandle {
    pub(crate) fn new(id: u64, status: Arc<StatusCell>) -> Self {
        Self { id, status }
    }

    /// Scheduler-assigned job id, unique within this scheduler instance.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current lifecycle status, readable from any thread without locking.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status.get()
    }
}
