//! Scheduler owning the worker pool and the three job backlogs.
//!
//! The three containers (submitted, in-flight, completed) are protected by
//! three independent `parking_lot` mutexes so that a worker claiming work does
//! not contend with another worker reporting completion, nor with a producer
//! retrieving results. Every queue mutation lives here; workers only call
//! `claim` and `complete`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::core::error::SchedulerError;
use crate::core::job::{Job, JobHandle, JobStatus, StatusCell};
use crate::core::worker::Worker;

/// A backlog entry: the job payload plus the status cell shared with the
/// producer's handle.
pub(crate) struct Slot<J> {
    pub(crate) id: u64,
    pub(crate) status: Arc<StatusCell>,
    /// Carried from the job at submission; not consulted when claiming.
    pub(crate) affinity_mask: u64,
    pub(crate) job: J,
}

/// Internal counters for scheduler statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct SchedulerCounters {
    pub(crate) queued_jobs: AtomicU64,
    pub(crate) in_flight_jobs: AtomicU64,
    pub(crate) completed_jobs: AtomicU64,
    pub(crate) submitted_total: AtomicU64,
    pub(crate) executed_total: AtomicU64,
    pub(crate) retrieved_total: AtomicU64,
}

impl SchedulerCounters {
    fn snapshot(&self, worker_count: usize) -> SchedulerStats {
        SchedulerStats {
            worker_count,
            queued_jobs: self.queued_jobs.load(Ordering::Relaxed),
            in_flight_jobs: self.in_flight_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            submitted_total: self.submitted_total.load(Ordering::Relaxed),
            executed_total: self.executed_total.load(Ordering::Relaxed),
            retrieved_total: self.retrieved_total.load(Ordering::Relaxed),
        }
    }
}

/// Statistics about scheduler utilization.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStats {
    /// Number of worker threads.
    pub worker_count: usize,
    /// Jobs waiting in the submitted backlog.
    pub queued_jobs: u64,
    /// Jobs currently claimed by workers.
    pub in_flight_jobs: u64,
    /// Jobs executed but not yet retrieved.
    pub completed_jobs: u64,
    /// Total jobs submitted.
    pub submitted_total: u64,
    /// Total jobs executed.
    pub executed_total: u64,
    /// Total jobs retrieved by producers.
    pub retrieved_total: u64,
}

/// State shared between the scheduler facade and its worker threads.
pub(crate) struct Shared<J> {
    submitted: Mutex<VecDeque<Slot<J>>>,
    /// Ids of claimed jobs. Bounded by worker count, so the linear removal
    /// scan in `complete` is cheap.
    in_flight: Mutex<Vec<u64>>,
    completed: Mutex<VecDeque<Slot<J>>>,
    pub(crate) shutdown: AtomicBool,
    pub(crate) counters: SchedulerCounters,
}

impl<J: Job> Shared<J> {
    fn new() -> Self {
        Self {
            submitted: Mutex::new(VecDeque::new()),
            in_flight: Mutex::new(Vec::new()),
            completed: Mutex::new(VecDeque::new()),
            shutdown: AtomicBool::new(false),
            counters: SchedulerCounters::default(),
        }
    }

    /// Claim the oldest submitted job for the calling worker.
    ///
    /// Holds the submitted lock to pop, releases it, then holds the in-flight
    /// lock to record the claim. Between the two there is a narrow window
    /// where the job is owned by the calling worker and present in neither
    /// container; nothing inspects container membership directly, only status,
    /// so the window is unobservable.
    pub(crate) fn claim(&self) -> Option<Slot<J>> {
        let slot = { self.submitted.lock().pop_front() }?;
        self.in_flight.lock().push(slot.id);
        slot.status.advance(JobStatus::Claimed);
        self.counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);
        self.counters.in_flight_jobs.fetch_add(1, Ordering::Relaxed);
        Some(slot)
    }

    /// Report a claimed job as executed, moving it to the completed backlog.
    ///
    /// The status advances to `Completed` before the slot becomes visible in
    /// the completed container, so a job seen there always reads `Completed`.
    pub(crate) fn complete(&self, slot: Slot<J>) {
        {
            let mut in_flight = self.in_flight.lock();
            if let Some(pos) = in_flight.iter().position(|id| *id == slot.id) {
                in_flight.swap_remove(pos);
            }
        }
        slot.status.advance(JobStatus::Completed);
        self.completed.lock().push_back(slot);
        self.counters.in_flight_jobs.fetch_sub(1, Ordering::Relaxed);
        self.counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
        self.counters.executed_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop every job still held in any backlog. Returns the number of
    /// submitted and completed-but-unretrieved jobs released.
    fn drain_remaining(&self) -> usize {
        let mut dropped = 0;
        {
            let mut submitted = self.submitted.lock();
            dropped += submitted.len();
            submitted.clear();
        }
        self.in_flight.lock().clear();
        {
            let mut completed = self.completed.lock();
            dropped += completed.len();
            completed.clear();
        }
        self.counters.queued_jobs.store(0, Ordering::Relaxed);
        self.counters.in_flight_jobs.store(0, Ordering::Relaxed);
        self.counters.completed_jobs.store(0, Ordering::Relaxed);
        dropped
    }
}

/// Scheduler owning the job backlogs and the pool of worker threads.
///
/// Constructed once per subsystem needing background execution and passed by
/// reference to anything that submits work; there is no global instance.
/// [`Scheduler::shutdown`] must be called before process exit so that
/// unexecuted or unretrieved jobs are released deterministically.
pub struct Scheduler<J: Job> {
    config: SchedulerConfig,
    shared: Arc<Shared<J>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    started: AtomicBool,
    job_seq: AtomicU64,
}

impl<J: Job> Scheduler<J> {
    /// Create a scheduler from configuration. No workers run until
    /// [`Scheduler::startup`].
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidConfig` if the configuration is
    /// invalid.
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(Self {
            config,
            shared: Arc::new(Shared::new()),
            workers: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            job_seq: AtomicU64::new(0),
        })
    }

    /// Spawn the worker pool.
    ///
    /// The configured worker count resolves through
    /// [`crate::config::SchedulerConfig::resolved_worker_count`]; the auto
    /// sentinel spawns one worker per hardware execution unit.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::AlreadyStarted` if called more than once.
    /// - `SchedulerError::ShutDown` if the scheduler was already shut down.
    /// - `SchedulerError::Spawn` if a worker thread cannot be created; any
    ///   workers spawned so far are stopped and joined before returning, so a
    ///   failed startup never leaves a partially sized pool running.
    pub fn startup(&self) -> Result<(), SchedulerError> {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(SchedulerError::AlreadyStarted);
        }

        let worker_count = self.config.resolved_worker_count();
        let idle_backoff = Duration::from_micros(self.config.idle_backoff_micros);

        let mut workers = self.workers.lock();
        workers.reserve(worker_count);
        for worker_id in 0..worker_count {
            match Worker::new(worker_id).spawn(Arc::clone(&self.shared), idle_backoff) {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    self.shared.shutdown.store(true, Ordering::Release);
                    for handle in workers.drain(..) {
                        let _ = handle.join();
                    }
                    return Err(SchedulerError::Spawn(e));
                }
            }
        }

        info!(
            worker_count,
            idle_backoff_micros = self.config.idle_backoff_micros,
            "scheduler started"
        );
        Ok(())
    }

    /// Append a job to the submitted backlog.
    ///
    /// Callable from any thread, including before [`Scheduler::startup`]; jobs
    /// submitted early wait in the backlog until workers exist. The backlog is
    /// unbounded, so submission always succeeds while the scheduler is alive.
    /// Ownership of the job transfers to the scheduler until retrieval.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::ShutDown` once shutdown has begun.
    pub fn submit(&self, job: J) -> Result<JobHandle, SchedulerError> {
        let id = self.job_seq.fetch_add(1, Ordering::Relaxed);
        let status = Arc::new(StatusCell::new());
        let slot = Slot {
            id,
            status: Arc::clone(&status),
            affinity_mask: job.affinity_mask(),
            job,
        };

        {
            let mut submitted = self.shared.submitted.lock();
            // Checked under the lock so a job can never slip into the backlog
            // after shutdown has drained it.
            if self.shared.shutdown.load(Ordering::Acquire) {
                return Err(SchedulerError::ShutDown);
            }
            slot.status.advance(JobStatus::Queued);
            submitted.push_back(slot);
        }

        self.shared.counters.submitted_total.fetch_add(1, Ordering::Relaxed);
        self.shared.counters.queued_jobs.fetch_add(1, Ordering::Relaxed);
        debug!(job_id = id, "job submitted");
        Ok(JobHandle::new(id, status))
    }

    /// Pop the oldest *completed* job, returning ownership to the caller.
    ///
    /// Retrieval order is completion order, not submission order; producers
    /// that need submission-order results track correlation externally. An
    /// empty completed backlog is the expected steady-state result of polling
    /// and returns `Ok(None)` immediately.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::NotStarted` if called before [`Scheduler::startup`].
    /// - `SchedulerError::ShutDown` once shutdown has begun.
    pub fn retrieve(&self) -> Result<Option<J>, SchedulerError> {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(SchedulerError::ShutDown);
        }
        if !self.started.load(Ordering::Acquire) {
            return Err(SchedulerError::NotStarted);
        }

        let Some(slot) = self.shared.completed.lock().pop_front() else {
            return Ok(None);
        };

        slot.status.advance(JobStatus::Retrieved);
        self.shared.counters.completed_jobs.fetch_sub(1, Ordering::Relaxed);
        self.shared.counters.retrieved_total.fetch_add(1, Ordering::Relaxed);
        debug!(job_id = slot.id, "job retrieved");
        Ok(Some(slot.job))
    }

    /// Get current scheduler statistics.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.shared.counters.snapshot(self.workers.lock().len())
    }

    /// Stop the worker pool and release every job still held.
    ///
    /// Sets the shutdown flag, joins every worker (a job mid-execute finishes
    /// naturally; shutdown never interrupts in-progress execution), then drops
    /// all jobs remaining in the submitted, in-flight, or completed backlogs.
    /// A producer that wants its results must retrieve them first. Idempotent:
    /// repeated calls return immediately.
    pub fn shutdown(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("shutting down scheduler");

        let mut workers = self.workers.lock();
        let worker_count = workers.len();
        for (worker_id, handle) in workers.drain(..).enumerate() {
            match handle.join() {
                Ok(()) => debug!(worker_id, "worker joined"),
                Err(_) => warn!(worker_id, "worker panicked"),
            }
        }

        let dropped_jobs = self.shared.drain_remaining();
        info!(worker_count, dropped_jobs, "scheduler shut down");
    }
}

impl<J: Job> Drop for Scheduler<J> {
    fn drop(&mut self) {
        // Signal shutdown but do not join here; workers notice the flag within
        // one backoff interval and exit on their own. Explicit shutdown() is
        // required for deterministic job release.
        if !self.shared.shutdown.swap(true, Ordering::AcqRel) {
            debug!("scheduler dropped without explicit shutdown; workers will detach");
        }
    }
}
