//! Worker threads that drive job execution.

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::core::job::Job;
use crate::core::scheduler::Shared;

/// One thread of execution that repeatedly claims and runs jobs.
///
/// A worker performs no queue mutation itself; claiming and completing are
/// delegated to the scheduler's shared state so locking discipline lives in
/// one place.
pub(crate) struct Worker {
    id: usize,
    /// Bitmask intended to restrict which jobs this worker may claim. Carried
    /// in the data model but not consulted by the claim logic: any worker may
    /// claim any job.
    capability_mask: u64,
}

impl Worker {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            capability_mask: u64::MAX,
        }
    }

    /// Spawn the dedicated OS thread for this worker.
    pub(crate) fn spawn<J: Job>(
        self,
        shared: Arc<Shared<J>>,
        idle_backoff: Duration,
    ) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("jobpool-worker-{}", self.id))
            .spawn(move || self.run(&shared, idle_backoff))
    }

    /// Worker loop: runs until the scheduler's shutdown flag is observed.
    ///
    /// When the backlog is empty the worker sleeps for the configured backoff
    /// (microseconds by default) and retries. This is a low-latency
    /// spin/backoff rather than a blocking wait, trading some CPU usage for
    /// minimal pickup latency.
    fn run<J: Job>(self, shared: &Shared<J>, idle_backoff: Duration) {
        debug!(
            worker_id = self.id,
            capability_mask = self.capability_mask,
            "worker thread started"
        );

        loop {
            if shared.shutdown.load(Ordering::Acquire) {
                break;
            }
            match shared.claim() {
                Some(mut slot) => {
                    debug!(
                        worker_id = self.id,
                        job_id = slot.id,
                        affinity_mask = slot.affinity_mask,
                        "executing job"
                    );
                    slot.job.execute();
                    shared.complete(slot);
                }
                None => thread::sleep(idle_backoff),
            }
        }

        debug!(worker_id = self.id, "worker thread exiting");
    }
}
