//! # jobpool
//!
//! A bounded pool of worker threads that pull jobs from a shared backlog,
//! execute them off the calling thread, and hand completed results back to the
//! producer for retrieval at its own pace.
//!
//! ## Model
//!
//! Three cooperating components:
//!
//! - **Job**: a caller-defined unit of work implementing the [`core::Job`]
//!   trait. The job has no knowledge of workers or the scheduler; its status is
//!   observable lock-free through a [`core::JobHandle`].
//! - **Worker**: one dedicated OS thread that repeatedly asks the scheduler for
//!   work, executes it, reports completion, and sleeps briefly when idle.
//! - **Scheduler**: owns the worker pool and three independently locked
//!   backlogs (submitted, in-flight, completed) and is the only component that
//!   mutates them.
//!
//! Jobs move through `Created → Queued → Claimed → Completed → Retrieved`,
//! never reverting. Claiming is FIFO over submission order; retrieval is FIFO
//! over *completion* order, which may differ when jobs vary in duration.
//!
//! ## Example
//!
//! ```
//! use jobpool::config::SchedulerConfig;
//! use jobpool::core::{Job, JobStatus, Scheduler};
//!
//! struct Sum {
//!     a: i32,
//!     b: i32,
//!     total: i32,
//! }
//!
//! impl Job for Sum {
//!     fn execute(&mut self) {
//!         self.total = self.a + self.b;
//!     }
//! }
//!
//! # fn main() -> Result<(), jobpool::core::SchedulerError> {
//! let scheduler = Scheduler::new(SchedulerConfig::new().with_worker_count(2))?;
//! scheduler.startup()?;
//!
//! let handle = scheduler.submit(Sum { a: 2, b: 3, total: 0 })?;
//! assert!(handle.status() >= JobStatus::Queued);
//!
//! // Results come back in completion order; poll at the producer's own pace.
//! let job = loop {
//!     if let Some(job) = scheduler.retrieve()? {
//!         break job;
//!     }
//! };
//! assert_eq!(job.total, 5);
//!
//! scheduler.shutdown();
//! # Ok(())
//! # }
//! ```
//!
//! ## What this crate does not do
//!
//! No work stealing, no priority ordering, no job dependency graphs, and no
//! cancellation of in-flight work. A submitted job is executed exactly once on
//! some worker; callers needing cooperative cancellation implement it inside
//! the job's own `execute` logic.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core job, worker, and scheduler components.
pub mod core;
/// Configuration models.
pub mod config;
/// Shared utilities.
pub mod util;
