//! Configuration models.

pub mod scheduler;

pub use scheduler::{SchedulerConfig, AUTO_WORKER_COUNT};
