//! Scheduler configuration.

use serde::{Deserialize, Serialize};

/// Sentinel worker count meaning "one worker per hardware execution unit".
pub const AUTO_WORKER_COUNT: usize = 0;

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of worker threads to spawn. [`AUTO_WORKER_COUNT`] resolves to
    /// the number of hardware execution units on the host.
    pub worker_count: usize,
    /// Fixed sleep between claim attempts while the backlog is empty, in
    /// microseconds. Must be non-zero.
    pub idle_backoff_micros: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerConfig {
    /// Create a configuration with the auto worker count and a one
    /// microsecond idle backoff.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            worker_count: AUTO_WORKER_COUNT,
            idle_backoff_micros: 1,
        }
    }

    /// Set the worker count. [`AUTO_WORKER_COUNT`] spawns one worker per
    /// hardware execution unit.
    #[must_use]
    pub const fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set the idle backoff in microseconds.
    #[must_use]
    pub const fn with_idle_backoff_micros(mut self, micros: u64) -> Self {
        self.idle_backoff_micros = micros;
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.idle_backoff_micros == 0 {
            return Err("idle_backoff_micros must be greater than 0".into());
        }
        Ok(())
    }

    /// Number of workers to actually spawn, resolving the auto sentinel.
    #[must_use]
    pub fn resolved_worker_count(&self) -> usize {
        if self.worker_count == AUTO_WORKER_COUNT {
            num_cpus::get()
        } else {
            self.worker_count
        }
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
