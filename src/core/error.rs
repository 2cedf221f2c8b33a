//! Error types for scheduler operations.
//!
//! The taxonomy is deliberately small. Empty-backlog conditions are not errors
//! at all: claiming with nothing submitted and retrieving with nothing
//! completed are expected steady-state results of polling and surface as
//! `Option::None`. What remains is caller misuse and the one fatal
//! startup-time condition, worker thread creation failure.

use thiserror::Error;

/// Errors produced by scheduler lifecycle and submission/retrieval calls.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Operation requires `startup` to have been called first.
    #[error("scheduler not started")]
    NotStarted,

    /// `startup` was called more than once.
    #[error("scheduler already started")]
    AlreadyStarted,

    /// The scheduler has been shut down.
    #[error("scheduler has been shut down")]
    ShutDown,

    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker thread could not be spawned. Fatal: a pool running with fewer
    /// workers than configured would silently under-parallelize.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
