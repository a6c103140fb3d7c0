//! Error types for Weaver.
//!
//! Two layers live here: [`EngineError`], the closed set of ways a single run
//! can end without FINISH, and [`WeaverError`], the ambient error for
//! configuration and I/O work around the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::TaskState;
use crate::worker::WorkerRole;

/// Reasons a run terminated without reaching FINISH.
///
/// Every failed run carries exactly one of these, together with the partial
/// [`TaskState`] accumulated so far (see [`RunFailure`]).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineError {
    /// A worker could not proceed given the current state.
    #[error("Worker input error: {worker} - {message}")]
    WorkerInput { worker: WorkerRole, message: String },

    /// The dispatcher could not produce a decision from its vocabulary.
    #[error("Invalid routing decision: {0}")]
    InvalidRouting(String),

    /// The dispatcher named a worker the engine has no registration for.
    #[error("Unknown worker: {0} is not registered with the engine")]
    UnknownWorker(WorkerRole),

    /// The run did not converge to FINISH within the step ceiling.
    #[error("Step limit exceeded: no FINISH within {max_steps} steps")]
    StepLimitExceeded { max_steps: usize },

    /// The run was cancelled between steps by the caller.
    #[error("Run cancelled after {steps} steps")]
    Cancelled { steps: usize },
}

impl EngineError {
    /// Creates a WorkerInput error
    pub fn worker_input(worker: WorkerRole, message: impl Into<String>) -> Self {
        Self::WorkerInput {
            worker,
            message: message.into(),
        }
    }

    /// Check if this is a StepLimitExceeded error
    pub fn is_step_limit(&self) -> bool {
        matches!(self, Self::StepLimitExceeded { .. })
    }

    /// Check if this is a Cancelled error
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true for configuration-consistency failures that retrying
    /// the same run cannot fix.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidRouting(_) | Self::UnknownWorker(_))
    }
}

/// A failed run: the terminating error plus the state accumulated before it.
#[derive(Error, Debug, Clone)]
#[error("{error}")]
pub struct RunFailure {
    pub error: EngineError,
    pub state: TaskState,
}

impl RunFailure {
    pub fn new(error: EngineError, state: TaskState) -> Self {
        Self { error, state }
    }

    /// Splits the failure back into its parts.
    pub fn into_parts(self) -> (EngineError, TaskState) {
        (self.error, self.state)
    }
}

/// Ambient error type for configuration, I/O and execution plumbing.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum WeaverError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A run ended in one of the engine's terminal errors
    #[error("Run failed: {0}")]
    Engine(#[from] EngineError),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WeaverError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<std::io::Error> for WeaverError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for WeaverError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for WeaverError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for WeaverError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<RunFailure> for WeaverError {
    fn from(failure: RunFailure) -> Self {
        Self::Engine(failure.error)
    }
}

/// A type alias for `Result<T, WeaverError>`.
pub type Result<T> = std::result::Result<T, WeaverError>;
