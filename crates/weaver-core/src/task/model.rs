//! Run report domain model.
//!
//! This module contains the status and result shapes handed to the service
//! layer once a run has ended.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::StepEvent;
use crate::error::{EngineError, RunFailure};
use crate::state::{Message, TaskState};

/// Represents the current status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The run has been submitted but not started.
    Pending,
    /// The run loop is executing.
    Running,
    /// The dispatcher reached FINISH.
    Completed,
    /// The run ended with an engine error.
    Failed,
    /// The run was cancelled between steps.
    Cancelled,
}

impl TaskStatus {
    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Everything the caller needs to present a finished run.
///
/// On failure `history` and `context` hold the partial state at the point
/// the run stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub objective: String,
    pub status: TaskStatus,
    /// Telemetry stream in emission order, supervisor events included.
    pub steps: Vec<StepEvent>,
    pub history: Vec<Message>,
    pub context: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<EngineError>,
}

impl RunReport {
    /// Builds a report from a run outcome and its collected telemetry.
    pub fn from_outcome(
        run_id: impl Into<String>,
        outcome: Result<TaskState, RunFailure>,
        steps: Vec<StepEvent>,
    ) -> Self {
        let (state, error) = match outcome {
            Ok(state) => (state, None),
            Err(failure) => {
                let (error, state) = failure.into_parts();
                (state, Some(error))
            }
        };

        let status = match &error {
            None => TaskStatus::Completed,
            Some(err) if err.is_cancelled() => TaskStatus::Cancelled,
            Some(_) => TaskStatus::Failed,
        };
        let objective = state.objective().to_string();
        let (history, context) = state.into_parts();

        Self {
            run_id: run_id.into(),
            objective,
            status,
            steps,
            history,
            context,
            error,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Number of worker messages in the final history.
    pub fn worker_steps(&self) -> usize {
        self.history.len()
    }
}
