//! Dispatcher contract and routing decisions.
//!
//! A dispatcher looks at the accumulated [`TaskState`] and names the next
//! worker, or FINISH. Implementations must be pure over the state: the same
//! history and objective always produce the same decision.
//!
//! # Module Structure
//!
//! - `supervisor`: [`SupervisorDispatcher`], the rule-based default
//! - `scripted`: [`ScriptedDispatcher`], replays raw route labels

mod scripted;
mod supervisor;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::state::TaskState;
use crate::worker::WorkerRole;

pub use scripted::ScriptedDispatcher;
pub use supervisor::SupervisorDispatcher;

/// Label used for the terminating decision.
pub const FINISH: &str = "FINISH";

/// The dispatcher's output for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutingDecision {
    Route(WorkerRole),
    Finish,
}

impl RoutingDecision {
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish)
    }

    pub fn role(&self) -> Option<WorkerRole> {
        match self {
            Self::Route(role) => Some(*role),
            Self::Finish => None,
        }
    }
}

impl From<WorkerRole> for RoutingDecision {
    fn from(role: WorkerRole) -> Self {
        Self::Route(role)
    }
}

impl fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route(role) => write!(f, "{role}"),
            Self::Finish => f.write_str(FINISH),
        }
    }
}

impl FromStr for RoutingDecision {
    type Err = RoutingError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let label = label.trim();
        if label == FINISH {
            return Ok(Self::Finish);
        }
        label
            .parse::<WorkerRole>()
            .map(Self::Route)
            .map_err(|_| RoutingError::UnknownLabel(label.to_string()))
    }
}

/// Why a dispatcher could not produce a decision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("'{0}' is not one of Researcher, Coder, Reviewer or FINISH")]
    UnknownLabel(String),

    #[error("no route scripted for step {step}")]
    ScriptExhausted { step: usize },

    #[error("{0}")]
    Undecidable(String),
}

/// Chooses the next worker for a run.
pub trait Dispatcher: Send + Sync {
    fn decide(&self, state: &TaskState) -> Result<RoutingDecision, RoutingError>;
}

impl<F> Dispatcher for F
where
    F: Fn(&TaskState) -> Result<RoutingDecision, RoutingError> + Send + Sync,
{
    fn decide(&self, state: &TaskState) -> Result<RoutingDecision, RoutingError> {
        self(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_display() {
        for decision in [
            RoutingDecision::Route(WorkerRole::Researcher),
            RoutingDecision::Route(WorkerRole::Coder),
            RoutingDecision::Route(WorkerRole::Reviewer),
            RoutingDecision::Finish,
        ] {
            assert_eq!(decision.to_string().parse::<RoutingDecision>(), Ok(decision));
        }
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert_eq!(
            "Designer".parse::<RoutingDecision>(),
            Err(RoutingError::UnknownLabel("Designer".into()))
        );
        assert!("finish".parse::<RoutingDecision>().is_err());
    }

    #[test]
    fn test_closures_are_dispatchers() {
        let always_coder = |_: &TaskState| -> Result<RoutingDecision, RoutingError> {
            Ok(RoutingDecision::Route(WorkerRole::Coder))
        };
        let state = TaskState::new("objective");
        assert_eq!(
            always_coder.decide(&state),
            Ok(RoutingDecision::Route(WorkerRole::Coder))
        );
    }
}
