use strum::IntoEnumIterator;

use super::{Dispatcher, RoutingDecision, RoutingError};
use crate::state::{MessageKind, SUPERVISOR, TaskState};
use crate::worker::WorkerRole;

/// Deterministic supervisor that infers the next unmet sub-goal from the
/// transcript.
///
/// - Researcher: nothing has been researched yet.
/// - Coder: no artifact yet, or the latest review of the latest artifact
///   was not a success.
/// - Reviewer: the latest artifact has not been reviewed.
///
/// When several apply, the earliest role in [`WorkerRole`] order wins.
/// FINISH is chosen once none apply, which only happens after a successful
/// review of the latest artifact.
#[derive(Debug, Clone, Copy, Default)]
pub struct SupervisorDispatcher;

impl SupervisorDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Roles whose sub-goal is unmet, in precedence order.
    pub fn applicable(state: &TaskState) -> Vec<WorkerRole> {
        let researched = state.last_from("Researcher").is_some();
        let last_code = state.last_from("Coder").map(|(index, _)| index);
        let review_of_latest = last_code.and_then(|code_index| {
            state
                .last_from("Reviewer")
                .filter(|(review_index, _)| *review_index > code_index)
                .map(|(_, review)| review.kind())
        });

        WorkerRole::iter()
            .filter(|role| match role {
                WorkerRole::Researcher => !researched,
                WorkerRole::Coder => match (last_code, review_of_latest) {
                    (None, _) => true,
                    (Some(_), Some(kind)) => kind != MessageKind::Success,
                    (Some(_), None) => false,
                },
                WorkerRole::Reviewer => last_code.is_some() && review_of_latest.is_none(),
            })
            .collect()
    }

    /// Highest-precedence role among `candidates`, regardless of their order.
    pub fn prefer(candidates: &[WorkerRole]) -> Option<WorkerRole> {
        WorkerRole::iter().find(|role| candidates.contains(role))
    }
}

impl Dispatcher for SupervisorDispatcher {
    fn decide(&self, state: &TaskState) -> Result<RoutingDecision, RoutingError> {
        if let Some(stranger) = state.history().iter().find(|message| {
            message.author() != SUPERVISOR && message.author().parse::<WorkerRole>().is_err()
        }) {
            return Err(RoutingError::Undecidable(format!(
                "history contains a message from unrecognised author '{}'",
                stranger.author()
            )));
        }

        Ok(Self::prefer(&Self::applicable(state))
            .map_or(RoutingDecision::Finish, RoutingDecision::Route))
    }
}
