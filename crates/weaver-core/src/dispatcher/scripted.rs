use super::{Dispatcher, RoutingDecision, RoutingError};
use crate::state::TaskState;

/// Replays a fixed list of raw route labels, indexed by history length.
///
/// Labels are parsed on every decision, the way an external router's output
/// would be, so an unrecognised label or a script that runs out surfaces as a
/// routing error rather than a guess.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDispatcher {
    routes: Vec<String>,
}

impl ScriptedDispatcher {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Dispatcher for ScriptedDispatcher {
    fn decide(&self, state: &TaskState) -> Result<RoutingDecision, RoutingError> {
        let step = state.history().len();
        self.routes
            .get(step)
            .ok_or(RoutingError::ScriptExhausted { step })?
            .parse()
    }
}
