//! Step telemetry emitted by the engine.

use serde::{Deserialize, Serialize};

use crate::state::{Message, MessageKind, SUPERVISOR};

/// An observable record of one completed step or supervisor action.
///
/// `step` counts completed worker steps at the time of emission, so
/// supervisor events carry the step number they precede or follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvent {
    pub step: usize,
    pub author: String,
    pub kind: MessageKind,
    pub text: String,
}

impl StepEvent {
    pub fn supervisor(step: usize, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            step,
            author: SUPERVISOR.to_string(),
            kind,
            text: text.into(),
        }
    }

    pub fn from_message(step: usize, message: &Message) -> Self {
        Self {
            step,
            author: message.author().to_string(),
            kind: message.kind(),
            text: message.content().to_string(),
        }
    }

    pub fn is_supervisor(&self) -> bool {
        self.author == SUPERVISOR
    }
}

/// Receives step events. A notification sink, never a control input.
pub trait StepObserver: Send + Sync {
    fn on_step(&self, event: &StepEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_step(&self, _event: &StepEvent) {}
}

impl<F> StepObserver for F
where
    F: Fn(&StepEvent) + Send + Sync,
{
    fn on_step(&self, event: &StepEvent) {
        self(event)
    }
}
