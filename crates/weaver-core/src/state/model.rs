//! Task state domain model.
//!
//! The [`TaskState`] is the single record threaded through every step of a
//! run. Its history is append-only: [`TaskState::merge`] is the only mutation
//! path, and it concatenates messages rather than replacing them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Author label used for dispatcher-originated telemetry.
pub const SUPERVISOR: &str = "Supervisor";

/// Classification of a message, mirrored by the UI as a status colour.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    Info,
    Process,
    Success,
    Warning,
}

/// A single entry in the task history. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    author: String,
    content: String,
    kind: MessageKind,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(author: impl Into<String>, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_from(&self, author: &str) -> bool {
        self.author == author
    }
}

/// A partial update produced by one step.
///
/// Messages are appended, context keys and sender are last-write-wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub context: Map<String, Value>,
    pub sender: Option<String>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.context.is_empty() && self.sender.is_none()
    }
}

/// The shared record for one run: transcript, last sender, objective and
/// the open context map used for cross-worker data exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    history: Vec<Message>,
    sender: Option<String>,
    objective: String,
    context: Map<String, Value>,
}

impl TaskState {
    /// Creates a fresh state: objective set, history and context empty.
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            history: Vec::new(),
            sender: None,
            objective: objective.into(),
            context: Map::new(),
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    pub fn context_str(&self, key: &str) -> Option<&str> {
        self.context.get(key).and_then(Value::as_str)
    }

    /// Latest message written by `author`, with its position in history.
    pub fn last_from(&self, author: &str) -> Option<(usize, &Message)> {
        self.history
            .iter()
            .enumerate()
            .rev()
            .find(|(_, message)| message.is_from(author))
    }

    /// Applies a partial update. History is only ever extended.
    pub fn merge(&mut self, update: StateUpdate) {
        let StateUpdate {
            messages,
            context,
            sender,
        } = update;

        self.history.extend(messages);
        self.context.extend(context);
        if sender.is_some() {
            self.sender = sender;
        }
    }

    /// Consumes the state, returning the transcript and final context.
    pub fn into_parts(self) -> (Vec<Message>, Map<String, Value>) {
        (self.history, self.context)
    }
}
