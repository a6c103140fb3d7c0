//! Worker contract and the built-in worker variants.
//!
//! A worker reads the current [`TaskState`] and returns a [`WorkerOutput`]:
//! exactly one message plus optional context entries. Workers never see or
//! influence routing; the engine decides what to do with their output.
//!
//! # Module Structure
//!
//! - `researcher`: [`Researcher`], backed by a [`KnowledgeLookup`](crate::lookup::KnowledgeLookup)
//! - `coder`: [`Coder`], writes the artifact into context
//! - `reviewer`: [`Reviewer`], approves or flags the latest artifact

pub(crate) mod coder;
pub(crate) mod researcher;
mod reviewer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::lookup::LookupError;
use crate::state::{Message, MessageKind, StateUpdate, TaskState};

pub use coder::Coder;
pub use researcher::Researcher;
pub use reviewer::Reviewer;

/// Context key holding the Researcher's ranked results.
pub const RESEARCH_KEY: &str = "research";
/// Context key holding the current artifact's file name.
pub const ARTIFACT_KEY: &str = "artifact";
/// Context key holding the current artifact's generated body.
pub const ARTIFACT_BODY_KEY: &str = "artifact_body";
/// Context key holding the artifact revision counter.
pub const REVISION_KEY: &str = "revision";
/// Context key holding the latest review verdict.
pub const REVIEW_KEY: &str = "review";

/// The closed set of worker roles.
///
/// Declaration order is the dispatcher's tie-break precedence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum WorkerRole {
    Researcher,
    Coder,
    Reviewer,
}

/// Why a worker could not produce output for the current state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkerError {
    #[error("objective is empty")]
    EmptyObjective,

    #[error("missing context key '{0}'")]
    MissingContext(&'static str),

    #[error("context key '{key}' is not {expected}")]
    InvalidContext {
        key: &'static str,
        expected: &'static str,
    },

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// What a worker hands back for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerOutput {
    pub kind: MessageKind,
    pub content: String,
    pub context: Map<String, Value>,
}

impl WorkerOutput {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            context: Map::new(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Warning, content)
    }

    pub fn process(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Process, content)
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Turns the output into a state update authored by `role`.
    pub fn into_update(self, role: WorkerRole) -> StateUpdate {
        let author = role.to_string();
        StateUpdate {
            messages: vec![Message::new(author.clone(), self.kind, self.content)],
            context: self.context,
            sender: Some(author),
        }
    }
}

/// A unit of work that contributes one message per invocation.
#[async_trait]
pub trait Worker: Send + Sync {
    /// The role this worker is registered under.
    fn role(&self) -> WorkerRole;

    /// Produces this step's contribution from a read-only view of the state.
    async fn produce(&self, state: &TaskState) -> Result<WorkerOutput, WorkerError>;
}

pub(crate) fn require_str<'a>(
    state: &'a TaskState,
    key: &'static str,
) -> Result<&'a str, WorkerError> {
    match state.context_value(key) {
        None => Err(WorkerError::MissingContext(key)),
        Some(value) => value.as_str().ok_or(WorkerError::InvalidContext {
            key,
            expected: "a string",
        }),
    }
}
