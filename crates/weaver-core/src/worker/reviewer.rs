use async_trait::async_trait;
use serde_json::json;

use super::coder::INPUT_GUARD;
use super::{
    ARTIFACT_BODY_KEY, ARTIFACT_KEY, REVIEW_KEY, Worker, WorkerError, WorkerOutput, WorkerRole,
    require_str,
};
use crate::state::TaskState;

const INPUT_HANDLING_ISSUE: &str = "potential security vulnerability in input handling";
const MISSING_BODY_ISSUE: &str = "artifact body is missing from context";

/// Inspects the artifact named in context and approves or flags it.
#[derive(Debug, Clone, Default)]
pub struct Reviewer;

impl Reviewer {
    pub fn new() -> Self {
        Self
    }

    fn issues(body: Option<&str>) -> Vec<&'static str> {
        match body {
            None => vec![MISSING_BODY_ISSUE],
            Some(body) if !body.contains(INPUT_GUARD) => vec![INPUT_HANDLING_ISSUE],
            Some(_) => Vec::new(),
        }
    }
}

#[async_trait]
impl Worker for Reviewer {
    fn role(&self) -> WorkerRole {
        WorkerRole::Reviewer
    }

    async fn produce(&self, state: &TaskState) -> Result<WorkerOutput, WorkerError> {
        let artifact = require_str(state, ARTIFACT_KEY)?;
        let body = match state.context_value(ARTIFACT_BODY_KEY) {
            None => None,
            Some(_) => Some(require_str(state, ARTIFACT_BODY_KEY)?),
        };

        let issues = Self::issues(body);
        let approved = issues.is_empty();
        let output = if approved {
            WorkerOutput::success(format!("Code validation passed for {artifact}."))
        } else {
            WorkerOutput::warning(format!("Detected {} in {artifact}.", issues.join("; ")))
        };

        Ok(output.with_context(
            REVIEW_KEY,
            json!({
                "artifact": artifact,
                "approved": approved,
                "issues": issues,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MessageKind, StateUpdate};

    fn with_artifact(name: &str, body: Option<&str>) -> TaskState {
        let mut state = TaskState::new("build a sorting function");
        let mut update = StateUpdate::new().with_context(ARTIFACT_KEY, name);
        if let Some(body) = body {
            update = update.with_context(ARTIFACT_BODY_KEY, body);
        }
        state.merge(update);
        state
    }

    #[tokio::test]
    async fn test_unguarded_artifact_is_flagged() {
        let state = with_artifact("sort.py", Some("def sort(data):\n    return sorted(data)"));
        let output = Reviewer::new().produce(&state).await.unwrap();

        assert_eq!(output.kind, MessageKind::Warning);
        assert!(output.content.contains("sort.py"));
        assert_eq!(output.context[REVIEW_KEY]["approved"], false);
        assert_eq!(output.context[REVIEW_KEY]["issues"][0], INPUT_HANDLING_ISSUE);
    }

    #[tokio::test]
    async fn test_guarded_artifact_is_approved() {
        let body = format!("def sort(data):\n    {INPUT_GUARD}\n    return sorted(data)");
        let state = with_artifact("sort.py", Some(&body));
        let output = Reviewer::new().produce(&state).await.unwrap();

        assert_eq!(output.kind, MessageKind::Success);
        assert_eq!(output.content, "Code validation passed for sort.py.");
        assert_eq!(output.context[REVIEW_KEY]["artifact"], "sort.py");
        assert_eq!(output.context[REVIEW_KEY]["approved"], true);
    }

    #[tokio::test]
    async fn test_name_only_artifact_is_flagged_but_referenced() {
        let state = with_artifact("sort.py", None);
        let output = Reviewer::new().produce(&state).await.unwrap();

        assert_eq!(output.kind, MessageKind::Warning);
        assert!(output.content.contains("sort.py"));
        assert!(output.content.contains(MISSING_BODY_ISSUE));
    }

    #[tokio::test]
    async fn test_non_string_body_is_an_input_error() {
        let mut state = with_artifact("sort.py", None);
        state.merge(StateUpdate::new().with_context(ARTIFACT_BODY_KEY, 42));

        let err = Reviewer::new().produce(&state).await.unwrap_err();

        assert_eq!(
            err,
            WorkerError::InvalidContext {
                key: ARTIFACT_BODY_KEY,
                expected: "a string",
            }
        );
    }

    #[tokio::test]
    async fn test_missing_artifact_is_an_input_error() {
        let state = TaskState::new("build a sorting function");
        let err = Reviewer::new().produce(&state).await.unwrap_err();
        assert_eq!(err, WorkerError::MissingContext(ARTIFACT_KEY));
    }
}
