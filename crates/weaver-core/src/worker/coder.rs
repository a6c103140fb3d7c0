use async_trait::async_trait;
use serde_json::Value;

use super::{
    ARTIFACT_BODY_KEY, ARTIFACT_KEY, RESEARCH_KEY, REVIEW_KEY, REVISION_KEY, Worker, WorkerError,
    WorkerOutput, WorkerRole,
};
use crate::state::TaskState;

/// Default artifact file extension.
pub const DEFAULT_EXTENSION: &str = "py";

/// Marker line the Reviewer looks for in a patched artifact.
pub(crate) const INPUT_GUARD: &str = "validate_input(data)";

const VERBS: &[&str] = &[
    "build", "write", "create", "implement", "make", "add", "generate", "develop", "design",
];
const FILLER: &[&str] = &["a", "an", "the", "for", "of", "to", "that", "which", "with", "and", "some"];

/// Turns the research and objective into a code artifact in context.
///
/// On a first pass it drafts the artifact. When the latest review was not
/// approved, it emits a revision with the input-validation patch applied.
#[derive(Debug, Clone)]
pub struct Coder {
    extension: String,
}

impl Coder {
    pub fn new() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// File name derived from the objective's significant words.
    pub fn artifact_name(&self, objective: &str) -> String {
        let words: Vec<String> = objective
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .filter(|word| {
                !word.is_empty()
                    && !VERBS.contains(&word.as_str())
                    && !FILLER.contains(&word.as_str())
            })
            .take(3)
            .collect();

        let stem = if words.is_empty() {
            "main".to_string()
        } else {
            words.join("_")
        };
        format!("{stem}.{}", self.extension)
    }
}

impl Default for Coder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for Coder {
    fn role(&self) -> WorkerRole {
        WorkerRole::Coder
    }

    async fn produce(&self, state: &TaskState) -> Result<WorkerOutput, WorkerError> {
        let research = state
            .context_value(RESEARCH_KEY)
            .ok_or(WorkerError::MissingContext(RESEARCH_KEY))?
            .as_array()
            .ok_or(WorkerError::InvalidContext {
                key: RESEARCH_KEY,
                expected: "an array",
            })?;

        let flagged = state
            .context_value(REVIEW_KEY)
            .and_then(|review| review.get("approved"))
            .and_then(Value::as_bool)
            .is_some_and(|approved| !approved);

        let revision = match state.context_value(REVISION_KEY) {
            None => 0,
            Some(value) => value
                .as_u64()
                .ok_or(WorkerError::InvalidContext {
                    key: REVISION_KEY,
                    expected: "a revision number",
                })?
                .checked_add(1)
                .ok_or(WorkerError::InvalidContext {
                    key: REVISION_KEY,
                    expected: "a revision number below u64::MAX",
                })?,
        };

        let name = match state.context_str(ARTIFACT_KEY) {
            Some(existing) => existing.to_string(),
            None => self.artifact_name(state.objective()),
        };

        let references: Vec<&str> = research
            .iter()
            .filter_map(|hit| hit.get("id").and_then(Value::as_str))
            .collect();
        let body = render_body(&name, state.objective(), &references, flagged);

        let content = if flagged {
            format!("Applied security patch to {name} (revision {revision}): added input validation.")
        } else {
            format!(
                "Generated {name} (revision {revision}) from {} references.",
                references.len()
            )
        };

        Ok(WorkerOutput::process(content)
            .with_context(ARTIFACT_KEY, name)
            .with_context(ARTIFACT_BODY_KEY, body)
            .with_context(REVISION_KEY, revision))
    }
}

fn render_body(name: &str, objective: &str, references: &[&str], guarded: bool) -> String {
    let function = name.split('.').next().unwrap_or("main");
    let mut lines = vec![
        format!("# {name}"),
        format!("# Objective: {objective}"),
    ];
    if !references.is_empty() {
        lines.push(format!("# References: {}", references.join(", ")));
    }
    lines.push(format!("def {function}(data):"));
    if guarded {
        lines.push(format!("    {INPUT_GUARD}"));
    }
    lines.push("    return sorted(data)".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MessageKind, StateUpdate};
    use serde_json::json;

    fn researched(objective: &str) -> TaskState {
        let mut state = TaskState::new(objective);
        state.merge(StateUpdate::new().with_context(RESEARCH_KEY, json!([{ "id": "doc-sorting" }])));
        state
    }

    #[test]
    fn test_artifact_name_from_objective() {
        let coder = Coder::new();
        assert_eq!(coder.artifact_name("build a sorting function"), "sorting_function.py");
        assert_eq!(coder.artifact_name("Build!"), "main.py");
        assert_eq!(
            Coder::new().with_extension(".rs").artifact_name("write the parser"),
            "parser.rs"
        );
    }

    #[tokio::test]
    async fn test_first_draft_writes_artifact() {
        let state = researched("build a sorting function");
        let output = Coder::new().produce(&state).await.unwrap();

        assert_eq!(output.kind, MessageKind::Process);
        assert!(output.content.contains("sorting_function.py"));
        assert_eq!(output.context[ARTIFACT_KEY], "sorting_function.py");
        assert_eq!(output.context[REVISION_KEY], 0);
        let body = output.context[ARTIFACT_BODY_KEY].as_str().unwrap();
        assert!(body.contains("def sorting_function(data):"));
        assert!(body.contains("doc-sorting"));
        assert!(!body.contains(INPUT_GUARD));
    }

    #[tokio::test]
    async fn test_flagged_review_produces_patched_revision() {
        let mut state = researched("build a sorting function");
        state.merge(
            StateUpdate::new()
                .with_context(ARTIFACT_KEY, "sorting_function.py")
                .with_context(REVISION_KEY, 0)
                .with_context(REVIEW_KEY, json!({ "approved": false, "issues": ["input"] })),
        );

        let output = Coder::new().produce(&state).await.unwrap();

        assert!(output.content.starts_with("Applied security patch"));
        assert_eq!(output.context[REVISION_KEY], 1);
        assert!(output.context[ARTIFACT_BODY_KEY].as_str().unwrap().contains(INPUT_GUARD));
    }

    #[tokio::test]
    async fn test_exhausted_revision_counter_is_an_input_error() {
        let mut state = researched("build a sorting function");
        state.merge(StateUpdate::new().with_context(REVISION_KEY, u64::MAX));

        let err = Coder::new().produce(&state).await.unwrap_err();

        assert_eq!(
            err,
            WorkerError::InvalidContext {
                key: REVISION_KEY,
                expected: "a revision number below u64::MAX",
            }
        );
    }

    #[tokio::test]
    async fn test_missing_research_is_an_input_error() {
        let state = TaskState::new("build a sorting function");
        let err = Coder::new().produce(&state).await.unwrap_err();
        assert_eq!(err, WorkerError::MissingContext(RESEARCH_KEY));
    }
}
