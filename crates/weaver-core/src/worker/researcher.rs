use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{RESEARCH_KEY, Worker, WorkerError, WorkerOutput, WorkerRole};
use crate::lookup::KnowledgeLookup;
use crate::state::TaskState;

/// Default number of references requested per lookup.
pub const DEFAULT_MAX_RESULTS: usize = 4;

/// Gathers context for the objective from an injected knowledge source.
#[derive(Clone)]
pub struct Researcher {
    lookup: Arc<dyn KnowledgeLookup>,
    max_results: usize,
}

impl Researcher {
    pub fn new(lookup: Arc<dyn KnowledgeLookup>) -> Self {
        Self {
            lookup,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

#[async_trait]
impl Worker for Researcher {
    fn role(&self) -> WorkerRole {
        WorkerRole::Researcher
    }

    async fn produce(&self, state: &TaskState) -> Result<WorkerOutput, WorkerError> {
        let objective = state.objective().trim();
        if objective.is_empty() {
            return Err(WorkerError::EmptyObjective);
        }

        let results = self.lookup.lookup(objective, self.max_results).await?;
        tracing::debug!(hits = results.len(), "Researcher lookup finished");

        let research: Vec<Value> = results
            .iter()
            .map(|hit| {
                json!({
                    "id": hit.id,
                    "text": hit.text,
                    "score": hit.score,
                    "kind": hit.kind.to_string(),
                })
            })
            .collect();

        let output = if results.is_empty() {
            WorkerOutput::warning(format!(
                "No relevant context found for '{objective}'."
            ))
        } else {
            let ids: Vec<&str> = results.iter().map(|hit| hit.id.as_str()).collect();
            WorkerOutput::success(format!(
                "Retrieved {} relevant references: {}.",
                results.len(),
                ids.join(", ")
            ))
        };

        Ok(output.with_context(RESEARCH_KEY, Value::Array(research)))
    }
}
