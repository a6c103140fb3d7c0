//! In-memory knowledge base with deterministic term-overlap ranking.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{KnowledgeLookup, LookupError, LookupResult, ResultKind};

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "into", "are", "was", "our", "you",
];

/// A stored fragment. Also the shape of `[[knowledge]]` entries in config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub text: String,
    pub kind: ResultKind,
}

impl KnowledgeEntry {
    pub fn new(id: impl Into<String>, kind: ResultKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
        }
    }
}

/// Knowledge base held entirely in memory.
///
/// Scores are the fraction of distinct query terms found in an entry, so the
/// same query over the same entries always yields the same ranking.
#[derive(Debug, Clone, Default)]
pub struct StaticKnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl StaticKnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// A small seed set covering architecture notes, memory, logs and code.
    pub fn with_defaults() -> Self {
        Self::new(vec![
            KnowledgeEntry::new(
                "doc-layered-architecture",
                ResultKind::Doc,
                "Layered architecture pattern: keep the domain core free of transport and storage concerns.",
            ),
            KnowledgeEntry::new(
                "doc-sorting",
                ResultKind::Doc,
                "Sorting function guidance: prefer a stable merge sort, accept any comparable sequence and document the ordering.",
            ),
            KnowledgeEntry::new(
                "doc-input-validation",
                ResultKind::Doc,
                "Input handling pattern: validate every external input at the function boundary before processing.",
            ),
            KnowledgeEntry::new(
                "doc-api-design",
                ResultKind::Doc,
                "API design pattern: version endpoints and return structured errors from every handler.",
            ),
            KnowledgeEntry::new(
                "memory-ui-preference",
                ResultKind::Memory,
                "Memory fragment: user prefers dark mode interfaces.",
            ),
            KnowledgeEntry::new(
                "log-deployment",
                ResultKind::Log,
                "System log: previous deployment to production succeeded.",
            ),
            KnowledgeEntry::new(
                "code-main-reference",
                ResultKind::Code,
                "Code reference: see main.py lines 45-60 for the function entry point implementation.",
            ),
        ])
    }

    pub fn insert(&mut self, entry: KnowledgeEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn rank(&self, query: &str, limit: usize) -> Vec<LookupResult> {
        let query_terms = terms(query);
        if query_terms.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<LookupResult> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let entry_terms = terms(&entry.text);
                let matched = query_terms.intersection(&entry_terms).count();
                if matched == 0 {
                    return None;
                }
                Some(LookupResult {
                    id: entry.id.clone(),
                    text: entry.text.clone(),
                    score: matched as f64 / query_terms.len() as f64,
                    kind: entry.kind,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(limit);
        hits
    }
}

#[async_trait]
impl KnowledgeLookup for StaticKnowledgeBase {
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<LookupResult>, LookupError> {
        if query.trim().is_empty() {
            return Err(LookupError::InvalidQuery("query is empty".into()));
        }
        Ok(self.rank(query, limit))
    }
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|word| word.len() >= 3 && !STOP_WORDS.contains(&word.as_str()))
        .collect()
}
