//! Knowledge lookup capability used by the Researcher.
//!
//! The core only depends on the [`KnowledgeLookup`] trait. Backing stores
//! (vector databases, search APIs) live outside the core and implement it.

mod static_kb;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

pub use static_kb::{KnowledgeEntry, StaticKnowledgeBase};

/// Category of a retrieved fragment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResultKind {
    Doc,
    Memory,
    Log,
    Code,
}

/// A single ranked lookup hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub id: String,
    pub text: String,
    pub score: f64,
    pub kind: ResultKind,
}

/// Failure of the backing store itself (as opposed to "no matches").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Knowledge source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// An abstract knowledge source.
///
/// Implementations return at most `limit` results ordered by descending
/// score. An empty vector means nothing matched; `Err` means the source
/// itself failed.
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(&self, query: &str, limit: usize) -> Result<Vec<LookupResult>, LookupError>;
}
