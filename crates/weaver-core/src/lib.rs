//! Weaver orchestration core.
//!
//! A dispatcher inspects the shared [`TaskState`] and names the next
//! [`Worker`]; the [`Engine`] runs it, merges its output and asks again,
//! until the dispatcher says FINISH or the run hits one of the
//! [`EngineError`] terminations.
//!
//! # Examples
//!
//! ```
//! use weaver_core::{Engine, WeaverConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = Engine::from_config(&WeaverConfig::default()).unwrap();
//! let state = engine.run("build a sorting function").await.unwrap();
//!
//! let authors: Vec<_> = state.history().iter().map(|m| m.author()).collect();
//! assert_eq!(authors, ["Researcher", "Coder", "Reviewer", "Coder", "Reviewer"]);
//! assert_eq!(state.context_str("artifact"), Some("sorting_function.py"));
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod state;
pub mod task;
pub mod worker;

pub use config::WeaverConfig;
pub use dispatcher::{Dispatcher, RoutingDecision, RoutingError, ScriptedDispatcher, SupervisorDispatcher};
pub use engine::{Engine, EngineBuilder, EngineConfig, NoopObserver, StepEvent, StepObserver};
pub use error::{EngineError, RunFailure, WeaverError};
pub use lookup::{KnowledgeLookup, LookupResult, StaticKnowledgeBase};
pub use state::{Message, MessageKind, StateUpdate, TaskState};
pub use task::{RunReport, TaskStatus};
pub use worker::{Coder, Researcher, Reviewer, Worker, WorkerError, WorkerOutput, WorkerRole};

/// Cancellation handle checked by [`Engine::run_with`] between steps.
pub use tokio_util::sync::CancellationToken;
