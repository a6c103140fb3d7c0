//! Orchestration engine.
//!
//! The engine owns the run loop: ask the dispatcher, run the named worker,
//! merge its output, repeat until FINISH or a terminal error. It keeps no
//! state between runs; every call to [`Engine::run`] starts from a fresh
//! [`TaskState`], so one engine can drive many runs concurrently.

mod observer;

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::WeaverConfig;
use crate::dispatcher::{Dispatcher, RoutingDecision, SupervisorDispatcher};
use crate::error::{EngineError, Result, RunFailure, WeaverError};
use crate::state::{MessageKind, TaskState};
use crate::worker::{Coder, Researcher, Reviewer, Worker, WorkerRole};

pub use observer::{NoopObserver, StepEvent, StepObserver};

/// Run-level limits. The step ceiling is always explicit and finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    max_steps: usize,
}

impl EngineConfig {
    /// Ceiling used when a configuration file does not set one.
    pub const DEFAULT_MAX_STEPS: usize = 25;

    /// Creates a config with the given worker-step ceiling (must be ≥ 1).
    pub fn new(max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(WeaverError::config("max_steps must be at least 1"));
        }
        Ok(Self { max_steps })
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

/// Drives runs for one dispatcher and its registered workers.
#[derive(Clone)]
pub struct Engine {
    dispatcher: Arc<dyn Dispatcher>,
    workers: HashMap<WorkerRole, Arc<dyn Worker>>,
    config: EngineConfig,
}

/// Builder for [`Engine`]. Registering a second worker for a role replaces
/// the first.
pub struct EngineBuilder {
    dispatcher: Arc<dyn Dispatcher>,
    workers: HashMap<WorkerRole, Arc<dyn Worker>>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn worker(self, worker: impl Worker + 'static) -> Self {
        self.shared_worker(Arc::new(worker))
    }

    pub fn shared_worker(mut self, worker: Arc<dyn Worker>) -> Self {
        self.workers.insert(worker.role(), worker);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            dispatcher: self.dispatcher,
            workers: self.workers,
            config: self.config,
        }
    }
}

impl Engine {
    /// Starts building an engine. The step ceiling is a required argument.
    pub fn builder(dispatcher: impl Dispatcher + 'static, config: EngineConfig) -> EngineBuilder {
        EngineBuilder {
            dispatcher: Arc::new(dispatcher),
            workers: HashMap::new(),
            config,
        }
    }

    /// The standard engine: supervisor dispatcher plus the three built-in
    /// workers, with the Researcher backed by the configured knowledge base.
    pub fn from_config(config: &WeaverConfig) -> Result<Self> {
        let researcher = Researcher::new(Arc::new(config.knowledge_base()))
            .with_max_results(config.researcher.max_results);
        let coder = Coder::new().with_extension(config.coder.extension.clone());

        Ok(Self::builder(SupervisorDispatcher::new(), config.engine_config()?)
            .worker(researcher)
            .worker(coder)
            .worker(Reviewer::new())
            .build())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registered roles in precedence order.
    pub fn registered_roles(&self) -> Vec<WorkerRole> {
        let mut roles: Vec<_> = self.workers.keys().copied().collect();
        roles.sort();
        roles
    }

    /// Runs an objective to completion without telemetry or cancellation.
    pub async fn run(
        &self,
        objective: impl Into<String>,
    ) -> std::result::Result<TaskState, RunFailure> {
        self.run_with(objective, &NoopObserver, &CancellationToken::new())
            .await
    }

    /// Runs an objective, reporting each step to `observer` and checking
    /// `cancel` before every dispatcher decision.
    ///
    /// On failure the partial state accumulated so far is returned inside
    /// the [`RunFailure`].
    pub async fn run_with(
        &self,
        objective: impl Into<String>,
        observer: &dyn StepObserver,
        cancel: &CancellationToken,
    ) -> std::result::Result<TaskState, RunFailure> {
        let state = TaskState::new(objective);
        let span = tracing::info_span!("run", max_steps = self.config.max_steps);
        self.drive(state, observer, cancel).instrument(span).await
    }

    async fn drive(
        &self,
        mut state: TaskState,
        observer: &dyn StepObserver,
        cancel: &CancellationToken,
    ) -> std::result::Result<TaskState, RunFailure> {
        let max_steps = self.config.max_steps;
        tracing::info!(objective = %state.objective(), max_steps, "Run started");
        observer.on_step(&StepEvent::supervisor(
            0,
            MessageKind::Info,
            format!("Received task: {}", state.objective()),
        ));

        let mut steps = 0;
        loop {
            if cancel.is_cancelled() {
                tracing::warn!(steps, "Run cancelled");
                return Err(RunFailure::new(EngineError::Cancelled { steps }, state));
            }

            let decision = match self.dispatcher.decide(&state) {
                Ok(decision) => decision,
                Err(err) => {
                    tracing::warn!(steps, error = %err, "Dispatcher produced no valid decision");
                    return Err(RunFailure::new(
                        EngineError::InvalidRouting(err.to_string()),
                        state,
                    ));
                }
            };
            tracing::debug!(steps, %decision, "Routing decision");

            let role = match decision {
                RoutingDecision::Finish => {
                    tracing::info!(steps, "Run finished");
                    observer.on_step(&StepEvent::supervisor(
                        steps,
                        MessageKind::Success,
                        format!("Workflow completed after {steps} steps."),
                    ));
                    return Ok(state);
                }
                RoutingDecision::Route(role) => role,
            };

            if steps >= max_steps {
                tracing::warn!(steps, max_steps, "Step limit exceeded");
                return Err(RunFailure::new(
                    EngineError::StepLimitExceeded { max_steps },
                    state,
                ));
            }

            let Some(worker) = self.workers.get(&role) else {
                tracing::warn!(%role, "Dispatcher routed to an unregistered worker");
                return Err(RunFailure::new(EngineError::UnknownWorker(role), state));
            };

            observer.on_step(&StepEvent::supervisor(
                steps,
                MessageKind::Process,
                format!("Routing to {role}."),
            ));

            let output = match worker.produce(&state).await {
                Ok(output) => output,
                Err(err) => {
                    tracing::warn!(%role, error = %err, "Worker failed");
                    return Err(RunFailure::new(
                        EngineError::worker_input(role, err.to_string()),
                        state,
                    ));
                }
            };

            state.merge(output.into_update(role));
            steps += 1;

            if let Some(message) = state.history().last() {
                tracing::debug!(steps, %role, kind = %message.kind(), "Worker step merged");
                observer.on_step(&StepEvent::from_message(steps, message));
            }
        }
    }
}
