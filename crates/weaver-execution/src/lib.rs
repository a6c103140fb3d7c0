//! Service-facing run execution.
//!
//! [`TaskExecutor::submit_task`] starts one engine run on the tokio runtime
//! and hands back a [`RunHandle`] for status, telemetry, cancellation and
//! the final [`RunReport`]. Runs share only the immutable engine.

pub mod telemetry;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;
use weaver_core::error::{Result, WeaverError};
use weaver_core::{Engine, RunReport, StepEvent, TaskStatus, WeaverConfig};

pub use telemetry::{ChannelObserver, LogFormat, init_tracing};

/// Responsible for executing runs against a shared engine.
#[derive(Clone)]
pub struct TaskExecutor {
    engine: Arc<Engine>,
}

impl TaskExecutor {
    /// Creates a new `TaskExecutor` around `engine`.
    pub fn new(engine: Engine) -> Self {
        Self::from_shared(Arc::new(engine))
    }

    pub fn from_shared(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Executor for the standard engine described by `config`.
    pub fn from_config(config: &WeaverConfig) -> Result<Self> {
        Ok(Self::new(Engine::from_config(config)?))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Starts a run with a fresh task state and returns its handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit_task(&self, objective: impl Into<String>) -> RunHandle {
        let objective = objective.into();
        let run_id = Uuid::new_v4().to_string();
        let cancel = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(TaskStatus::Pending);
        let (observer, events) = ChannelObserver::channel();

        let engine = Arc::clone(&self.engine);
        let token = cancel.clone();
        let id = run_id.clone();
        let span = tracing::info_span!("task", run_id = %run_id);

        let join = tokio::spawn(
            async move {
                let _ = status_tx.send(TaskStatus::Running);
                let outcome = engine.run_with(objective, &observer, &token).await;
                let report = RunReport::from_outcome(id, outcome, observer.into_events());
                let _ = status_tx.send(report.status);
                report
            }
            .instrument(span),
        );

        tracing::debug!(%run_id, "Task submitted");
        RunHandle {
            run_id,
            cancel,
            status: status_rx,
            events,
            join,
        }
    }

    /// Runs an objective on the current task and returns its report.
    pub async fn execute(&self, objective: impl Into<String>) -> RunReport {
        let run_id = Uuid::new_v4().to_string();
        let (observer, _events) = ChannelObserver::channel();
        let span = tracing::info_span!("task", run_id = %run_id);
        let outcome = self
            .engine
            .run_with(objective, &observer, &CancellationToken::new())
            .instrument(span)
            .await;
        RunReport::from_outcome(run_id, outcome, observer.into_events())
    }
}

/// Handle to one submitted run.
pub struct RunHandle {
    run_id: String,
    cancel: CancellationToken,
    status: watch::Receiver<TaskStatus>,
    events: mpsc::UnboundedReceiver<StepEvent>,
    join: JoinHandle<RunReport>,
}

impl RunHandle {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Latest known status of the run.
    pub fn status(&self) -> TaskStatus {
        *self.status.borrow()
    }

    /// Requests cancellation. Takes effect before the next dispatcher
    /// decision; a worker step already in flight completes first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Next step event, or `None` once the run has ended and the stream is
    /// drained.
    pub async fn next_event(&mut self) -> Option<StepEvent> {
        self.events.recv().await
    }

    /// Waits for the run to end and returns its report.
    pub async fn wait(self) -> Result<RunReport> {
        self.join
            .await
            .map_err(|err| WeaverError::internal(format!("run task failed: {err}")))
    }
}
