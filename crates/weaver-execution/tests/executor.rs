use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use weaver_core::dispatcher::RoutingError;
use weaver_core::{
    Engine, EngineConfig, EngineError, MessageKind, RoutingDecision, TaskState, TaskStatus,
    WeaverConfig, Worker, WorkerError, WorkerOutput, WorkerRole,
};
use weaver_execution::TaskExecutor;

/// Researcher stand-in that blocks until the test releases it.
struct GatedWorker {
    gate: Arc<Notify>,
}

#[async_trait]
impl Worker for GatedWorker {
    fn role(&self) -> WorkerRole {
        WorkerRole::Researcher
    }

    async fn produce(&self, _state: &TaskState) -> Result<WorkerOutput, WorkerError> {
        self.gate.notified().await;
        Ok(WorkerOutput::success("released"))
    }
}

fn default_executor() -> TaskExecutor {
    TaskExecutor::from_config(&WeaverConfig::default()).unwrap()
}

#[tokio::test]
async fn submitted_task_completes_with_report() {
    let handle = default_executor().submit_task("build a sorting function");
    assert_eq!(handle.status(), TaskStatus::Pending);
    let run_id = handle.run_id().to_string();

    let report = handle.wait().await.unwrap();

    assert_eq!(report.run_id, run_id);
    assert!(report.succeeded());
    assert_eq!(report.worker_steps(), 5);
    assert_eq!(report.context["artifact"], "sorting_function.py");
    assert!(report.error.is_none());
}

#[tokio::test]
async fn event_stream_brackets_the_run() {
    let mut handle = default_executor().submit_task("build a sorting function");

    let mut events = Vec::new();
    while let Some(event) = handle.next_event().await {
        events.push(event);
    }

    let first = events.first().unwrap();
    assert!(first.is_supervisor());
    assert_eq!(first.text, "Received task: build a sorting function");

    let last = events.last().unwrap();
    assert!(last.is_supervisor());
    assert_eq!(last.kind, MessageKind::Success);

    let worker_events: Vec<_> = events.iter().filter(|e| !e.is_supervisor()).collect();
    assert_eq!(worker_events.len(), 5);
    assert_eq!(worker_events[2].kind, MessageKind::Warning);
    assert_eq!(handle.status(), TaskStatus::Completed);
}

#[tokio::test]
async fn cancel_before_first_step() {
    let handle = default_executor().submit_task("build a sorting function");
    handle.cancel();
    assert!(handle.is_cancel_requested());

    let report = handle.wait().await.unwrap();

    assert_eq!(report.status, TaskStatus::Cancelled);
    assert_eq!(report.error, Some(EngineError::Cancelled { steps: 0 }));
    assert!(report.history.is_empty());
}

#[tokio::test]
async fn in_flight_step_completes_before_cancellation() {
    let gate = Arc::new(Notify::new());
    let always_research = |_: &TaskState| -> Result<RoutingDecision, RoutingError> {
        Ok(RoutingDecision::Route(WorkerRole::Researcher))
    };
    let engine = Engine::builder(always_research, EngineConfig::new(10).unwrap())
        .worker(GatedWorker {
            gate: Arc::clone(&gate),
        })
        .build();
    let mut handle = TaskExecutor::new(engine).submit_task("wait for me");

    // Wait until the worker has been routed to and is blocked on the gate.
    while let Some(event) = handle.next_event().await {
        if event.text == "Routing to Researcher." {
            break;
        }
    }
    assert_eq!(handle.status(), TaskStatus::Running);

    handle.cancel();
    gate.notify_one();
    let report = handle.wait().await.unwrap();

    assert_eq!(report.error, Some(EngineError::Cancelled { steps: 1 }));
    assert_eq!(report.history.len(), 1);
    assert_eq!(report.history[0].content(), "released");
}

#[tokio::test]
async fn concurrent_runs_are_isolated() {
    let executor = default_executor();
    let sorting = executor.submit_task("build a sorting function");
    let parser = executor.submit_task("write the parser");
    assert_ne!(sorting.run_id(), parser.run_id());

    let sorting = sorting.wait().await.unwrap();
    let parser = parser.wait().await.unwrap();

    assert_eq!(sorting.objective, "build a sorting function");
    assert_eq!(parser.objective, "write the parser");
    assert_eq!(sorting.context["artifact"], "sorting_function.py");
    assert_eq!(parser.context["artifact"], "parser.py");
}

#[tokio::test]
async fn execute_runs_inline() {
    let mut config = WeaverConfig::default();
    config.engine.max_steps = 2;
    let executor = TaskExecutor::from_config(&config).unwrap();

    let report = executor.execute("build a sorting function").await;

    assert_eq!(report.status, TaskStatus::Failed);
    assert_eq!(report.error, Some(EngineError::StepLimitExceeded { max_steps: 2 }));
    assert_eq!(report.worker_steps(), 2);
    assert!(report.steps.iter().any(|e| e.author == "Coder"));
}
