//! Tracing subscriber setup and the per-run step channel.

use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use weaver_core::error::{Result, WeaverError};
use weaver_core::{StepEvent, StepObserver};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Installs the global subscriber. Logs go to stderr; `RUST_LOG` overrides
/// `default_directive`.
pub fn init_tracing(format: LogFormat, default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    installed.map_err(|err| WeaverError::internal(format!("failed to install tracing subscriber: {err}")))
}

/// Observer that forwards every step event to an unbounded channel and keeps
/// a copy for the final report.
///
/// A dropped receiver is not an error; events are still recorded.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<StepEvent>,
    recorded: Mutex<Vec<StepEvent>>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::UnboundedSender<StepEvent>) -> Self {
        Self {
            sender,
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Creates an observer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StepEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Events recorded so far, in emission order.
    pub fn into_events(self) -> Vec<StepEvent> {
        self.recorded
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StepObserver for ChannelObserver {
    fn on_step(&self, event: &StepEvent) {
        match self.recorded.lock() {
            Ok(mut recorded) => recorded.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
        let _ = self.sender.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weaver_core::MessageKind;

    #[test]
    fn test_channel_observer_forwards_and_records() {
        let (observer, mut receiver) = ChannelObserver::channel();
        let event = StepEvent::supervisor(0, MessageKind::Info, "Received task: x");

        observer.on_step(&event);

        assert_eq!(receiver.try_recv().unwrap(), event);
        assert_eq!(observer.into_events(), vec![event]);
    }

    #[test]
    fn test_dropped_receiver_still_records() {
        let (observer, receiver) = ChannelObserver::channel();
        drop(receiver);

        observer.on_step(&StepEvent::supervisor(0, MessageKind::Info, "Received task: x"));

        assert_eq!(observer.into_events().len(), 1);
    }
}
