use std::sync::{Arc, RwLock};

use thiserror::Error;

use super::{EventKind, LendingEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// Receiver of lending events.
pub trait EventSink: Send + Sync {
    fn handle(&self, event: &LendingEvent) -> Result<(), SinkError>;

    /// Lower runs first.
    fn priority(&self) -> i32 {
        0
    }

    fn is_interested_in(&self, _kind: EventKind) -> bool {
        true
    }
}

/// Ordered fan-out of events to every registered sink.
#[derive(Default, Clone)]
pub struct EventPublisher {
    sinks: Arc<RwLock<Vec<Arc<dyn EventSink>>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink. Sinks of equal priority keep registration order.
    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        match self.sinks.write() {
            Ok(mut sinks) => {
                sinks.push(sink);
                sinks.sort_by_key(|sink| sink.priority());
            }
            Err(_) => tracing::error!("event sink list poisoned; sink not registered"),
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().map(|sinks| sinks.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut sinks) = self.sinks.write() {
            sinks.clear();
        }
    }

    /// Deliver `event` to each interested sink. Returns how many accepted it.
    pub fn publish(&self, event: &LendingEvent) -> usize {
        let sinks = match self.sinks.read() {
            Ok(sinks) => sinks.clone(),
            Err(_) => {
                tracing::error!(event = %event.kind, "event sink list poisoned; event dropped");
                return 0;
            }
        };

        let mut delivered = 0;
        for sink in sinks.iter().filter(|sink| sink.is_interested_in(event.kind)) {
            match sink.handle(event) {
                Ok(()) => delivered += 1,
                Err(err) => tracing::warn!(
                    event = %event.kind,
                    event_id = %event.id,
                    error = %err,
                    "event sink failed"
                ),
            }
        }
        delivered
    }
}
