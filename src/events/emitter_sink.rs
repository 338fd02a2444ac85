use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use super::{EventKind, EventSink, LendingEvent, SinkError};

/// Sink that re-emits events through an `EventEmitter` for in-process
/// listeners. Listeners receive the event as a JSON string under the name of
/// its [`EventKind`].
///
/// The emitter runs listeners on their own threads, so delivery is
/// asynchronous with respect to the lending operation.
pub struct EmitterSink {
    emitter: Mutex<EventEmitter>,
}

impl EmitterSink {
    pub fn new() -> Self {
        EmitterSink {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener for one kind of event.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> Result<(), SinkError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| SinkError("event emitter poisoned".into()))?;
        emitter.on(kind.as_str(), listener);
        Ok(())
    }
}

impl Default for EmitterSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EmitterSink {
    fn handle(&self, event: &LendingEvent) -> Result<(), SinkError> {
        let payload = serde_json::to_string(event).map_err(|e| SinkError(e.to_string()))?;
        let mut emitter = self
            .emitter
            .lock()
            .map_err(|_| SinkError("event emitter poisoned".into()))?;
        emitter.emit(event.kind.as_str(), payload);
        Ok(())
    }
}
