use std::sync::{Arc, Mutex};

use super::{EventSink, LendingEvent, SinkError};

/// Sink that writes each event to the `tracing` log, or to a shared buffer
/// when one is supplied.
#[derive(Default)]
pub struct LogSink {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl LogSink {
    pub fn new() -> Self {
        LogSink { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogSink {
            buffer: Some(buffer),
        }
    }
}

impl EventSink for LogSink {
    fn handle(&self, event: &LendingEvent) -> Result<(), SinkError> {
        match &self.buffer {
            Some(buffer) => {
                let mut buffer = buffer
                    .lock()
                    .map_err(|_| SinkError("log sink buffer poisoned".into()))?;
                buffer.push(event.to_string());
            }
            None => tracing::info!(
                event = %event.kind,
                event_id = %event.id,
                member_id = event.member_id.as_deref().unwrap_or("-"),
                isbn = event.isbn.as_deref().unwrap_or("-"),
                "{}",
                event.description
            ),
        }
        Ok(())
    }
}
