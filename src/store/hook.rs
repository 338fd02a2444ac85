use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;

/// A write that reached the store, as seen by a durable-storage collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    Put {
        collection: &'static str,
        id: String,
        version: u64,
        payload: Value,
    },
    Delete {
        collection: &'static str,
        id: String,
    },
}

impl StoreWrite {
    pub fn collection(&self) -> &'static str {
        match self {
            StoreWrite::Put { collection, .. } | StoreWrite::Delete { collection, .. } => collection,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            StoreWrite::Put { id, .. } | StoreWrite::Delete { id, .. } => id,
        }
    }
}

/// Failure reported by a [`WriteHook`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

/// Persistence boundary of the store.
///
/// Called for every successful put and delete while the written entry is
/// still locked, so a hook sees each key's writes in version order. A hook
/// must not call back into the store it is attached to. A failing hook is
/// logged; it never undoes or fails the in-memory write.
pub trait WriteHook: Send + Sync {
    fn on_write(&self, write: &StoreWrite) -> Result<(), HookError>;
}

/// Hook that keeps every write in memory, in arrival order.
#[derive(Default)]
pub struct MemoryWriteHook {
    writes: Mutex<Vec<StoreWrite>>,
}

impl MemoryWriteHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<StoreWrite> {
        self.writes
            .lock()
            .map(|writes| writes.clone())
            .unwrap_or_default()
    }
}

impl WriteHook for MemoryWriteHook {
    fn on_write(&self, write: &StoreWrite) -> Result<(), HookError> {
        let mut writes = self
            .writes
            .lock()
            .map_err(|_| HookError("write log poisoned".into()))?;
        writes.push(write.clone());
        Ok(())
    }
}
