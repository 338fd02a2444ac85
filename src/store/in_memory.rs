//! InMemoryStore - sharded map store for a single entity type.

use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{Store, StoreError, StoreWrite, Versioned, WriteHook};
use crate::model::Model;

/// In-memory store backed by a `DashMap`.
///
/// Keys are spread over independently locked shards, so writers to different
/// keys do not serialize on one global lock. Clone-friendly via `Arc`.
///
/// The write hook is called while the written entry is still locked, so
/// writes to one key reach it in version order.
pub struct InMemoryStore<M: Model> {
    entries: Arc<DashMap<String, Versioned<M>>>,
    hook: Option<Arc<dyn WriteHook>>,
}

impl<M: Model> Clone for InMemoryStore<M> {
    fn clone(&self) -> Self {
        InMemoryStore {
            entries: Arc::clone(&self.entries),
            hook: self.hook.clone(),
        }
    }
}

impl<M: Model> Default for InMemoryStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> fmt::Debug for InMemoryStore<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("collection", &M::COLLECTION)
            .field("len", &self.entries.len())
            .field("hooked", &self.hook.is_some())
            .finish()
    }
}

impl<M: Model> InMemoryStore<M> {
    /// Create a new empty store.
    pub fn new() -> Self {
        InMemoryStore {
            entries: Arc::new(DashMap::new()),
            hook: None,
        }
    }

    /// Create a store that reports every write to `hook`.
    pub fn with_hook(hook: Arc<dyn WriteHook>) -> Self {
        InMemoryStore {
            entries: Arc::new(DashMap::new()),
            hook: Some(hook),
        }
    }

    fn notify(&self, write: StoreWrite) {
        let Some(hook) = &self.hook else {
            return;
        };
        if let Err(err) = hook.on_write(&write) {
            tracing::warn!(
                collection = write.collection(),
                id = %write.id(),
                error = %err,
                "write hook failed"
            );
        }
    }

    fn notify_put(&self, model: &M, version: u64) {
        if self.hook.is_none() {
            return;
        }
        match serde_json::to_value(model) {
            Ok(payload) => self.notify(StoreWrite::Put {
                collection: M::COLLECTION,
                id: model.id().to_string(),
                version,
                payload,
            }),
            Err(err) => tracing::warn!(
                collection = M::COLLECTION,
                id = %model.id(),
                error = %err,
                "could not encode entity for write hook"
            ),
        }
    }
}

impl<M: Model> Store<M> for InMemoryStore<M> {
    fn put(&self, model: &M) -> u64 {
        match self.entries.entry(model.id().to_string()) {
            Entry::Occupied(mut entry) => {
                let version = entry.get().version + 1;
                entry.insert(Versioned {
                    data: model.clone(),
                    version,
                });
                self.notify_put(model, version);
                version
            }
            Entry::Vacant(entry) => {
                let _entry = entry.insert(Versioned {
                    data: model.clone(),
                    version: 1,
                });
                self.notify_put(model, 1);
                1
            }
        }
    }

    fn put_if_version(&self, model: &M, expected_version: u64) -> Result<u64, StoreError> {
        let conflict = |actual: u64| StoreError::VersionConflict {
            collection: M::COLLECTION,
            id: model.id().to_string(),
            expected: expected_version,
            actual,
        };

        match self.entries.entry(model.id().to_string()) {
            Entry::Occupied(mut entry) => {
                let actual = entry.get().version;
                if actual != expected_version {
                    return Err(conflict(actual));
                }
                let version = actual + 1;
                entry.insert(Versioned {
                    data: model.clone(),
                    version,
                });
                self.notify_put(model, version);
                Ok(version)
            }
            Entry::Vacant(entry) => {
                if expected_version != 0 {
                    return Err(conflict(0));
                }
                let _entry = entry.insert(Versioned {
                    data: model.clone(),
                    version: 1,
                });
                self.notify_put(model, 1);
                Ok(1)
            }
        }
    }

    fn get_versioned(&self, id: &str) -> Option<Versioned<M>> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<M> {
        self.entries
            .iter()
            .map(|entry| entry.value().data.clone())
            .collect()
    }

    fn find(&self, predicate: &dyn Fn(&M) -> bool) -> Vec<M> {
        self.entries
            .iter()
            .filter(|entry| predicate(&entry.value().data))
            .map(|entry| entry.value().data.clone())
            .collect()
    }

    fn delete(&self, id: &str) -> bool {
        self.entries
            .remove_if(id, |_, _| {
                self.notify(StoreWrite::Delete {
                    collection: M::COLLECTION,
                    id: id.to_string(),
                });
                true
            })
            .is_some()
    }

    fn exists(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}
