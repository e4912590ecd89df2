use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::dao::{state_store::StateStore, storage::StorageResult};

/// In-process store used when no remote key-value service is configured.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    entries: Arc<DashMap<String, Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a raw document under `key`, bypassing any validation.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Raw document currently stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }
}

impl StateStore for MemoryStateStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>> {
        let value = self.raw(key);
        Box::pin(async move { Ok(value) })
    }

    fn set(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>> {
        self.insert(key, value);
        Box::pin(async { Ok(()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
