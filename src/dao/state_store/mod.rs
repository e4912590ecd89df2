pub mod memory;
#[cfg(feature = "kv-store")]
pub mod rest_kv;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::dao::storage::StorageResult;

/// Abstraction over the key-value service holding the scoreboard document.
///
/// Single key, last writer wins; implementations do not coordinate concurrent writers.
pub trait StateStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
    fn get(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<Value>>>;
    fn set(&self, key: &str, value: Value) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
