//! Redis-over-REST key-value backend (the `KV_REST_API_*` family of hosted stores).

mod config;
mod error;
mod models;
mod store;

use crate::dao::storage::StorageError;

pub use config::KvConfig;
pub use error::KvDaoError;
pub use store::RestKvStore;

impl From<KvDaoError> for StorageError {
    fn from(err: KvDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
