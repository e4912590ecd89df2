use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    dao::{
        models::MatchStateEntity,
        state_store::StateStore,
        storage::{StorageError, StorageResult},
    },
    state::match_state::{MatchRules, MatchState},
};

/// Data Access Object mapping the scoreboard singleton to and from its stored document.
#[derive(Clone)]
pub struct MatchRepository {
    store: Arc<dyn StateStore>,
    key: String,
    rules: MatchRules,
}

impl MatchRepository {
    /// Repository for the document stored under `key`.
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>, rules: MatchRules) -> Self {
        Self {
            store,
            key: key.into(),
            rules,
        }
    }

    /// Fetch the current match state.
    ///
    /// A missing key or a document that does not decode into a valid state yields a fresh match;
    /// only backend failures are reported.
    pub async fn load(&self) -> StorageResult<MatchState> {
        let Some(raw) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "no stored match state; starting fresh");
            return Ok(MatchState::new(&self.rules));
        };

        Ok(self.decode(raw))
    }

    /// Replace the stored document with `state`.
    pub async fn save(&self, state: &MatchState) -> StorageResult<()> {
        let value = serde_json::to_value(MatchStateEntity::from(state)).map_err(|source| {
            StorageError::Encode {
                key: self.key.clone(),
                source,
            }
        })?;

        self.store.set(&self.key, value).await
    }

    fn decode(&self, raw: Value) -> MatchState {
        let entity = match serde_json::from_value::<MatchStateEntity>(raw) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored match state is malformed; resetting");
                return MatchState::new(&self.rules);
            }
        };

        entity.into_state(&self.rules).unwrap_or_else(|err| {
            warn!(key = %self.key, error = %err, "stored match state is invalid; resetting");
            MatchState::new(&self.rules)
        })
    }
}
