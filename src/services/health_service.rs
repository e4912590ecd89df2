use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the state store and report whether scoreboard requests can be served.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = state.store();
    let backend = store.backend();

    match store.health_check().await {
        Ok(()) => HealthResponse::ok(backend),
        Err(err) => {
            warn!(error = %err, backend, "state store health check failed");
            HealthResponse::degraded(backend)
        }
    }
}
