use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` when the state store answers, `degraded` otherwise.
    pub status: &'static str,
    /// State store backend in use.
    pub store: &'static str,
}

impl HealthResponse {
    /// The state store answered its health check.
    pub fn ok(store: &'static str) -> Self {
        Self { status: "ok", store }
    }

    /// The state store could not be reached; scoreboard requests will fail.
    pub fn degraded(store: &'static str) -> Self {
        Self {
            status: "degraded",
            store,
        }
    }
}
