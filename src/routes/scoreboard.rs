use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::scoreboard::{ScoreboardQuery, ScoreboardResponse},
    error::AppError,
    services::scoreboard_service,
    state::SharedState,
};

/// The scoreboard endpoint, served under the path the remote and the display already use.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api", get(scoreboard))
        .route("/api/scoreboard", get(scoreboard))
}

#[utoipa::path(
    get,
    path = "/api",
    tag = "scoreboard",
    params(ScoreboardQuery),
    responses(
        (status = 200, description = "Scoreboard after applying the command", body = ScoreboardResponse),
        (status = 500, description = "Store failure; body holds a default board plus `error` and `details`")
    )
)]
/// Apply at most one command from the query string and return the resulting board.
pub async fn scoreboard(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let query = ScoreboardQuery::from_pairs(pairs);
    scoreboard_service::handle_request(&state, query)
        .await
        .map(Json)
        .map_err(|err| AppError::internal(err, scoreboard_service::default_snapshot(&state)))
}
