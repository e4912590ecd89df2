use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/scoreboard",
    tag = "sse",
    responses((status = 200, description = "Scoreboard snapshots pushed after every request", content_type = "text/event-stream", body = String))
)]
/// Stream scoreboard snapshots to connected displays.
pub async fn scoreboard_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    info!(
        subscribers = state.scoreboard_sse().subscriber_count(),
        "new scoreboard SSE connection"
    );
    sse_service::to_sse_stream(receiver)
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/scoreboard", get(scoreboard_stream))
}
