use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scoreboard::scoreboard,
        crate::routes::sse::scoreboard_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::scoreboard::ScoreboardResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoreboard", description = "Match state and commands"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
