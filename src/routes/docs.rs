use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-doc/openapi.json";

/// Serve the Swagger UI backed by the generated OpenAPI document.
pub fn router() -> Router<SharedState> {
    SwaggerUi::new("/docs")
        .url(OPENAPI_PATH, ApiDoc::openapi())
        .into()
}
