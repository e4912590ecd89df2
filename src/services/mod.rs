/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Scoreboard command handling.
pub mod scoreboard_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
