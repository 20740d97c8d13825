use axum::Json;
use utoipa::OpenApi;

use crate::handlers::stream::{self, ChatStreamRequest};
use crate::routes::health::{self, HealthResponse};

#[derive(OpenApi)]
#[openapi(
    info(title = "Counsel relay", description = "Streams assistant replies fragment by fragment"),
    paths(
        health::health_check,
        stream::chat_stream,
        stream::new_thread_stream,
        stream::current_thread_stream,
    ),
    components(schemas(HealthResponse, ChatStreamRequest)),
    tags(
        (name = "health", description = "Service status"),
        (name = "chat", description = "Streamed conversation turns")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
