use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint
///
/// The relay holds no connections of its own, so this reports configuration
/// rather than probing the provider.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();
    services.insert(
        "assistant".to_string(),
        state.config.openai_config().base_url().to_string(),
    );
    services.insert(
        "wire_format".to_string(),
        state.config.relay.wire_format.as_str().to_string(),
    );

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
        timestamp: Utc::now(),
    })
}
