//! Health check and service info endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status of the service
    pub status: String,
    /// Service name
    pub service: String,
    /// Version of the service
    pub version: String,
    /// Deployment environment label
    pub environment: String,
}

#[derive(Serialize, ToSchema)]
pub struct ServiceInfoResponse {
    pub name: String,
    pub version: String,
    pub environment: String,
    pub description: String,
}

/// Health check endpoint (liveness only, no dependency check)
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<crate::AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service.name.clone(),
        version: state.config.service.version.clone(),
        environment: state.config.service.environment.clone(),
    })
}

/// Service information endpoint
#[utoipa::path(
    get,
    path = "/info",
    tag = "health",
    responses(
        (status = 200, description = "Service information", body = ServiceInfoResponse)
    )
)]
pub async fn service_info(State(state): State<crate::AppState>) -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        name: state.config.service.name.clone(),
        version: state.config.service.version.clone(),
        environment: state.config.service.environment.clone(),
        description: env!("CARGO_PKG_DESCRIPTION").to_string(),
    })
}
