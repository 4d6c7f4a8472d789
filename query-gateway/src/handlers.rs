//! HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::models::{QueryRequest, QueryResult};
use common::response::ErrorResponse;

use crate::service::QueryService;
use crate::state::AppState;

/// Execute a SQL query against a configured source
#[utoipa::path(
    post,
    path = "/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Query executed", body = QueryResult),
        (status = 400, description = "Malformed body or empty query", body = ErrorResponse),
        (status = 405, description = "Method not allowed"),
        (status = 500, description = "Unknown source, connection failure or query failure", body = ErrorResponse)
    )
)]
pub async fn execute_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResult>, AppError> {
    let Json(req) =
        payload.map_err(|e| AppError::Validation(format!("invalid request body: {e}")))?;

    tracing::info!(source = req.source, "query received");

    let service = QueryService::new(state.registry.clone(), state.provider.clone());
    let result = service.execute(&req).await?;
    Ok(Json(result))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "query-gateway".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
