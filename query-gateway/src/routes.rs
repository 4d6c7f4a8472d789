//! Route registration.

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use common::middleware::request_id::request_id_middleware;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::handlers;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Query Gateway API",
        version = "0.1.0",
        description = "SQL query execution middleware"
    ),
    paths(handlers::execute_query, handlers::health_check),
    components(schemas(
        common::models::QueryRequest,
        common::models::QueryResult,
        common::response::ErrorResponse,
        common::response::ErrorDetail,
        handlers::HealthResponse,
    )),
    tags(
        (name = "query", description = "Query execution endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
struct ApiDoc;

/// Endpoint routes. Registering only `post` on `/query` makes axum
/// answer every other method with 405 before the body is read.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/query", post(handlers::execute_query))
        .route("/health", get(handlers::health_check))
}

/// Builds the full application router with middleware layers applied.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router()
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
