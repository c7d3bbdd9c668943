pub mod auth;
pub mod patients;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::{ApiResponse, Health};

use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/api/v1/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthEnvelope)))]
pub async fn health() -> Json<ApiResponse<Health>> {
    Json(ApiResponse::success(Health { status: "ok" }))
}

/// Build the full application router: public auth routes, bearer-protected
/// patient routes, health and API docs.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    // Public API routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/staff/create", post(auth::create_staff))
        .route("/auth/staff/login", post(auth::login));

    // Protected API routes
    let protected = Router::new()
        .route("/patients/search", post(patients::search))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    let api = public.merge(protected).with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // One span per request with method and path, at INFO
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // Status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and transport failures
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
