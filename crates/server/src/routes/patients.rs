use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use common::types::ApiResponse;
use service::auth::session::StaffSession;
use service::patient::domain::{PatientProfile, SearchRequest};

use super::auth::ServerState;
use crate::errors::JsonApiError;

#[utoipa::path(
    post,
    path = "/api/v1/patients/search",
    tag = "patients",
    request_body = crate::openapi::SearchPatientRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Patient identity", body = crate::openapi::PatientEnvelope),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorEnvelope),
        (status = 401, description = "Missing or invalid session", body = crate::openapi::ErrorEnvelope),
        (status = 404, description = "Unknown locally and in the registry", body = crate::openapi::ErrorEnvelope),
        (status = 502, description = "Registry unavailable", body = crate::openapi::ErrorEnvelope)
    )
)]
pub async fn search(
    State(state): State<ServerState>,
    Extension(session): Extension<StaffSession>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PatientProfile>>, JsonApiError> {
    let Json(req) = body?;
    let profile = state.patients.search(&req.id, session.hospital_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}
