use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use tracing::debug;

use common::types::ApiResponse;
use service::auth::{
    domain::{AuthSession, LoginInput, RegisterInput, StaffAccount},
    repository::StaffRepository,
    session::StaffSession,
    AuthService,
};
use service::patient::{registry::RegistryClient, repository::PatientRepository, PatientService};

use crate::errors::JsonApiError;

pub type StaffAuth = AuthService<dyn StaffRepository>;
pub type PatientSearch = PatientService<dyn PatientRepository, dyn RegistryClient>;

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<StaffAuth>,
    pub patients: Arc<PatientSearch>,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/staff/create",
    tag = "auth",
    request_body = crate::openapi::CreateStaffRequest,
    responses(
        (status = 201, description = "Staff created", body = crate::openapi::StaffEnvelope),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorEnvelope),
        (status = 409, description = "Username taken in this hospital", body = crate::openapi::ErrorEnvelope)
    )
)]
pub async fn create_staff(
    State(state): State<ServerState>,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<StaffAccount>>), JsonApiError> {
    let Json(input) = body?;
    let staff = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(staff))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/staff/login",
    tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = crate::openapi::LoginEnvelope),
        (status = 400, description = "Validation failed", body = crate::openapi::ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorEnvelope)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<Json<ApiResponse<AuthSession>>, JsonApiError> {
    let Json(input) = body?;
    let session = state.auth.login(input).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// Extract the token from `Authorization: Bearer <token>`.
fn bearer_token(header: Option<&str>) -> Result<&str, JsonApiError> {
    let Some(value) = header.filter(|v| !v.is_empty()) else {
        return Err(JsonApiError::unauthorized("authorization header is required"));
    };
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(JsonApiError::unauthorized("invalid authorization header format")),
    }
}

/// Verify the bearer session and attach it to the request as a
/// [`StaffSession`] extension. Handlers take hospital scope from there only.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| JsonApiError::unauthorized("invalid authorization header format"))?,
        ),
        None => None,
    };
    let token = bearer_token(header)?;
    let session = state.auth.verify(token)?;
    debug!(staff_id = %session.staff_id, hospital_id = session.hospital_id, "session verified");

    req.extensions_mut().insert::<StaffSession>(session);
    Ok(next.run(req).await)
}
