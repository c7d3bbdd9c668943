use chrono::NaiveDate;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorBody { pub code: u16, pub message: String }

#[derive(ToSchema)]
pub struct ErrorEnvelope { pub success: bool, pub error: ErrorBody }

#[derive(ToSchema)]
pub struct HealthEnvelope { pub success: bool, pub data: HealthResponse }

#[derive(ToSchema)]
pub struct CreateStaffRequest {
    pub username: String,
    /// At least 8 characters.
    pub password: String,
    pub hospital_id: i32,
}

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String, pub hospital_id: i32 }

#[derive(ToSchema)]
pub struct StaffDoc {
    pub id: Uuid,
    pub username: String,
    pub hospital_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct StaffEnvelope { pub success: bool, pub data: StaffDoc }

#[derive(ToSchema)]
pub struct SessionDoc {
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(ToSchema)]
pub struct LoginEnvelope { pub success: bool, pub data: SessionDoc }

#[derive(ToSchema)]
pub struct SearchPatientRequest {
    /// 13-digit national id or passport number.
    pub id: String,
}

#[derive(ToSchema)]
pub struct PatientDoc {
    pub national_id: Option<String>,
    pub passport_id: Option<String>,
    pub first_name_th: String,
    pub middle_name_th: String,
    pub last_name_th: String,
    pub first_name_en: String,
    pub middle_name_en: String,
    pub last_name_en: String,
    pub date_of_birth: NaiveDate,
    pub patient_hn: String,
    pub phone_number: String,
    pub email: String,
    pub gender: String,
}

#[derive(ToSchema)]
pub struct PatientEnvelope { pub success: bool, pub data: PatientDoc }

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme("bearer", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::create_staff,
        crate::routes::auth::login,
        crate::routes::patients::search,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            ErrorEnvelope,
            HealthEnvelope,
            CreateStaffRequest,
            LoginRequest,
            StaffDoc,
            StaffEnvelope,
            SessionDoc,
            LoginEnvelope,
            SearchPatientRequest,
            PatientDoc,
            PatientEnvelope,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "patients")
    )
)]
pub struct ApiDoc;
