#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::Service;
use tower_http::cors::CorsLayer;

use server::routes::{self, auth::ServerState};
use service::auth::{
    repository::{mock::MockStaffRepository, StaffRepository},
    session::SessionConfig,
    AuthService, SessionManager,
};
use service::patient::{
    registry::{FixtureRegistryClient, RegistryClient},
    repository::{mock::MockPatientRepository, PatientRepository},
    PatientService,
};

pub const SECRET: &str = "router-test-secret";

/// In-process app over in-memory stores and the fixture registry.
pub struct TestApp {
    pub router: Router,
    pub staff: Arc<MockStaffRepository>,
    pub patients: Arc<MockPatientRepository>,
    pub registry: Arc<FixtureRegistryClient>,
}

impl TestApp {
    pub fn new() -> Self {
        let staff = Arc::new(MockStaffRepository::default());
        let patients = Arc::new(MockPatientRepository::default());
        let registry = Arc::new(FixtureRegistryClient::new());

        let staff_repo: Arc<dyn StaffRepository> = staff.clone();
        let patient_repo: Arc<dyn PatientRepository> = patients.clone();
        let registry_client: Arc<dyn RegistryClient> = registry.clone();

        let sessions = SessionManager::new(SessionConfig::from_hours(SECRET, 24));
        let state = ServerState {
            auth: Arc::new(AuthService::new(staff_repo, sessions)),
            patients: Arc::new(PatientService::new(patient_repo, registry_client)),
        };
        let router = routes::build_router(state, CorsLayer::very_permissive());
        Self { router, staff, patients, registry }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().call(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().method("POST").uri(uri).header("content-type", "application/json");
        if let Some(t) = token {
            req = req.header("authorization", format!("Bearer {t}"));
        }
        self.send(req.body(Body::from(serde_json::to_vec(&body).unwrap())).unwrap()).await
    }

    /// Register and log in a staff member, returning the bearer token.
    pub async fn login_as(&self, username: &str, hospital_id: i32) -> String {
        let creds = serde_json::json!({"username": username, "password": "Sup3rSecret", "hospital_id": hospital_id});
        let (status, _) = self.post_json("/api/v1/auth/staff/create", creds.clone(), None).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.post_json("/api/v1/auth/staff/login", creds, None).await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }
}
