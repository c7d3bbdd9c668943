use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::HospitalId;

/// Registration input
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub hospital_id: HospitalId,
}

/// Login input
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
    pub hospital_id: HospitalId,
}

impl std::fmt::Debug for RegisterInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterInput")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("hospital_id", &self.hospital_id)
            .finish()
    }
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("hospital_id", &self.hospital_id)
            .finish()
    }
}

/// Staff account (business view). `password_hash` is only populated between
/// the repository and the auth service and is never serialized.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffAccount {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub hospital_id: HospitalId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffAccount {
    /// Drop the hash before the account leaves the auth service.
    pub fn without_password(mut self) -> Self {
        self.password_hash.clear();
        self
    }
}

impl std::fmt::Debug for StaffAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaffAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("hospital_id", &self.hospital_id)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish_non_exhaustive()
    }
}

/// Account to insert; the hash is already computed.
#[derive(Clone)]
pub struct NewStaff {
    pub hospital_id: HospitalId,
    pub username: String,
    pub password_hash: String,
}

/// Login result (session)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
}
