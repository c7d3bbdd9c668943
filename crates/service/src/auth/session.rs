//! Stateless staff sessions: HS256-signed bearer tokens.
//!
//! A token binds a staff id and a hospital id for a fixed lifetime. Nothing is
//! stored server-side; revocation before expiry is not supported.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::HospitalId;

pub const ISSUER: &str = "hms-api";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token encoding failed: {0}")]
    Encode(String),
}

impl SessionError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            SessionError::InvalidSignature => 1301,
            SessionError::Expired => 1302,
            SessionError::NotYetValid => 1303,
            SessionError::Malformed(_) => 1304,
            SessionError::Encode(_) => 1305,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => SessionError::InvalidSignature,
            ErrorKind::ExpiredSignature => SessionError::Expired,
            ErrorKind::ImmatureSignature => SessionError::NotYetValid,
            _ => SessionError::Malformed(err.to_string()),
        }
    }
}

/// Time source for issuing and checking tokens.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable instant. Used by tests and benches.
#[derive(Debug)]
pub struct FixedClock(std::sync::Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(std::sync::Mutex::new(at))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = at;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.0.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[derive(Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub lifetime: Duration,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>, lifetime: Duration) -> Self {
        Self { secret: secret.into(), lifetime }
    }

    /// Lifetime in whole hours. Negative values clamp to zero; values too
    /// large to represent saturate, and `issue` then refuses to mint.
    pub fn from_hours(secret: impl Into<String>, hours: i64) -> Self {
        let secs = (hours.max(0) as u64).checked_mul(3600).unwrap_or(u64::MAX);
        Self::new(secret, Duration::from_secs(secs))
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// Wire claims carried inside the token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub sub: String,
    pub staff_id: Uuid,
    pub hospital_id: HospitalId,
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Identity recovered from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffSession {
    pub staff_id: Uuid,
    pub hospital_id: HospitalId,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<SessionClaims> for StaffSession {
    fn from(c: SessionClaims) -> Self {
        Self { staff_id: c.staff_id, hospital_id: c.hospital_id, issued_at: c.iat, expires_at: c.exp }
    }
}

/// Issues and verifies session tokens with a single shared secret.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    pub fn new(cfg: SessionConfig) -> Self {
        Self::with_clock(cfg, Arc::new(SystemClock))
    }

    pub fn with_clock(cfg: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        // Only HS256 is accepted; a token signed with any other algorithm fails
        // as a signature error. Time bounds are checked against `clock` below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "sub", "iss"]);

        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
            lifetime: cfg.lifetime,
            clock,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mint a token for `staff_id` in `hospital_id`. Returns the token and its
    /// expiry (unix seconds).
    pub fn issue(&self, staff_id: Uuid, hospital_id: HospitalId) -> Result<(String, i64), SessionError> {
        let now = self.clock.now().timestamp();
        let exp = i64::try_from(self.lifetime.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or_else(|| SessionError::Encode("session lifetime overflows expiry".into()))?;
        let claims = SessionClaims {
            sub: staff_id.to_string(),
            staff_id,
            hospital_id,
            iss: ISSUER.to_string(),
            iat: now,
            nbf: now,
            exp,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SessionError::Encode(e.to_string()))?;
        Ok((token, exp))
    }

    /// Check signature, algorithm and time bounds, then return the bound identity.
    pub fn verify(&self, token: &str) -> Result<StaffSession, SessionError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        let claims = data.claims;
        let now = self.clock.now().timestamp();
        if now > claims.exp {
            return Err(SessionError::Expired);
        }
        if now < claims.nbf {
            return Err(SessionError::NotYetValid);
        }
        if claims.sub != claims.staff_id.to_string() {
            return Err(SessionError::Malformed("subject does not match staff id".into()));
        }
        Ok(claims.into())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").field("lifetime", &self.lifetime).finish_non_exhaustive()
    }
}
