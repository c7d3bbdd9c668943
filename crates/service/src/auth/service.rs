use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, PasswordVerifier, SaltString},
    Argon2, PasswordHash,
};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, LoginInput, NewStaff, RegisterInput, StaffAccount};
use super::errors::AuthError;
use super::repository::StaffRepository;
use super::session::{SessionError, SessionManager, StaffSession};
use crate::HospitalId;

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Minimum password length, counted in characters.
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { min_password_len: 8 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: StaffRepository + ?Sized> {
    repo: Arc<R>,
    sessions: SessionManager,
    cfg: AuthConfig,
}

impl<R: StaffRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, sessions: SessionManager) -> Self {
        Self::with_config(repo, sessions, AuthConfig::default())
    }

    pub fn with_config(repo: Arc<R>, sessions: SessionManager, cfg: AuthConfig) -> Self {
        Self { repo, sessions, cfg }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Register a staff member with a salted argon2 hash of the password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, SessionManager};
    /// use service::auth::session::SessionConfig;
    /// use service::auth::repository::mock::MockStaffRepository;
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockStaffRepository::default());
    /// let svc = AuthService::new(repo, SessionManager::new(SessionConfig::from_hours("secret", 24)));
    /// let input = RegisterInput { username: "alice".into(), password: "Secret123".into(), hospital_id: 1 };
    /// let staff = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(staff.username, "alice");
    /// assert!(staff.password_hash.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, hospital_id = input.hospital_id))]
    pub async fn register(&self, input: RegisterInput) -> Result<StaffAccount, AuthError> {
        self.validate_register(&input)?;

        if let Some(existing) = self.repo.find_by_username(input.hospital_id, &input.username).await? {
            debug!(staff_id = %existing.id, "username taken");
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = hash_password(input.password).await?;
        // A concurrent registration can still win between lookup and insert;
        // the repository reports that as DuplicateAccount too.
        let staff = self
            .repo
            .create(NewStaff { hospital_id: input.hospital_id, username: input.username, password_hash })
            .await?;
        info!(staff_id = %staff.id, hospital_id = staff.hospital_id, "staff_registered");
        Ok(staff.without_password())
    }

    /// Authenticate a staff member and issue a session token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, SessionManager};
    /// use service::auth::session::SessionConfig;
    /// use service::auth::repository::mock::MockStaffRepository;
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockStaffRepository::default());
    /// let svc = AuthService::new(repo, SessionManager::new(SessionConfig::from_hours("secret", 24)));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "bob".into(), password: "Passw0rd".into(), hospital_id: 3 }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "bob".into(), password: "Passw0rd".into(), hospital_id: 3 })).unwrap();
    /// assert_eq!(svc.verify(&session.token).unwrap().hospital_id, 3);
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, hospital_id = input.hospital_id))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        validate_hospital(input.hospital_id)?;

        let Some(staff) = self.repo.find_by_username(input.hospital_id, &input.username).await? else {
            verify_dummy(input.password).await;
            debug!("unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(input.password, staff.password_hash.clone()).await? {
            warn!(staff_id = %staff.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let (token, expires_at) = self
            .sessions
            .issue(staff.id, staff.hospital_id)
            .map_err(|e| AuthError::TokenError(e.to_string()))?;
        info!(staff_id = %staff.id, hospital_id = staff.hospital_id, "staff_logged_in");
        Ok(AuthSession { token, expires_at })
    }

    /// Verify a bearer token and return the staff identity it binds.
    pub fn verify(&self, token: &str) -> Result<StaffSession, SessionError> {
        self.sessions.verify(token)
    }

    fn validate_register(&self, input: &RegisterInput) -> Result<(), AuthError> {
        if input.username.trim().is_empty() {
            return Err(AuthError::Validation("username is required".into()));
        }
        if input.password.chars().count() < self.cfg.min_password_len {
            return Err(AuthError::Validation(format!(
                "password too short (>={})",
                self.cfg.min_password_len
            )));
        }
        validate_hospital(input.hospital_id)
    }
}

fn validate_hospital(hospital_id: HospitalId) -> Result<(), AuthError> {
    if hospital_id <= 0 {
        return Err(AuthError::Validation("hospital_id must be positive".into()));
    }
    Ok(())
}

/// Argon2 is CPU-bound; run it off the async workers.
async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))?
}

async fn verify_password(password: String, stored: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))?
}

/// Hash checked on the unknown-username path so that it costs the same
/// argon2 work as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"hms-unknown-staff", &salt)
        .map(|h| h.to_string())
        .ok()
});

/// Returns whether a verification actually ran.
async fn verify_dummy(password: String) -> bool {
    tokio::task::spawn_blocking(move || {
        let Some(parsed) = DUMMY_HASH.as_deref().and_then(|h| PasswordHash::new(h).ok()) else {
            return false;
        };
        let _ = Argon2::default().verify_password(password.as_bytes(), &parsed);
        true
    })
    .await
    .unwrap_or(false)
}
