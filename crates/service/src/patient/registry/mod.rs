//! External patient registry: the per-hospital system queried on a local miss.

use async_trait::async_trait;
use thiserror::Error;

use super::domain::PatientProfile;

mod fixture;
mod http;

pub use fixture::{fixture_profile, FixtureRegistryClient};
pub use http::HttpRegistryClient;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("patient not found in registry")]
    NotFound,
    #[error("registry transport error: {0}")]
    Transport(String),
    #[error("registry responded with status {0}")]
    Status(u16),
    #[error("registry payload could not be decoded: {0}")]
    Decode(String),
    #[error("registry request timed out")]
    Timeout,
}

impl RegistryError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            RegistryError::NotFound => 3004,
            RegistryError::Transport(_) => 3101,
            RegistryError::Status(_) => 3102,
            RegistryError::Decode(_) => 3103,
            RegistryError::Timeout => 3104,
        }
    }
}

/// Looks a patient up by raw identifier. No retries; callers bound latency.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    async fn search_patient(&self, identifier: &str) -> Result<PatientProfile, RegistryError>;
}
