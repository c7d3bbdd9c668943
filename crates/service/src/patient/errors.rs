use thiserror::Error;

use super::registry::RegistryError;

/// Business errors for patient search
#[derive(Debug, Error)]
pub enum PatientError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("patient not found")]
    NotFound,
    #[error("patient registry unavailable: {0}")]
    UpstreamUnavailable(String),
    /// Same identifier already stored for the hospital.
    #[error("patient already exists: {0}")]
    Conflict(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl PatientError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            PatientError::Validation(_) => 2001,
            PatientError::NotFound => 2004,
            PatientError::Conflict(_) => 2009,
            PatientError::UpstreamUnavailable(_) => 2102,
            PatientError::Repository(_) => 2200,
        }
    }
}

impl From<RegistryError> for PatientError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound => PatientError::NotFound,
            other => PatientError::UpstreamUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_collapse_to_not_found_or_unavailable() {
        assert!(matches!(PatientError::from(RegistryError::NotFound), PatientError::NotFound));
        for e in [
            RegistryError::Status(500),
            RegistryError::Transport("refused".into()),
            RegistryError::Decode("eof".into()),
            RegistryError::Timeout,
        ] {
            assert!(matches!(PatientError::from(e), PatientError::UpstreamUnavailable(_)));
        }
    }
}
