use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ModelError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ModelError::Validation(_) => 4001,
            ModelError::NotFound(_) => 4004,
            ModelError::Duplicate(_) => 4009,
            ModelError::Db(_) => 4500,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, ModelError::Duplicate(_))
    }
}

// Unique violations are detected from the driver's structured error, never by
// matching on message text.
impl From<DbErr> for ModelError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => ModelError::Duplicate(detail),
            _ => ModelError::Db(err.to_string()),
        }
    }
}
