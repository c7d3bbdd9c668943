use std::fmt;

use super::errors::PatientError;

pub const NATIONAL_ID_LEN: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    NationalId,
    PassportId,
}

impl IdentifierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierKind::NationalId => "national_id",
            IdentifierKind::PassportId => "passport_id",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly 13 ASCII digits is a national id; anything else is a passport id.
pub fn classify(identifier: &str) -> IdentifierKind {
    if identifier.len() == NATIONAL_ID_LEN && identifier.bytes().all(|b| b.is_ascii_digit()) {
        IdentifierKind::NationalId
    } else {
        IdentifierKind::PassportId
    }
}

/// A trimmed, non-empty identifier together with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientIdentifier {
    value: String,
    kind: IdentifierKind,
}

impl PatientIdentifier {
    pub fn parse(raw: &str) -> Result<Self, PatientError> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(PatientError::Validation("identifier is required".into()));
        }
        Ok(Self { kind: classify(value), value: value.to_string() })
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}
