use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use super::{RegistryClient, RegistryError};
use crate::patient::domain::PatientProfile;

pub const FIXTURE_NATIONAL_ID: &str = "1234567890123";
pub const FIXTURE_PASSPORT_ID: &str = "AB1234567";

/// The one identity the fixture registry knows about.
pub fn fixture_profile() -> PatientProfile {
    PatientProfile {
        national_id: Some(FIXTURE_NATIONAL_ID.to_string()),
        passport_id: Some(FIXTURE_PASSPORT_ID.to_string()),
        first_name_th: "สมชาย".to_string(),
        middle_name_th: String::new(),
        last_name_th: "ใจดี".to_string(),
        first_name_en: "Somchai".to_string(),
        middle_name_en: String::new(),
        last_name_en: "Jaidee".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN),
        patient_hn: "HN12345".to_string(),
        phone_number: "0812345678".to_string(),
        email: "somchai@example.com".to_string(),
        gender: "M".to_string(),
    }
}

/// In-process registry for local runs and tests. Counts every call.
#[derive(Debug, Default)]
pub struct FixtureRegistryClient {
    calls: AtomicUsize,
}

impl FixtureRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for FixtureRegistryClient {
    async fn search_patient(&self, identifier: &str) -> Result<PatientProfile, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(kind = "fixture", "registry lookup");
        match identifier {
            FIXTURE_NATIONAL_ID | FIXTURE_PASSPORT_ID => Ok(fixture_profile()),
            _ => Err(RegistryError::NotFound),
        }
    }
}
