use async_trait::async_trait;

use super::domain::{NewPatient, PatientRecord};
use super::errors::PatientError;
use crate::HospitalId;

/// Repository abstraction for cached patient identities.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn find_by_national_id(&self, hospital_id: HospitalId, national_id: &str) -> Result<Option<PatientRecord>, PatientError>;
    async fn find_by_passport_id(&self, hospital_id: HospitalId, passport_id: &str) -> Result<Option<PatientRecord>, PatientError>;
    /// Single atomic insert; `Conflict` when either identifier is already
    /// stored for the hospital.
    async fn create(&self, patient: NewPatient) -> Result<PatientRecord, PatientError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockPatientRepository {
        records: Mutex<Vec<PatientRecord>>,
        fail_lookups: AtomicBool,
        fail_creates: AtomicBool,
        create_attempts: AtomicUsize,
    }

    impl MockPatientRepository {
        /// Lookups return a repository fault instead of a result.
        pub fn fail_lookups(&self, on: bool) {
            self.fail_lookups.store(on, Ordering::SeqCst);
        }

        /// Inserts return a repository fault and store nothing.
        pub fn fail_creates(&self, on: bool) {
            self.fail_creates.store(on, Ordering::SeqCst);
        }

        pub fn create_attempts(&self) -> usize {
            self.create_attempts.load(Ordering::SeqCst)
        }

        pub fn len(&self) -> usize {
            self.records.lock().map(|r| r.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn find<F>(&self, hospital_id: HospitalId, matches: F) -> Result<Option<PatientRecord>, PatientError>
        where
            F: Fn(&PatientRecord) -> bool,
        {
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(PatientError::Repository("mock lookup failure".into()));
            }
            let records = self.records.lock().map_err(poisoned)?;
            Ok(records.iter().find(|r| r.hospital_id == hospital_id && matches(r)).cloned())
        }
    }

    fn poisoned<T>(_: T) -> PatientError {
        PatientError::Repository("mock store lock poisoned".into())
    }

    fn same(a: &Option<String>, b: &Option<String>) -> bool {
        matches!((a, b), (Some(x), Some(y)) if x == y)
    }

    #[async_trait]
    impl PatientRepository for MockPatientRepository {
        async fn find_by_national_id(&self, hospital_id: HospitalId, national_id: &str) -> Result<Option<PatientRecord>, PatientError> {
            self.find(hospital_id, |r| r.profile.national_id.as_deref() == Some(national_id))
        }

        async fn find_by_passport_id(&self, hospital_id: HospitalId, passport_id: &str) -> Result<Option<PatientRecord>, PatientError> {
            self.find(hospital_id, |r| r.profile.passport_id.as_deref() == Some(passport_id))
        }

        async fn create(&self, patient: NewPatient) -> Result<PatientRecord, PatientError> {
            self.create_attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_creates.load(Ordering::SeqCst) {
                return Err(PatientError::Repository("mock write failure".into()));
            }
            if !patient.profile.has_identifier() {
                return Err(PatientError::Validation("national_id or passport_id is required".into()));
            }
            let mut records = self.records.lock().map_err(poisoned)?;
            let clash = records.iter().any(|r| {
                r.hospital_id == patient.hospital_id
                    && (same(&r.profile.national_id, &patient.profile.national_id)
                        || same(&r.profile.passport_id, &patient.profile.passport_id))
            });
            if clash {
                return Err(PatientError::Conflict("identifier already stored for hospital".into()));
            }
            let now = Utc::now();
            let record = PatientRecord {
                id: Uuid::new_v4(),
                hospital_id: patient.hospital_id,
                profile: patient.profile,
                created_at: now,
                updated_at: now,
            };
            records.push(record.clone());
            Ok(record)
        }
    }
}
