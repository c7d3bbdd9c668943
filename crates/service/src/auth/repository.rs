use async_trait::async_trait;

use super::domain::{NewStaff, StaffAccount};
use super::errors::AuthError;
use crate::HospitalId;

/// Repository abstraction for staff persistence.
#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn find_by_username(&self, hospital_id: HospitalId, username: &str) -> Result<Option<StaffAccount>, AuthError>;
    /// Fails with `DuplicateAccount` when (hospital, username) is taken.
    async fn create(&self, staff: NewStaff) -> Result<StaffAccount, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    #[derive(Default)]
    pub struct MockStaffRepository {
        staff: Mutex<HashMap<(HospitalId, String), StaffAccount>>, // key: (hospital_id, username)
    }

    impl MockStaffRepository {
        pub fn len(&self) -> usize {
            self.staff.lock().map(|s| s.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    fn poisoned<T>(_: T) -> AuthError {
        AuthError::Repository("mock store lock poisoned".into())
    }

    #[async_trait]
    impl StaffRepository for MockStaffRepository {
        async fn find_by_username(&self, hospital_id: HospitalId, username: &str) -> Result<Option<StaffAccount>, AuthError> {
            let staff = self.staff.lock().map_err(poisoned)?;
            Ok(staff.get(&(hospital_id, username.to_string())).cloned())
        }

        async fn create(&self, new: NewStaff) -> Result<StaffAccount, AuthError> {
            let mut staff = self.staff.lock().map_err(poisoned)?;
            let key = (new.hospital_id, new.username.clone());
            if staff.contains_key(&key) {
                return Err(AuthError::DuplicateAccount);
            }
            let now = Utc::now();
            let account = StaffAccount {
                id: Uuid::new_v4(),
                username: new.username,
                password_hash: new.password_hash,
                hospital_id: new.hospital_id,
                created_at: now,
                updated_at: now,
            };
            staff.insert(key, account.clone());
            Ok(account)
        }
    }
}
