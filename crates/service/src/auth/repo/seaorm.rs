use sea_orm::DatabaseConnection;

use crate::auth::domain::{NewStaff, StaffAccount};
use crate::auth::errors::AuthError;
use crate::auth::repository::StaffRepository;
use crate::HospitalId;
use models::errors::ModelError;

pub struct SeaOrmStaffRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmStaffRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_model_error(e: ModelError) -> AuthError {
    match e {
        ModelError::Duplicate(_) => AuthError::DuplicateAccount,
        ModelError::Validation(msg) => AuthError::Validation(msg),
        other => AuthError::Repository(other.to_string()),
    }
}

fn to_account(m: models::staff::Model) -> StaffAccount {
    StaffAccount {
        id: m.id,
        username: m.username,
        password_hash: m.password_hash,
        hospital_id: m.hospital_id,
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    }
}

#[async_trait::async_trait]
impl StaffRepository for SeaOrmStaffRepository {
    async fn find_by_username(&self, hospital_id: HospitalId, username: &str) -> Result<Option<StaffAccount>, AuthError> {
        let res = models::staff::find_by_username(&self.db, hospital_id, username)
            .await
            .map_err(map_model_error)?;
        Ok(res.map(to_account))
    }

    async fn create(&self, staff: NewStaff) -> Result<StaffAccount, AuthError> {
        let created = models::staff::create(&self.db, staff.hospital_id, &staff.username, &staff.password_hash)
            .await
            .map_err(map_model_error)?;
        Ok(to_account(created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, scratch_hospital};

    #[tokio::test]
    async fn create_and_find_roundtrip() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmStaffRepository::new(db);
        let hospital = scratch_hospital();

        let created = repo
            .create(NewStaff { hospital_id: hospital, username: "nurse.joy".into(), password_hash: "$argon2id$stub".into() })
            .await
            .unwrap();
        let found = repo.find_by_username(hospital, "nurse.joy").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.password_hash, "$argon2id$stub");
        assert!(repo.find_by_username(hospital + 1, "nurse.joy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_maps_to_duplicate_account() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmStaffRepository::new(db);
        let hospital = scratch_hospital();
        let new = NewStaff { hospital_id: hospital, username: "dup".into(), password_hash: "h".into() };

        repo.create(new.clone()).await.unwrap();
        let err = repo.create(new).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateAccount));
    }
}
