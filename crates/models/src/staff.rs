use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::in_transaction;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hospital_id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() {
        return Err(ModelError::Validation("username required".into()));
    }
    if username.len() > 128 {
        return Err(ModelError::Validation("username too long (<=128)".into()));
    }
    Ok(())
}

pub fn validate_hospital_id(hospital_id: i32) -> Result<(), ModelError> {
    if hospital_id <= 0 {
        return Err(ModelError::Validation("hospital_id must be positive".into()));
    }
    Ok(())
}

/// Insert a staff row. A clash on (hospital_id, username) surfaces as
/// [`ModelError::Duplicate`].
pub async fn create(db: &DatabaseConnection, hospital_id: i32, username: &str, password_hash: &str) -> Result<Model, ModelError> {
    validate_hospital_id(hospital_id)?;
    validate_username(username)?;
    if password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        hospital_id: Set(hospital_id),
        username: Set(username.to_string()),
        password_hash: Set(password_hash.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn find_by_username(db: &DatabaseConnection, hospital_id: i32, username: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::HospitalId.eq(hospital_id))
        .filter(Column::Username.eq(username))
        .one(db)
        .await?;
    Ok(found)
}

/// Replace the stored hash for an existing account.
pub async fn update_password(db: &DatabaseConnection, id: Uuid, password_hash: String) -> Result<Model, ModelError> {
    if password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    in_transaction(db, move |txn| {
        Box::pin(async move {
            let mut am: ActiveModel = Entity::find_by_id(id)
                .one(txn)
                .await?
                .ok_or_else(|| ModelError::NotFound("staff member not found".into()))?
                .into();
            am.password_hash = Set(password_hash);
            am.updated_at = Set(Utc::now().into());
            Ok(am.update(txn).await?)
        })
    })
    .await
}
