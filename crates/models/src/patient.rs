use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter};
use uuid::Uuid;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::in_transaction;
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "patient")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hospital_id: i32,
    pub national_id: Option<String>,
    pub passport_id: Option<String>,
    pub first_name_th: String,
    pub middle_name_th: String,
    pub last_name_th: String,
    pub first_name_en: String,
    pub middle_name_en: String,
    pub last_name_en: String,
    pub date_of_birth: Date,
    pub patient_hn: String,
    pub phone_number: String,
    pub email: String,
    pub gender: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column values for a patient row, without id or timestamps.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientFields {
    pub hospital_id: i32,
    pub national_id: Option<String>,
    pub passport_id: Option<String>,
    pub first_name_th: String,
    pub middle_name_th: String,
    pub last_name_th: String,
    pub first_name_en: String,
    pub middle_name_en: String,
    pub last_name_en: String,
    pub date_of_birth: NaiveDate,
    pub patient_hn: String,
    pub phone_number: String,
    pub email: String,
    pub gender: String,
}

fn present(v: &Option<String>) -> bool {
    v.as_deref().is_some_and(|s| !s.trim().is_empty())
}

pub fn validate(fields: &PatientFields) -> Result<(), ModelError> {
    crate::staff::validate_hospital_id(fields.hospital_id)?;
    if !present(&fields.national_id) && !present(&fields.passport_id) {
        return Err(ModelError::Validation("national_id or passport_id required".into()));
    }
    Ok(())
}

impl PatientFields {
    fn apply(self, am: &mut ActiveModel) {
        am.hospital_id = Set(self.hospital_id);
        am.national_id = Set(self.national_id);
        am.passport_id = Set(self.passport_id);
        am.first_name_th = Set(self.first_name_th);
        am.middle_name_th = Set(self.middle_name_th);
        am.last_name_th = Set(self.last_name_th);
        am.first_name_en = Set(self.first_name_en);
        am.middle_name_en = Set(self.middle_name_en);
        am.last_name_en = Set(self.last_name_en);
        am.date_of_birth = Set(self.date_of_birth);
        am.patient_hn = Set(self.patient_hn);
        am.phone_number = Set(self.phone_number);
        am.email = Set(self.email);
        am.gender = Set(self.gender);
    }
}

/// Insert one patient row as a single statement. A clash on either
/// (hospital_id, national_id) or (hospital_id, passport_id) surfaces as
/// [`ModelError::Duplicate`].
pub async fn create(db: &DatabaseConnection, fields: PatientFields) -> Result<Model, ModelError> {
    validate(&fields)?;
    let now = Utc::now().into();
    let mut am = ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    fields.apply(&mut am);
    Ok(am.insert(db).await?)
}

pub async fn find_by_national_id(db: &DatabaseConnection, hospital_id: i32, national_id: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::HospitalId.eq(hospital_id))
        .filter(Column::NationalId.eq(national_id))
        .one(db)
        .await?;
    Ok(found)
}

pub async fn find_by_passport_id(db: &DatabaseConnection, hospital_id: i32, passport_id: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::HospitalId.eq(hospital_id))
        .filter(Column::PassportId.eq(passport_id))
        .one(db)
        .await?;
    Ok(found)
}

/// Overwrite every column of an existing record.
pub async fn update(db: &DatabaseConnection, id: Uuid, fields: PatientFields) -> Result<Model, ModelError> {
    validate(&fields)?;
    in_transaction(db, move |txn| {
        Box::pin(async move {
            let mut am: ActiveModel = Entity::find_by_id(id)
                .one(txn)
                .await?
                .ok_or_else(|| ModelError::NotFound("patient not found".into()))?
                .into();
            fields.apply(&mut am);
            am.updated_at = Set(Utc::now().into());
            Ok(am.update(txn).await?)
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(hospital_id: i32, national_id: Option<&str>, passport_id: Option<&str>) -> PatientFields {
        PatientFields {
            hospital_id,
            national_id: national_id.map(str::to_string),
            passport_id: passport_id.map(str::to_string),
            first_name_th: "สมชาย".into(),
            middle_name_th: String::new(),
            last_name_th: "ใจดี".into(),
            first_name_en: "Somchai".into(),
            middle_name_en: String::new(),
            last_name_en: "Jaidee".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            patient_hn: "HN12345".into(),
            phone_number: "0812345678".into(),
            email: "somchai@example.com".into(),
            gender: "M".into(),
        }
    }

    #[test]
    fn requires_an_identifier() {
        assert!(validate(&fields(1, Some("1234567890123"), None)).is_ok());
        assert!(validate(&fields(1, None, Some("AB1234567"))).is_ok());
        assert!(validate(&fields(1, None, None)).is_err());
        assert!(validate(&fields(1, Some(" "), Some(""))).is_err());
    }

    #[test]
    fn requires_hospital_scope() {
        assert!(validate(&fields(0, Some("1234567890123"), None)).is_err());
    }
}
