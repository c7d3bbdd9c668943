use sea_orm::DatabaseConnection;

use crate::patient::domain::{NewPatient, PatientProfile, PatientRecord};
use crate::patient::errors::PatientError;
use crate::patient::repository::PatientRepository;
use crate::HospitalId;
use models::errors::ModelError;
use models::patient::PatientFields;

pub struct SeaOrmPatientRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmPatientRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn map_model_error(e: ModelError) -> PatientError {
    match e {
        ModelError::Duplicate(detail) => PatientError::Conflict(detail),
        ModelError::Validation(msg) => PatientError::Validation(msg),
        other => PatientError::Repository(other.to_string()),
    }
}

fn to_record(m: models::patient::Model) -> PatientRecord {
    PatientRecord {
        id: m.id,
        hospital_id: m.hospital_id,
        profile: PatientProfile {
            national_id: m.national_id,
            passport_id: m.passport_id,
            first_name_th: m.first_name_th,
            middle_name_th: m.middle_name_th,
            last_name_th: m.last_name_th,
            first_name_en: m.first_name_en,
            middle_name_en: m.middle_name_en,
            last_name_en: m.last_name_en,
            date_of_birth: m.date_of_birth,
            patient_hn: m.patient_hn,
            phone_number: m.phone_number,
            email: m.email,
            gender: m.gender,
        },
        created_at: m.created_at.into(),
        updated_at: m.updated_at.into(),
    }
}

fn to_fields(p: NewPatient) -> PatientFields {
    let NewPatient { hospital_id, profile } = p;
    PatientFields {
        hospital_id,
        national_id: profile.national_id,
        passport_id: profile.passport_id,
        first_name_th: profile.first_name_th,
        middle_name_th: profile.middle_name_th,
        last_name_th: profile.last_name_th,
        first_name_en: profile.first_name_en,
        middle_name_en: profile.middle_name_en,
        last_name_en: profile.last_name_en,
        date_of_birth: profile.date_of_birth,
        patient_hn: profile.patient_hn,
        phone_number: profile.phone_number,
        email: profile.email,
        gender: profile.gender,
    }
}

#[async_trait::async_trait]
impl PatientRepository for SeaOrmPatientRepository {
    async fn find_by_national_id(&self, hospital_id: HospitalId, national_id: &str) -> Result<Option<PatientRecord>, PatientError> {
        let res = models::patient::find_by_national_id(&self.db, hospital_id, national_id)
            .await
            .map_err(map_model_error)?;
        Ok(res.map(to_record))
    }

    async fn find_by_passport_id(&self, hospital_id: HospitalId, passport_id: &str) -> Result<Option<PatientRecord>, PatientError> {
        let res = models::patient::find_by_passport_id(&self.db, hospital_id, passport_id)
            .await
            .map_err(map_model_error)?;
        Ok(res.map(to_record))
    }

    async fn create(&self, patient: NewPatient) -> Result<PatientRecord, PatientError> {
        let created = models::patient::create(&self.db, to_fields(patient))
            .await
            .map_err(map_model_error)?;
        Ok(to_record(created))
    }
}
