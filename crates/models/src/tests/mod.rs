use chrono::NaiveDate;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use crate::db::connect;
use crate::patient::PatientFields;




/// Connect and migrate, or `None` when DB tests are disabled/unreachable.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let db = match connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

/// Hospital ids far from real data so parallel test runs do not collide.
pub(crate) fn scratch_hospital() -> i32 {
    100_000 + (uuid::Uuid::new_v4().as_u128() % 1_000_000) as i32
}

pub(crate) fn unique_national_id() -> String {
    format!("{:013}", uuid::Uuid::new_v4().as_u128() % 10_000_000_000_000)
}

pub(crate) fn patient_fields(hospital_id: i32, national_id: Option<String>, passport_id: Option<String>) -> PatientFields {
    PatientFields {
        hospital_id,
        national_id,
        passport_id,
        first_name_th: "สมหญิง".into(),
        middle_name_th: String::new(),
        last_name_th: "รักดี".into(),
        first_name_en: "Somying".into(),
        middle_name_en: String::new(),
        last_name_en: "Rakdee".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        patient_hn: format!("HN{}", &uuid::Uuid::new_v4().simple().to_string()[..8]),
        phone_number: "0899999999".into(),
        email: "somying@example.com".into(),
        gender: "F".into(),
    }
}
