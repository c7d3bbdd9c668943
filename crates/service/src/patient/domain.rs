use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::HospitalId;

/// Canonical identity fields returned to callers and received from the
/// registry. Carries no hospital scope, ids or timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientProfile {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub passport_id: Option<String>,
    pub first_name_th: String,
    #[serde(default)]
    pub middle_name_th: String,
    pub last_name_th: String,
    pub first_name_en: String,
    #[serde(default)]
    pub middle_name_en: String,
    pub last_name_en: String,
    #[serde(with = "dob_format")]
    pub date_of_birth: NaiveDate,
    pub patient_hn: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    pub gender: String,
}

impl PatientProfile {
    pub fn has_identifier(&self) -> bool {
        self.national_id.is_some() || self.passport_id.is_some()
    }
}

/// A stored identity for one hospital.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: Uuid,
    pub hospital_id: HospitalId,
    pub profile: PatientProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientRecord {
    /// Project to the public shape, dropping id, hospital and timestamps.
    pub fn into_profile(self) -> PatientProfile {
        self.profile
    }
}

/// Identity to cache for `hospital_id`.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub hospital_id: HospitalId,
    pub profile: PatientProfile,
}

/// Search request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub id: String,
}

fn blank_as_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

/// `YYYY-MM-DD` on the wire. RFC 3339 timestamps are accepted on input and
/// reduced to their calendar date.
mod dob_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(date) = NaiveDate::parse_from_str(&raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.date_naive())
            .map_err(|e| D::Error::custom(format!("invalid date_of_birth {raw:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_payload() -> serde_json::Value {
        json!({
            "first_name_th": "สมชาย",
            "middle_name_th": "",
            "last_name_th": "ใจดี",
            "first_name_en": "Somchai",
            "middle_name_en": "",
            "last_name_en": "Jaidee",
            "date_of_birth": "1990-01-01T00:00:00+07:00",
            "patient_hn": "HN12345",
            "national_id": "1234567890123",
            "passport_id": "",
            "phone_number": "0812345678",
            "email": "somchai@example.com",
            "gender": "M"
        })
    }

    #[test]
    fn decodes_registry_payload() {
        let p: PatientProfile = serde_json::from_value(registry_payload()).unwrap();
        assert_eq!(p.national_id.as_deref(), Some("1234567890123"));
        assert_eq!(p.passport_id, None);
        assert_eq!(p.date_of_birth, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert!(p.has_identifier());
    }

    #[test]
    fn missing_optional_fields_default() {
        let mut v = registry_payload();
        let obj = v.as_object_mut().unwrap();
        obj.remove("middle_name_th");
        obj.remove("middle_name_en");
        obj.remove("passport_id");
        obj.insert("date_of_birth".into(), json!("1990-01-01"));

        let p: PatientProfile = serde_json::from_value(v).unwrap();
        assert_eq!(p.middle_name_th, "");
        assert_eq!(p.passport_id, None);
    }

    #[test]
    fn rejects_bad_date() {
        let mut v = registry_payload();
        v["date_of_birth"] = json!("01/01/1990");
        assert!(serde_json::from_value::<PatientProfile>(v).is_err());
    }

    #[test]
    fn serializes_date_only() {
        let p: PatientProfile = serde_json::from_value(registry_payload()).unwrap();
        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(out["date_of_birth"], "1990-01-01");
        assert_eq!(out["passport_id"], serde_json::Value::Null);
    }
}
