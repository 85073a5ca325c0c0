use chrono::{DateTime, Datelike, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Patient {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub birth_date: NaiveDate,
    pub notes: Option<String>,
    pub default_session_fee_cents: Option<i64>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Age in whole years on `today`. Never negative.
    #[must_use]
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        let mut years = today.year() - self.birth_date.year();
        if (today.month(), today.day()) < (self.birth_date.month(), self.birth_date.day()) {
            years -= 1;
        }
        u32::try_from(years).unwrap_or(0)
    }
}

/// Clinical intake record, one per patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Anamnesis {
    pub patient_id: String,
    pub main_diagnosis: Option<String>,
    pub medical_history: Option<String>,
    pub music_preferences: Option<String>,
    pub motor_development: Option<String>,
    pub sensitivities: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A legal guardian or family member responsible for one or more patients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Caregiver {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A caregiver as seen from one patient, with the link attributes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PatientCaregiver {
    #[serde(flatten)]
    pub caregiver: Caregiver,
    pub relationship: Option<String>,
    pub is_primary: bool,
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::Patient;

    fn patient_born(date: NaiveDate) -> Patient {
        Patient {
            id: "pat-1".into(),
            clinic_id: "cln-1".into(),
            name: "Ana".into(),
            birth_date: date,
            notes: None,
            default_session_fee_cents: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn age_counts_completed_years() {
        let p = patient_born(NaiveDate::from_ymd_opt(2018, 6, 15).unwrap());
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap()), 6);
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()), 7);
    }

    #[test]
    fn age_before_birth_is_zero() {
        let p = patient_born(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        assert_eq!(p.age_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()), 0);
    }
}
