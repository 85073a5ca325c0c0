//! Shared test utilities for clinic-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use clinic_core::entities::{Appointment, Patient, User};
    use clinic_core::enums::{Role, SessionType};

    use crate::ClinicDb;
    use crate::repos::appointment::NewAppointment;
    use crate::repos::clinic::NewClinic;
    use crate::repos::patient::NewPatient;
    use crate::repos::user::NewUser;
    use crate::service::ClinicService;

    /// In-memory service with one clinic, acting as its administrator.
    pub async fn test_service() -> ClinicService {
        let db = ClinicDb::open_local(":memory:").await.unwrap();
        let mut svc = ClinicService::from_db(db);
        svc.bootstrap_clinic(
            &NewClinic::named("Clínica Som & Ser"),
            "Helena Costa",
            "helena@example.com",
        )
        .await
        .unwrap();
        svc
    }

    pub fn birth_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 4, 2).unwrap()
    }

    /// 2025-03-10 (a Monday) at `hour`:00 UTC, shifted by `days`.
    pub fn at(days: i64, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap() + Duration::days(days)
    }

    pub async fn seed_therapist(svc: &ClinicService, name: &str) -> User {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        svc.create_user(&NewUser {
            full_name: name.into(),
            email,
            phone: None,
            role: Role::Therapist,
            clinic_id: None,
        })
        .await
        .unwrap()
    }

    pub async fn seed_patient(svc: &ClinicService, name: &str) -> Patient {
        svc.create_patient(&NewPatient {
            name: name.into(),
            birth_date: birth_date(),
            notes: None,
            default_session_fee_cents: None,
        })
        .await
        .unwrap()
    }

    pub fn one_hour(patient_id: &str, therapist_id: &str, start: DateTime<Utc>) -> NewAppointment {
        NewAppointment {
            patient_id: patient_id.into(),
            therapist_id: therapist_id.into(),
            room_id: None,
            starts_at: start,
            ends_at: start + Duration::hours(1),
            session_type: SessionType::Individual,
            notes: None,
            session_fee_cents: None,
            repeat_weekly_until: None,
        }
    }

    pub async fn seed_appointment(
        svc: &ClinicService,
        patient_id: &str,
        therapist_id: &str,
        start: DateTime<Utc>,
    ) -> Appointment {
        let mut batch = svc
            .create_appointments(&one_hour(patient_id, therapist_id, start))
            .await
            .unwrap();
        batch.appointments.remove(0)
    }
}
