//! Patient repository: records, anamnesis, caregivers, and therapist links.

use chrono::NaiveDate;

use clinic_core::audit_detail::LinkedDetail;
use clinic_core::entities::{Anamnesis, Caregiver, Patient, PatientCaregiver, User};
use clinic_core::enums::{AuditAction, EntityType, Role};
use clinic_core::ids::{PREFIX_CAREGIVER, PREFIX_PATIENT};

use crate::error::DatabaseError;
use crate::helpers::{SetClause, fmt_date, fmt_datetime, get_bool, get_opt_string, opt_int, opt_text, parse_date, parse_datetime, parse_optional_datetime, require_text, utc_now};
use crate::repos::user::row_to_user;
use crate::service::ClinicService;
use crate::updates::patient::PatientUpdate;

const SELECT_COLS: &str = "id, clinic_id, name, birth_date, notes, default_session_fee_cents, \
     active, created_at, updated_at";

/// Input for registering a patient.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub birth_date: NaiveDate,
    pub notes: Option<String>,
    pub default_session_fee_cents: Option<i64>,
}

/// Input for attaching a caregiver to a patient.
#[derive(Debug, Clone, Default)]
pub struct NewCaregiver {
    pub name: String,
    pub tax_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub relationship: Option<String>,
    pub is_primary: bool,
}

pub(crate) fn row_to_patient(row: &libsql::Row) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        name: row.get(2)?,
        birth_date: parse_date(&row.get::<String>(3)?)?,
        notes: get_opt_string(row, 4)?,
        default_session_fee_cents: row.get::<Option<i64>>(5)?,
        active: get_bool(row, 6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

fn row_to_patient_caregiver(row: &libsql::Row) -> Result<PatientCaregiver, DatabaseError> {
    Ok(PatientCaregiver {
        caregiver: Caregiver {
            id: row.get(0)?,
            clinic_id: row.get(1)?,
            name: row.get(2)?,
            tax_id: get_opt_string(row, 3)?,
            phone: get_opt_string(row, 4)?,
            email: get_opt_string(row, 5)?,
            created_at: parse_datetime(&row.get::<String>(6)?)?,
        },
        relationship: get_opt_string(row, 7)?,
        is_primary: get_bool(row, 8)?,
    })
}

impl ClinicService {
    /// Register a patient in the actor's clinic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for caregivers and
    /// `DatabaseError::Validation` for a blank name or negative fee.
    pub async fn create_patient(&self, new: &NewPatient) -> Result<Patient, DatabaseError> {
        self.require_staff()?;
        let clinic_id = self.require_clinic_id()?;
        let name = require_text("patient name", &new.name)?;
        if new.default_session_fee_cents.is_some_and(|fee| fee < 0) {
            return Err(DatabaseError::Validation(
                "session fee cannot be negative".into(),
            ));
        }

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_PATIENT).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO patients ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)"
                ),
                libsql::params![
                    id.as_str(),
                    clinic_id.as_str(),
                    name,
                    fmt_date(&new.birth_date),
                    new.notes.as_deref(),
                    new.default_session_fee_cents,
                    fmt_datetime(&now)
                ],
            )
            .await?;

        self.record_audit(EntityType::Patient, &id, AuditAction::Created, None)
            .await?;

        Ok(Patient {
            id,
            clinic_id,
            name: name.to_string(),
            birth_date: new.birth_date,
            notes: new.notes.clone(),
            default_session_fee_cents: new.default_session_fee_cents,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetch a patient of the actor's clinic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign patients.
    pub async fn get_patient(&self, id: &str) -> Result<Patient, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!("SELECT {SELECT_COLS} FROM patients {}", filter.where_clause());
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Patient, id))?;
        row_to_patient(&row)
    }

    /// Patients of the actor's clinic, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_patients(
        &self,
        active: Option<bool>,
        limit: u32,
    ) -> Result<Vec<Patient>, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        if let Some(active) = active {
            filter.push("active =", i64::from(active));
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM patients {} ORDER BY name LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut patients = Vec::new();
        while let Some(row) = rows.next().await? {
            patients.push(row_to_patient(&row)?);
        }
        Ok(patients)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the patient is not visible.
    pub async fn update_patient(
        &self,
        patient_id: &str,
        update: PatientUpdate,
    ) -> Result<Patient, DatabaseError> {
        self.require_staff()?;
        self.get_patient(patient_id).await?;

        let mut sets = SetClause::new();
        if let Some(ref name) = update.name {
            sets.set("name", require_text("patient name", name)?);
        }
        if let Some(ref birth_date) = update.birth_date {
            sets.set("birth_date", fmt_date(birth_date));
        }
        if let Some(ref notes) = update.notes {
            sets.set("notes", opt_text(notes.as_deref()));
        }
        if let Some(fee) = update.default_session_fee_cents {
            if fee.is_some_and(|fee| fee < 0) {
                return Err(DatabaseError::Validation(
                    "session fee cannot be negative".into(),
                ));
            }
            sets.set("default_session_fee_cents", opt_int(fee));
        }
        if let Some(active) = update.active {
            sets.set("active", i64::from(active));
        }

        if sets.is_empty() {
            return self.get_patient(patient_id).await;
        }
        sets.set("updated_at", fmt_datetime(&utc_now()));

        let (sql, params) = sets.into_update("patients", patient_id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit_with(EntityType::Patient, patient_id, AuditAction::Updated, &update)
            .await?;
        self.get_patient(patient_id).await
    }

    /// Delete a patient and, by cascade, their clinical records. Admins only.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` for non-admins.
    pub async fn delete_patient(&self, patient_id: &str) -> Result<(), DatabaseError> {
        self.require_admin()?;
        self.get_patient(patient_id).await?;

        self.db()
            .execute("DELETE FROM patients WHERE id = ?1", [patient_id])
            .await?;
        self.record_audit(EntityType::Patient, patient_id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }

    /// Create or replace the patient's anamnesis.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the patient is not visible.
    pub async fn upsert_anamnesis(&self, anamnesis: &Anamnesis) -> Result<Anamnesis, DatabaseError> {
        self.require_staff()?;
        self.get_patient(&anamnesis.patient_id).await?;

        let now = utc_now();
        self.db()
            .execute(
                "INSERT INTO anamnesis (patient_id, main_diagnosis, medical_history, music_preferences,
                     motor_development, sensitivities, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(patient_id) DO UPDATE SET
                     main_diagnosis = excluded.main_diagnosis,
                     medical_history = excluded.medical_history,
                     music_preferences = excluded.music_preferences,
                     motor_development = excluded.motor_development,
                     sensitivities = excluded.sensitivities,
                     updated_at = excluded.updated_at",
                libsql::params![
                    anamnesis.patient_id.as_str(),
                    anamnesis.main_diagnosis.as_deref(),
                    anamnesis.medical_history.as_deref(),
                    anamnesis.music_preferences.as_deref(),
                    anamnesis.motor_development.as_deref(),
                    anamnesis.sensitivities.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;

        self.record_audit(
            EntityType::Anamnesis,
            &anamnesis.patient_id,
            AuditAction::Updated,
            None,
        )
        .await?;

        Ok(Anamnesis {
            updated_at: Some(now),
            ..anamnesis.clone()
        })
    }

    /// The patient's anamnesis, or an empty one when none was recorded.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the patient is not visible.
    pub async fn get_anamnesis(&self, patient_id: &str) -> Result<Anamnesis, DatabaseError> {
        self.get_patient(patient_id).await?;
        let mut rows = self
            .db()
            .query(
                "SELECT patient_id, main_diagnosis, medical_history, music_preferences,
                        motor_development, sensitivities, updated_at
                 FROM anamnesis WHERE patient_id = ?1",
                [patient_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Anamnesis {
                patient_id: row.get(0)?,
                main_diagnosis: get_opt_string(&row, 1)?,
                medical_history: get_opt_string(&row, 2)?,
                music_preferences: get_opt_string(&row, 3)?,
                motor_development: get_opt_string(&row, 4)?,
                sensitivities: get_opt_string(&row, 5)?,
                updated_at: parse_optional_datetime(get_opt_string(&row, 6)?.as_deref())?,
            }),
            None => Ok(Anamnesis {
                patient_id: patient_id.to_string(),
                ..Anamnesis::default()
            }),
        }
    }

    /// Create a caregiver and link them to the patient. A new primary
    /// caregiver demotes the previous one.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name.
    pub async fn add_caregiver(
        &self,
        patient_id: &str,
        new: &NewCaregiver,
    ) -> Result<PatientCaregiver, DatabaseError> {
        self.require_staff()?;
        let patient = self.get_patient(patient_id).await?;
        let name = require_text("caregiver name", &new.name)?;

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_CAREGIVER).await?;
        self.db()
            .execute(
                "INSERT INTO caregivers (id, clinic_id, name, tax_id, phone, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    id.as_str(),
                    patient.clinic_id.as_str(),
                    name,
                    new.tax_id.as_deref(),
                    new.phone.as_deref(),
                    new.email.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;

        if new.is_primary {
            self.db()
                .execute(
                    "UPDATE patient_caregivers SET is_primary = 0 WHERE patient_id = ?1",
                    [patient_id],
                )
                .await?;
        }
        self.db()
            .execute(
                "INSERT INTO patient_caregivers (patient_id, caregiver_id, relationship, is_primary)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![
                    patient_id,
                    id.as_str(),
                    new.relationship.as_deref(),
                    i64::from(new.is_primary)
                ],
            )
            .await?;

        self.record_audit(EntityType::Caregiver, &id, AuditAction::Created, None)
            .await?;
        self.record_audit_with(
            EntityType::Patient,
            patient_id,
            AuditAction::Linked,
            &LinkedDetail {
                target_type: EntityType::Caregiver.as_str().to_string(),
                target_id: id.clone(),
            },
        )
        .await?;

        Ok(PatientCaregiver {
            caregiver: Caregiver {
                id,
                clinic_id: patient.clinic_id,
                name: name.to_string(),
                tax_id: new.tax_id.clone(),
                phone: new.phone.clone(),
                email: new.email.clone(),
                created_at: now,
            },
            relationship: new.relationship.clone(),
            is_primary: new.is_primary,
        })
    }

    /// Caregivers of a patient, primary first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the patient is not visible.
    pub async fn list_patient_caregivers(
        &self,
        patient_id: &str,
    ) -> Result<Vec<PatientCaregiver>, DatabaseError> {
        self.get_patient(patient_id).await?;
        let mut rows = self
            .db()
            .query(
                "SELECT c.id, c.clinic_id, c.name, c.tax_id, c.phone, c.email, c.created_at,
                        pc.relationship, pc.is_primary
                 FROM patient_caregivers pc
                 JOIN caregivers c ON c.id = pc.caregiver_id
                 WHERE pc.patient_id = ?1
                 ORDER BY pc.is_primary DESC, c.name",
                [patient_id],
            )
            .await?;
        let mut caregivers = Vec::new();
        while let Some(row) = rows.next().await? {
            caregivers.push(row_to_patient_caregiver(&row)?);
        }
        Ok(caregivers)
    }

    /// Unlink a caregiver from a patient. The caregiver record is deleted
    /// once no patient references it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the link does not exist.
    pub async fn remove_caregiver(
        &self,
        patient_id: &str,
        caregiver_id: &str,
    ) -> Result<(), DatabaseError> {
        self.require_staff()?;
        self.get_patient(patient_id).await?;

        let removed = self
            .db()
            .execute(
                "DELETE FROM patient_caregivers WHERE patient_id = ?1 AND caregiver_id = ?2",
                [patient_id, caregiver_id],
            )
            .await?;
        if removed == 0 {
            return Err(DatabaseError::not_found(EntityType::Caregiver, caregiver_id));
        }

        self.db()
            .execute(
                "DELETE FROM caregivers WHERE id = ?1
                 AND NOT EXISTS (SELECT 1 FROM patient_caregivers WHERE caregiver_id = ?1)",
                [caregiver_id],
            )
            .await?;

        self.record_audit_with(
            EntityType::Patient,
            patient_id,
            AuditAction::Unlinked,
            &LinkedDetail {
                target_type: EntityType::Caregiver.as_str().to_string(),
                target_id: caregiver_id.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    /// Assign a therapist to a patient. Linking twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if the user is not a therapist.
    pub async fn link_therapist(&self, patient_id: &str, therapist_id: &str) -> Result<(), DatabaseError> {
        self.require_staff()?;
        self.get_patient(patient_id).await?;
        let therapist = self.get_user(therapist_id).await?;
        if therapist.role != Role::Therapist {
            return Err(DatabaseError::Validation(format!(
                "{} is not a therapist",
                therapist.full_name
            )));
        }

        let inserted = self
            .db()
            .execute(
                "INSERT OR IGNORE INTO patient_therapists (patient_id, therapist_id, created_at)
                 VALUES (?1, ?2, ?3)",
                libsql::params![patient_id, therapist_id, fmt_datetime(&utc_now())],
            )
            .await?;
        if inserted > 0 {
            self.record_audit_with(
                EntityType::Patient,
                patient_id,
                AuditAction::Linked,
                &LinkedDetail {
                    target_type: EntityType::User.as_str().to_string(),
                    target_id: therapist_id.to_string(),
                },
            )
            .await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the link does not exist.
    pub async fn unlink_therapist(&self, patient_id: &str, therapist_id: &str) -> Result<(), DatabaseError> {
        self.require_staff()?;
        self.get_patient(patient_id).await?;
        let removed = self
            .db()
            .execute(
                "DELETE FROM patient_therapists WHERE patient_id = ?1 AND therapist_id = ?2",
                [patient_id, therapist_id],
            )
            .await?;
        if removed == 0 {
            return Err(DatabaseError::not_found(EntityType::User, therapist_id));
        }
        self.record_audit_with(
            EntityType::Patient,
            patient_id,
            AuditAction::Unlinked,
            &LinkedDetail {
                target_type: EntityType::User.as_str().to_string(),
                target_id: therapist_id.to_string(),
            },
        )
        .await?;
        Ok(())
    }

    /// Therapists assigned to a patient.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the patient is not visible.
    pub async fn list_patient_therapists(&self, patient_id: &str) -> Result<Vec<User>, DatabaseError> {
        self.get_patient(patient_id).await?;
        let mut rows = self
            .db()
            .query(
                "SELECT u.id, u.clinic_id, u.full_name, u.email, u.phone, u.role, u.active,
                        u.created_at, u.updated_at
                 FROM patient_therapists pt
                 JOIN users u ON u.id = pt.therapist_id
                 WHERE pt.patient_id = ?1
                 ORDER BY u.full_name",
                [patient_id],
            )
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// Active patients assigned to a therapist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the therapist is not visible.
    pub async fn list_therapist_patients(&self, therapist_id: &str) -> Result<Vec<Patient>, DatabaseError> {
        self.get_user(therapist_id).await?;
        let mut rows = self
            .db()
            .query(
                "SELECT p.id, p.clinic_id, p.name, p.birth_date, p.notes, p.default_session_fee_cents,
                        p.active, p.created_at, p.updated_at
                 FROM patient_therapists pt
                 JOIN patients p ON p.id = pt.patient_id
                 WHERE pt.therapist_id = ?1 AND p.active = 1
                 ORDER BY p.name",
                [therapist_id],
            )
            .await?;
        let mut patients = Vec::new();
        while let Some(row) = rows.next().await? {
            patients.push(row_to_patient(&row)?);
        }
        Ok(patients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{birth_date, seed_patient, seed_therapist, test_service};
    use crate::updates::patient::PatientUpdateBuilder;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_patient_roundtrip() {
        let svc = test_service().await;
        let patient = svc
            .create_patient(&NewPatient {
                name: "  Ana Silva ".into(),
                birth_date: birth_date(),
                notes: Some("Gosta de tambores".into()),
                default_session_fee_cents: Some(15_000),
            })
            .await
            .unwrap();

        assert!(patient.id.starts_with("pat-"));
        assert_eq!(patient.name, "Ana Silva");

        let fetched = svc.get_patient(&patient.id).await.unwrap();
        assert_eq!(fetched, patient);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let svc = test_service().await;
        let result = svc
            .create_patient(&NewPatient {
                name: "   ".into(),
                birth_date: birth_date(),
                notes: None,
                default_session_fee_cents: None,
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn list_patients_filters_active() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        seed_patient(&svc, "Bruno Lima").await;
        svc.update_patient(&ana.id, PatientUpdateBuilder::new().active(false).build())
            .await
            .unwrap();

        assert_eq!(svc.list_patients(None, 10).await.unwrap().len(), 2);
        let active = svc.list_patients(Some(true), 10).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Bruno Lima");
    }

    #[tokio::test]
    async fn update_patient_partial() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;

        let updated = svc
            .update_patient(
                &ana.id,
                PatientUpdateBuilder::new()
                    .notes(Some("Nova observação".into()))
                    .default_session_fee_cents(Some(20_000))
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ana Silva");
        assert_eq!(updated.notes.as_deref(), Some("Nova observação"));
        assert_eq!(updated.default_session_fee_cents, Some(20_000));
    }

    #[tokio::test]
    async fn delete_patient_requires_admin() {
        let mut svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;

        svc.act_as(&sam.id).await.unwrap();
        assert!(matches!(
            svc.delete_patient(&ana.id).await,
            Err(DatabaseError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn delete_patient_removes_record() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        svc.delete_patient(&ana.id).await.unwrap();
        assert!(matches!(
            svc.get_patient(&ana.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn anamnesis_upsert_replaces_fields() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;

        let empty = svc.get_anamnesis(&ana.id).await.unwrap();
        assert_eq!(empty.main_diagnosis, None);

        svc.upsert_anamnesis(&Anamnesis {
            patient_id: ana.id.clone(),
            main_diagnosis: Some("TEA".into()),
            music_preferences: Some("Forró".into()),
            ..Anamnesis::default()
        })
        .await
        .unwrap();
        svc.upsert_anamnesis(&Anamnesis {
            patient_id: ana.id.clone(),
            main_diagnosis: Some("TEA nível 1".into()),
            ..Anamnesis::default()
        })
        .await
        .unwrap();

        let fetched = svc.get_anamnesis(&ana.id).await.unwrap();
        assert_eq!(fetched.main_diagnosis.as_deref(), Some("TEA nível 1"));
        assert_eq!(fetched.music_preferences, None);
        assert!(fetched.updated_at.is_some());
    }

    #[tokio::test]
    async fn caregivers_primary_is_unique() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;

        let mother = svc
            .add_caregiver(
                &ana.id,
                &NewCaregiver {
                    name: "Maria Silva".into(),
                    relationship: Some("mãe".into()),
                    is_primary: true,
                    ..NewCaregiver::default()
                },
            )
            .await
            .unwrap();
        svc.add_caregiver(
            &ana.id,
            &NewCaregiver {
                name: "José Silva".into(),
                relationship: Some("pai".into()),
                is_primary: true,
                ..NewCaregiver::default()
            },
        )
        .await
        .unwrap();

        let caregivers = svc.list_patient_caregivers(&ana.id).await.unwrap();
        assert_eq!(caregivers.len(), 2);
        assert_eq!(caregivers[0].caregiver.name, "José Silva");
        assert!(caregivers[0].is_primary);
        assert!(!caregivers[1].is_primary);

        svc.remove_caregiver(&ana.id, &mother.caregiver.id).await.unwrap();
        assert_eq!(svc.list_patient_caregivers(&ana.id).await.unwrap().len(), 1);
        assert!(matches!(
            svc.remove_caregiver(&ana.id, &mother.caregiver.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn therapist_links() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let bruno = seed_patient(&svc, "Bruno Lima").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;

        svc.link_therapist(&ana.id, &sam.id).await.unwrap();
        svc.link_therapist(&ana.id, &sam.id).await.unwrap();
        svc.link_therapist(&bruno.id, &sam.id).await.unwrap();

        let therapists = svc.list_patient_therapists(&ana.id).await.unwrap();
        assert_eq!(therapists.len(), 1);
        assert_eq!(therapists[0].id, sam.id);

        svc.unlink_therapist(&bruno.id, &sam.id).await.unwrap();
        let patients = svc.list_therapist_patients(&sam.id).await.unwrap();
        assert_eq!(patients.len(), 1);
        assert_eq!(patients[0].id, ana.id);
    }

    #[tokio::test]
    async fn linking_non_therapist_fails() {
        let svc = test_service().await;
        let ana = seed_patient(&svc, "Ana Silva").await;
        let admin_id = svc.actor().unwrap().user_id.clone();
        let result = svc.link_therapist(&ana.id, &admin_id).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }
}
