//! Session report repository.
//!
//! One report per appointment. Saving again overwrites the text; finalizing
//! marks the appointment completed.

use clinic_core::entities::SessionReport;
use clinic_core::enums::{AppointmentStatus, AuditAction, EntityType, ReportStatus};
use clinic_core::ids::PREFIX_REPORT;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_opt_string, parse_datetime, parse_enum, utc_now};
use crate::service::ClinicService;

const SELECT_COLS: &str = "id, clinic_id, appointment_id, patient_id, therapist_id, prompt_id, \
     raw_notes, generated_text, status, created_at, updated_at";

/// Input for saving a report.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub appointment_id: String,
    pub prompt_id: Option<String>,
    pub raw_notes: String,
    pub generated_text: String,
    pub status: ReportStatus,
}

fn row_to_report(row: &libsql::Row) -> Result<SessionReport, DatabaseError> {
    Ok(SessionReport {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        appointment_id: row.get(2)?,
        patient_id: row.get(3)?,
        therapist_id: row.get(4)?,
        prompt_id: get_opt_string(row, 5)?,
        raw_notes: row.get(6)?,
        generated_text: row.get(7)?,
        status: parse_enum(&row.get::<String>(8)?)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl ClinicService {
    async fn query_reports(
        &self,
        condition: &str,
        value: &str,
        limit: u32,
    ) -> Result<Vec<SessionReport>, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push(condition, value);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM session_reports {}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next().await? {
            reports.push(row_to_report(&row)?);
        }
        Ok(reports)
    }

    /// Create or overwrite the report of an appointment.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when a therapist reports on another
    /// therapist's session, and `DatabaseError::InvalidState` when finalizing
    /// a cancelled or missed session.
    pub async fn save_report(&self, draft: &ReportDraft) -> Result<SessionReport, DatabaseError> {
        let appointment = self.get_appointment(&draft.appointment_id).await?;
        self.ensure_own_agenda(&appointment.therapist_id)?;
        if let Some(ref prompt_id) = draft.prompt_id {
            self.get_prompt(prompt_id).await?;
        }

        let tx = self.db().conn().transaction().await?;
        if draft.status == ReportStatus::Finalized
            && appointment.status != AppointmentStatus::Completed
        {
            self.set_appointment_status(
                &appointment.id,
                AppointmentStatus::Completed,
                Some("report finalized"),
            )
            .await?;
        }

        let now = utc_now();
        let existing = self.get_report_by_appointment(&appointment.id).await?;
        let report = match existing {
            Some(current) => {
                self.db()
                    .execute(
                        "UPDATE session_reports
                         SET prompt_id = ?1, raw_notes = ?2, generated_text = ?3,
                             status = ?4, updated_at = ?5
                         WHERE id = ?6",
                        libsql::params![
                            draft.prompt_id.as_deref(),
                            draft.raw_notes.as_str(),
                            draft.generated_text.as_str(),
                            draft.status.as_str(),
                            fmt_datetime(&now),
                            current.id.as_str()
                        ],
                    )
                    .await?;
                self.record_audit(EntityType::Report, &current.id, AuditAction::Updated, None)
                    .await?;
                SessionReport {
                    prompt_id: draft.prompt_id.clone(),
                    raw_notes: draft.raw_notes.clone(),
                    generated_text: draft.generated_text.clone(),
                    status: draft.status,
                    updated_at: now,
                    ..current
                }
            }
            None => {
                let id = self.db().generate_id(PREFIX_REPORT).await?;
                self.db()
                    .execute(
                        &format!(
                            "INSERT INTO session_reports ({SELECT_COLS})
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"
                        ),
                        libsql::params![
                            id.as_str(),
                            appointment.clinic_id.as_str(),
                            appointment.id.as_str(),
                            appointment.patient_id.as_str(),
                            appointment.therapist_id.as_str(),
                            draft.prompt_id.as_deref(),
                            draft.raw_notes.as_str(),
                            draft.generated_text.as_str(),
                            draft.status.as_str(),
                            fmt_datetime(&now)
                        ],
                    )
                    .await?;
                self.record_audit(EntityType::Report, &id, AuditAction::Created, None)
                    .await?;
                SessionReport {
                    id,
                    clinic_id: appointment.clinic_id,
                    appointment_id: appointment.id,
                    patient_id: appointment.patient_id,
                    therapist_id: appointment.therapist_id,
                    prompt_id: draft.prompt_id.clone(),
                    raw_notes: draft.raw_notes.clone(),
                    generated_text: draft.generated_text.clone(),
                    status: draft.status,
                    created_at: now,
                    updated_at: now,
                }
            }
        };
        tx.commit().await?;
        Ok(report)
    }

    /// The report of an appointment, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_report_by_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<Option<SessionReport>, DatabaseError> {
        Ok(self
            .query_reports("appointment_id =", appointment_id, 1)
            .await?
            .into_iter()
            .next())
    }

    /// A patient's reports, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown patient.
    pub async fn list_reports(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> Result<Vec<SessionReport>, DatabaseError> {
        self.get_patient(patient_id).await?;
        self.query_reports("patient_id =", patient_id, limit).await
    }

    /// The patient's latest finalized reports, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown patient.
    pub async fn recent_finalized_reports(
        &self,
        patient_id: &str,
        count: u32,
    ) -> Result<Vec<SessionReport>, DatabaseError> {
        self.get_patient(patient_id).await?;
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("patient_id =", patient_id);
        filter.push("status =", ReportStatus::Finalized.as_str());
        let sql = format!(
            "SELECT {SELECT_COLS} FROM session_reports {}
             ORDER BY updated_at DESC, rowid DESC LIMIT {count}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut reports = Vec::new();
        while let Some(row) = rows.next().await? {
            reports.push(row_to_report(&row)?);
        }
        Ok(reports)
    }
}
