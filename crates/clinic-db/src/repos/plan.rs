//! Intervention plan repository.

use clinic_core::entities::InterventionPlan;
use clinic_core::enums::{AuditAction, EntityType};
use clinic_core::ids::PREFIX_PLAN;

use crate::error::DatabaseError;
use crate::helpers::{fmt_datetime, get_opt_string, parse_datetime, require_text, utc_now};
use crate::service::ClinicService;

const SELECT_COLS: &str = "id, clinic_id, patient_id, therapist_id, prompt_id, title, \
     original_text, final_text, model_label, created_at, updated_at";

/// Model label stored on plans imported from outside the generator.
pub const IMPORTED_MODEL_LABEL: &str = "imported";

/// Input for saving a generated plan.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub patient_id: String,
    pub prompt_id: Option<String>,
    pub title: String,
    /// Text as returned by the generator.
    pub original_text: String,
    /// Edited text; the original is kept when `None`.
    pub final_text: Option<String>,
    pub model_label: Option<String>,
}

fn row_to_plan(row: &libsql::Row) -> Result<InterventionPlan, DatabaseError> {
    Ok(InterventionPlan {
        id: row.get(0)?,
        clinic_id: row.get(1)?,
        patient_id: row.get(2)?,
        therapist_id: row.get(3)?,
        prompt_id: get_opt_string(row, 4)?,
        title: row.get(5)?,
        original_text: row.get(6)?,
        final_text: row.get(7)?,
        model_label: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl ClinicService {
    /// Save a plan authored by the actor.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank title or text.
    pub async fn save_plan(&self, new: &NewPlan) -> Result<InterventionPlan, DatabaseError> {
        let therapist_id = self.require_staff()?.user_id.clone();
        let title = require_text("plan title", &new.title)?;
        let original_text = require_text("plan text", &new.original_text)?;
        let final_text = match new.final_text {
            Some(ref text) => require_text("plan text", text)?,
            None => original_text,
        };
        let patient = self.get_patient(&new.patient_id).await?;

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_PLAN).await?;
        self.db()
            .execute(
                &format!(
                    "INSERT INTO intervention_plans ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    patient.clinic_id.as_str(),
                    patient.id.as_str(),
                    therapist_id.as_str(),
                    new.prompt_id.as_deref(),
                    title,
                    original_text,
                    final_text,
                    new.model_label.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;
        self.record_audit(EntityType::Plan, &id, AuditAction::Created, None)
            .await?;

        Ok(InterventionPlan {
            id,
            clinic_id: patient.clinic_id,
            patient_id: patient.id,
            therapist_id,
            prompt_id: new.prompt_id.clone(),
            title: title.to_string(),
            original_text: original_text.to_string(),
            final_text: final_text.to_string(),
            model_label: new.model_label.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Store a plan written outside the generator.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank title or text.
    pub async fn import_plan(
        &self,
        patient_id: &str,
        title: &str,
        text: &str,
    ) -> Result<InterventionPlan, DatabaseError> {
        self.save_plan(&NewPlan {
            patient_id: patient_id.to_string(),
            prompt_id: None,
            title: title.to_string(),
            original_text: text.to_string(),
            final_text: None,
            model_label: Some(IMPORTED_MODEL_LABEL.to_string()),
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown or foreign plans.
    pub async fn get_plan(&self, id: &str) -> Result<InterventionPlan, DatabaseError> {
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("id =", id);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM intervention_plans {}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found(EntityType::Plan, id))?;
        row_to_plan(&row)
    }

    /// A patient's plans, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown patient.
    pub async fn list_plans(
        &self,
        patient_id: &str,
        limit: u32,
    ) -> Result<Vec<InterventionPlan>, DatabaseError> {
        self.get_patient(patient_id).await?;
        let mut filter = self.scoped_filter("clinic_id")?;
        filter.push("patient_id =", patient_id);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM intervention_plans {}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut plans = Vec::new();
        while let Some(row) = rows.next().await? {
            plans.push(row_to_plan(&row)?);
        }
        Ok(plans)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for an unknown patient.
    pub async fn latest_plan(&self, patient_id: &str) -> Result<Option<InterventionPlan>, DatabaseError> {
        Ok(self.list_plans(patient_id, 1).await?.into_iter().next())
    }

    /// Replace the edited text of a plan; the generated original is kept.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when a therapist edits a
    /// colleague's plan.
    pub async fn update_plan_text(
        &self,
        plan_id: &str,
        final_text: &str,
    ) -> Result<InterventionPlan, DatabaseError> {
        let current = self.get_plan(plan_id).await?;
        self.ensure_own_agenda(&current.therapist_id)?;
        let final_text = require_text("plan text", final_text)?;

        let now = utc_now();
        self.db()
            .execute(
                "UPDATE intervention_plans SET final_text = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![final_text, fmt_datetime(&now), plan_id],
            )
            .await?;
        self.record_audit(EntityType::Plan, plan_id, AuditAction::Updated, None)
            .await?;

        Ok(InterventionPlan {
            final_text: final_text.to_string(),
            updated_at: now,
            ..current
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Forbidden` when a therapist deletes a
    /// colleague's plan.
    pub async fn delete_plan(&self, plan_id: &str) -> Result<(), DatabaseError> {
        let current = self.get_plan(plan_id).await?;
        self.ensure_own_agenda(&current.therapist_id)?;
        self.db()
            .execute("DELETE FROM intervention_plans WHERE id = ?1", [plan_id])
            .await?;
        self.record_audit(EntityType::Plan, plan_id, AuditAction::Deleted, None)
            .await?;
        Ok(())
    }
}
