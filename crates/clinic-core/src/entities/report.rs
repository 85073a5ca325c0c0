use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ReportStatus;

/// Session report, at most one per appointment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SessionReport {
    pub id: String,
    pub clinic_id: String,
    pub appointment_id: String,
    pub patient_id: String,
    pub therapist_id: String,
    pub prompt_id: Option<String>,
    /// Therapist's free-text notes the report was generated from.
    pub raw_notes: String,
    pub generated_text: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
