use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AppointmentStatus, SessionType};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Appointment {
    pub id: String,
    pub clinic_id: String,
    pub patient_id: String,
    pub therapist_id: String,
    pub room_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub session_type: SessionType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    /// Overrides the contract and patient default fee when billing.
    pub session_fee_cents: Option<i64>,
    /// Set once the appointment has been billed.
    pub ledger_entry_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
