use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{BillingMode, ContractStatus};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Contract {
    pub id: String,
    pub clinic_id: String,
    pub patient_id: String,
    pub therapist_id: Option<String>,
    pub caregiver_id: Option<String>,
    pub billing: BillingMode,
    /// Monthly amount for `monthly_fixed`, per-session amount for `per_session`.
    pub amount_cents: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Day of month invoices fall due (1-28).
    pub due_day: u32,
    pub status: ContractStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
