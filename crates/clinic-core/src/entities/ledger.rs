use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{LedgerKind, LedgerStatus};

/// A receivable or payable in the clinic's books.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: String,
    pub clinic_id: String,
    pub description: String,
    pub amount_cents: i64,
    pub kind: LedgerKind,
    pub status: LedgerStatus,
    pub due_date: NaiveDate,
    pub paid_on: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub patient_id: Option<String>,
    pub caregiver_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
