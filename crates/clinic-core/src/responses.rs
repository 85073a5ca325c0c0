//! Response types returned as JSON by `clinic` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::entities::{Appointment, LedgerEntry};

/// Monthly totals from `clinic ledger summary`, in cents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LedgerSummary {
    pub year: i32,
    pub month: u32,
    pub expected_revenue_cents: i64,
    pub realized_revenue_cents: i64,
    pub expected_expense_cents: i64,
    pub realized_expense_cents: i64,
    pub expected_balance_cents: i64,
    pub realized_balance_cents: i64,
}

impl LedgerSummary {
    /// Fill in the balance fields from the revenue and expense totals.
    #[must_use]
    pub const fn with_balances(mut self) -> Self {
        self.expected_balance_cents = self.expected_revenue_cents - self.expected_expense_cents;
        self.realized_balance_cents = self.realized_revenue_cents - self.realized_expense_cents;
        self
    }
}

/// Response from `clinic ledger bill`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BillingOutcome {
    pub ledger_entry: LedgerEntry,
    pub appointment_ids: Vec<String>,
}

/// Response from `clinic appointment create`. Contains every occurrence when
/// weekly recurrence is requested.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AppointmentBatch {
    pub appointments: Vec<Appointment>,
}

/// Response from delete commands that may remove several rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: u32,
}

/// One embedded schema migration, as shipped in a backup.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SchemaMigration {
    pub name: String,
    pub content: String,
}

/// Value of [`BackupSnapshot::kind`].
pub const FULL_SYSTEM_BACKUP: &str = "FULL_SYSTEM_BACKUP";

/// Response from `clinic backup`: the schema plus raw rows of the core tables.
///
/// Rows are column-name maps so a snapshot survives schema additions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BackupSnapshot {
    pub generated_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub schema_migrations: Vec<SchemaMigration>,
    pub clinics: Vec<Map<String, Value>>,
    pub users: Vec<Map<String, Value>>,
    pub patients: Vec<Map<String, Value>>,
    pub appointments: Vec<Map<String, Value>>,
    pub reports: Vec<Map<String, Value>>,
    pub prompts: Vec<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::LedgerSummary;

    #[test]
    fn balances_subtract_expenses() {
        let summary = LedgerSummary {
            year: 2025,
            month: 3,
            expected_revenue_cents: 50_000,
            realized_revenue_cents: 30_000,
            expected_expense_cents: 20_000,
            realized_expense_cents: 5_000,
            ..Default::default()
        }
        .with_balances();
        assert_eq!(summary.expected_balance_cents, 30_000);
        assert_eq!(summary.realized_balance_cents, 25_000);
    }
}
