//! Maintenance order update builder.

use clinic_core::enums::MaintenanceStatus;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MaintenanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billed_to_client: Option<bool>,
}

#[derive(Default)]
pub struct MaintenanceUpdateBuilder(MaintenanceUpdate);

impl MaintenanceUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Closing statuses also stamp `closed_at`.
    #[must_use]
    pub const fn status(mut self, status: MaintenanceStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn diagnosis(mut self, diagnosis: Option<String>) -> Self {
        self.0.diagnosis = Some(diagnosis);
        self
    }

    #[must_use]
    pub fn solution(mut self, solution: Option<String>) -> Self {
        self.0.solution = Some(solution);
        self
    }

    #[must_use]
    pub const fn total_cost_cents(mut self, cents: i64) -> Self {
        self.0.total_cost_cents = Some(cents);
        self
    }

    #[must_use]
    pub const fn billed_to_client(mut self, billed: bool) -> Self {
        self.0.billed_to_client = Some(billed);
        self
    }

    #[must_use]
    pub fn build(self) -> MaintenanceUpdate {
        self.0
    }
}
