use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{MaintenanceKind, MaintenanceStatus};

/// A workshop order for one robot. While an order is open the robot is held
/// out of service.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MaintenanceOrder {
    pub id: String,
    pub robot_id: String,
    pub kind: MaintenanceKind,
    pub status: MaintenanceStatus,
    pub reported_defect: String,
    pub diagnosis: Option<String>,
    pub solution: Option<String>,
    pub total_cost_cents: i64,
    /// Whether the cost was passed on to the clinic.
    pub billed_to_client: bool,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
