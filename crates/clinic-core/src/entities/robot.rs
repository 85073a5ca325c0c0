use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A companion robot device registered by MAC address.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Robot {
    pub id: String,
    /// Unassigned robots have no clinic.
    pub clinic_id: Option<String>,
    pub mac_address: String,
    pub name: String,
    pub hardware_model: Option<String>,
    pub serial_number: Option<String>,
    pub blocked: bool,
    pub operational_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
