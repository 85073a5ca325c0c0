use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<u32>,
    /// Agenda color as `#rrggbb`.
    pub color: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
