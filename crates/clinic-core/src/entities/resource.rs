use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ResourceCondition;

/// A therapy material tracked in the clinic inventory.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub clinic_id: String,
    pub name: String,
    pub location: Option<String>,
    pub quantity: u32,
    pub therapeutic_goals: Option<String>,
    pub condition: ResourceCondition,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
