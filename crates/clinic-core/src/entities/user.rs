use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// A team member or family account.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// `None` only for master admins.
    pub clinic_id: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Professional curriculum of a therapist. Feeds the `TERAPEUTA_*` prompt variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TherapistProfile {
    pub user_id: String,
    pub professional_registry: Option<String>,
    pub education: Option<String>,
    pub specialties: Option<String>,
    pub preferred_techniques: Option<String>,
    pub preferred_resources: Option<String>,
    pub conducting_style: Option<String>,
    pub clinical_notes: Option<String>,
    pub bio: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
