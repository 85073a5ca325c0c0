use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One play-therapy game played by a patient.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GameSession {
    pub id: String,
    pub clinic_id: String,
    pub patient_id: String,
    pub therapist_id: Option<String>,
    pub game_name: String,
    pub difficulty: Option<String>,
    pub score: Option<i64>,
    pub notes: Option<String>,
    pub played_at: DateTime<Utc>,
}
