use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An intervention plan. `original_text` keeps what the model produced,
/// `final_text` the therapist's edited version.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InterventionPlan {
    pub id: String,
    pub clinic_id: String,
    pub patient_id: String,
    pub therapist_id: String,
    pub prompt_id: Option<String>,
    pub title: String,
    pub original_text: String,
    pub final_text: String,
    pub model_label: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
