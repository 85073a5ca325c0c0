use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PromptCategory;

/// A stored AI prompt with `{{VARIABLE}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PromptTemplate {
    pub id: String,
    pub clinic_id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub body: String,
    /// Model identifier; the configured default is used when `None`.
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub category: PromptCategory,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
