use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SubscriptionStatus;

/// A tenant. Every other record except robots and audit entries belongs to one clinic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Clinic {
    pub id: String,
    pub legal_name: String,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub plan: Option<String>,
    /// Maximum number of active therapists the subscription allows.
    pub max_therapists: u32,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub mission: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
