//! Clinic update builder.

use clinic_core::enums::SubscriptionStatus;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClinicUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_therapists: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<Option<String>>,
}

impl ClinicUpdate {
    /// Whether the update touches subscription fields reserved to master admins.
    #[must_use]
    pub const fn touches_subscription(&self) -> bool {
        self.subscription_status.is_some() || self.plan.is_some() || self.max_therapists.is_some()
    }
}

#[derive(Default)]
pub struct ClinicUpdateBuilder(ClinicUpdate);

impl ClinicUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn legal_name(mut self, legal_name: impl Into<String>) -> Self {
        self.0.legal_name = Some(legal_name.into());
        self
    }

    #[must_use]
    pub fn trade_name(mut self, trade_name: Option<String>) -> Self {
        self.0.trade_name = Some(trade_name);
        self
    }

    #[must_use]
    pub fn tax_id(mut self, tax_id: Option<String>) -> Self {
        self.0.tax_id = Some(tax_id);
        self
    }

    #[must_use]
    pub fn subscription_status(mut self, status: SubscriptionStatus) -> Self {
        self.0.subscription_status = Some(status);
        self
    }

    #[must_use]
    pub fn plan(mut self, plan: Option<String>) -> Self {
        self.0.plan = Some(plan);
        self
    }

    #[must_use]
    pub fn max_therapists(mut self, max: u32) -> Self {
        self.0.max_therapists = Some(max);
        self
    }

    #[must_use]
    pub fn address(mut self, address: Option<String>) -> Self {
        self.0.address = Some(address);
        self
    }

    #[must_use]
    pub fn city(mut self, city: Option<String>) -> Self {
        self.0.city = Some(city);
        self
    }

    #[must_use]
    pub fn state(mut self, state: Option<String>) -> Self {
        self.0.state = Some(state);
        self
    }

    #[must_use]
    pub fn mission(mut self, mission: Option<String>) -> Self {
        self.0.mission = Some(mission);
        self
    }

    #[must_use]
    pub fn build(self) -> ClinicUpdate {
        self.0
    }
}
