//! Resource update builder.

use clinic_core::enums::ResourceCondition;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapeutic_goals: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<ResourceCondition>,
}

#[derive(Default)]
pub struct ResourceUpdateBuilder(ResourceUpdate);

impl ResourceUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: Option<String>) -> Self {
        self.0.location = Some(location);
        self
    }

    #[must_use]
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.0.quantity = Some(quantity);
        self
    }

    #[must_use]
    pub fn therapeutic_goals(mut self, goals: Option<String>) -> Self {
        self.0.therapeutic_goals = Some(goals);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: ResourceCondition) -> Self {
        self.0.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn build(self) -> ResourceUpdate {
        self.0
    }
}
