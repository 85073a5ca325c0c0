//! Prompt template update builder.

use clinic_core::enums::PromptCategory;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PromptCategory>,
}

#[derive(Default)]
pub struct PromptUpdateBuilder(PromptUpdate);

impl PromptUpdateBuilder {
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
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.0.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: Option<String>) -> Self {
        self.0.model = Some(model);
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: Option<f64>) -> Self {
        self.0.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn category(mut self, category: PromptCategory) -> Self {
        self.0.category = Some(category);
        self
    }

    #[must_use]
    pub fn build(self) -> PromptUpdate {
        self.0
    }
}
