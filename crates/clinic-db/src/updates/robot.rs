//! Robot update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RobotUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_model: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operational_status: Option<Option<String>>,
}

#[derive(Default)]
pub struct RobotUpdateBuilder(RobotUpdate);

impl RobotUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign to a clinic, or `None` to return the robot to the pool.
    #[must_use]
    pub fn clinic_id(mut self, clinic_id: Option<String>) -> Self {
        self.0.clinic_id = Some(clinic_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn hardware_model(mut self, model: Option<String>) -> Self {
        self.0.hardware_model = Some(model);
        self
    }

    #[must_use]
    pub fn serial_number(mut self, serial: Option<String>) -> Self {
        self.0.serial_number = Some(serial);
        self
    }

    #[must_use]
    pub fn operational_status(mut self, status: Option<String>) -> Self {
        self.0.operational_status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> RobotUpdate {
        self.0
    }
}
