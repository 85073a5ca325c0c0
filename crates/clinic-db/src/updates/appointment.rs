//! Appointment update builder.
//!
//! Status is not updatable here; it goes through the state machine in
//! `set_appointment_status`.

use chrono::{DateTime, Utc};
use clinic_core::enums::SessionType;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub therapist_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_type: Option<SessionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_fee_cents: Option<Option<i64>>,
}

#[derive(Default)]
pub struct AppointmentUpdateBuilder(AppointmentUpdate);

impl AppointmentUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn therapist_id(mut self, therapist_id: impl Into<String>) -> Self {
        self.0.therapist_id = Some(therapist_id.into());
        self
    }

    #[must_use]
    pub fn room_id(mut self, room_id: Option<String>) -> Self {
        self.0.room_id = Some(room_id);
        self
    }

    #[must_use]
    pub fn starts_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.0.starts_at = Some(starts_at);
        self
    }

    #[must_use]
    pub fn ends_at(mut self, ends_at: DateTime<Utc>) -> Self {
        self.0.ends_at = Some(ends_at);
        self
    }

    #[must_use]
    pub fn session_type(mut self, session_type: SessionType) -> Self {
        self.0.session_type = Some(session_type);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.0.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn session_fee_cents(mut self, fee: Option<i64>) -> Self {
        self.0.session_fee_cents = Some(fee);
        self
    }

    #[must_use]
    pub fn build(self) -> AppointmentUpdate {
        self.0
    }
}
