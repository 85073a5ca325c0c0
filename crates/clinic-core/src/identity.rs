use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// The user on whose behalf a command runs.
///
/// Resolved from the `users` table by `clinic-db` and consumed by every
/// repository for clinic scoping and permission checks.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    /// `None` for master admins, who are not bound to a clinic.
    pub clinic_id: Option<String>,
    pub role: Role,
    pub full_name: String,
}

impl Actor {
    /// Master admins see every clinic; everyone else is scoped to their own.
    #[must_use]
    pub const fn sees_all_clinics(&self) -> bool {
        matches!(self.role, Role::MasterAdmin)
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub const fn is_therapist(&self) -> bool {
        matches!(self.role, Role::Therapist)
    }
}
