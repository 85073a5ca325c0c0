//! Status enums, roles, and audit vocabulary.
//!
//! All enums use `snake_case` serialization, which is also the TEXT form stored
//! in SQL. Status enums with state machines provide `allowed_next_states()` so
//! repositories can reject invalid transitions before touching the database.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Access profile of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator. Sees every clinic.
    MasterAdmin,
    ClinicAdmin,
    Therapist,
    Caregiver,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MasterAdmin => "master_admin",
            Self::ClinicAdmin => "clinic_admin",
            Self::Therapist => "therapist",
            Self::Caregiver => "caregiver",
        }
    }

    /// Admin roles may manage team, finances, and every therapist's prompts.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::MasterAdmin | Self::ClinicAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SubscriptionStatus
// ---------------------------------------------------------------------------

/// Billing state of a clinic's platform subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Suspended,
}

impl SubscriptionStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SessionType
// ---------------------------------------------------------------------------

/// Kind of therapy session booked on the agenda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Individual,
    Pair,
    Assessment,
}

impl SessionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Pair => "pair",
            Self::Assessment => "assessment",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AppointmentStatus
// ---------------------------------------------------------------------------

/// Status of an appointment.
///
/// ```text
/// scheduled → completed
///           → cancelled
///           → no_show → scheduled (rebooked)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::Completed, Self::Cancelled, Self::NoShow],
            Self::NoShow => &[Self::Scheduled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BillingMode
// ---------------------------------------------------------------------------

/// How a contract charges the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    PerSession,
    MonthlyFixed,
}

impl BillingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PerSession => "per_session",
            Self::MonthlyFixed => "monthly_fixed",
        }
    }
}

impl fmt::Display for BillingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ContractStatus
// ---------------------------------------------------------------------------

/// Status of a treatment contract.
///
/// ```text
/// active → cancelled
///        → finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Cancelled,
    Finished,
}

impl ContractStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Active => &[Self::Cancelled, Self::Finished],
            Self::Cancelled | Self::Finished => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LedgerKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Revenue,
    Expense,
}

impl LedgerKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LedgerStatus
// ---------------------------------------------------------------------------

/// Status of a ledger entry.
///
/// ```text
/// pending → paid → pending (reversal)
///         → cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    Pending,
    Paid,
    Cancelled,
}

impl LedgerStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Paid, Self::Cancelled],
            Self::Paid => &[Self::Pending],
            Self::Cancelled => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for LedgerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ResourceCondition
// ---------------------------------------------------------------------------

/// Physical condition of a therapy resource (instrument, toy, kit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCondition {
    Excellent,
    Good,
    NeedsRepair,
    OutOfService,
}

impl ResourceCondition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::NeedsRepair => "needs_repair",
            Self::OutOfService => "out_of_service",
        }
    }
}

impl fmt::Display for ResourceCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PromptCategory
// ---------------------------------------------------------------------------

/// What a prompt template generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PromptCategory {
    Plan,
    Report,
}

impl PromptCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ReportStatus
// ---------------------------------------------------------------------------

/// Status of a session report. Saving a report with `Finalized` marks the
/// appointment as completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Draft,
    Finalized,
}

impl ReportStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MaintenanceKind
// ---------------------------------------------------------------------------

/// Reason a robot went into the workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceKind {
    Preventive,
    Corrective,
    Upgrade,
    Preparation,
    Other,
}

impl MaintenanceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preventive => "preventive",
            Self::Corrective => "corrective",
            Self::Upgrade => "upgrade",
            Self::Preparation => "preparation",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MaintenanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MaintenanceStatus
// ---------------------------------------------------------------------------

/// Status of a robot maintenance order.
///
/// ```text
/// open ⇄ in_analysis ⇄ awaiting_part ⇄ in_repair ⇄ testing
///   (any open state) → completed | cancelled
/// ```
///
/// Work can move freely between the open states; `completed` and
/// `cancelled` close the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Open,
    InAnalysis,
    AwaitingPart,
    InRepair,
    Testing,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    /// States in which the robot is still in the workshop.
    pub const ACTIVE: &'static [Self] = &[
        Self::Open,
        Self::InAnalysis,
        Self::AwaitingPart,
        Self::InRepair,
        Self::Testing,
    ];

    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        !self.is_closed() && self != next
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InAnalysis => "in_analysis",
            Self::AwaitingPart => "awaiting_part",
            Self::InRepair => "in_repair",
            Self::Testing => "testing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    Linked,
    Unlinked,
    Billed,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::Linked => "linked",
            Self::Unlinked => "unlinked",
            Self::Billed => "billed",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Clinic,
    User,
    TherapistProfile,
    Patient,
    Anamnesis,
    Caregiver,
    Room,
    Resource,
    Appointment,
    Contract,
    LedgerEntry,
    Robot,
    MaintenanceOrder,
    GameSession,
    Prompt,
    Report,
    Plan,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clinic => "clinic",
            Self::User => "user",
            Self::TherapistProfile => "therapist_profile",
            Self::Patient => "patient",
            Self::Anamnesis => "anamnesis",
            Self::Caregiver => "caregiver",
            Self::Room => "room",
            Self::Resource => "resource",
            Self::Appointment => "appointment",
            Self::Contract => "contract",
            Self::LedgerEntry => "ledger_entry",
            Self::Robot => "robot",
            Self::MaintenanceOrder => "maintenance_order",
            Self::GameSession => "game_session",
            Self::Prompt => "prompt",
            Self::Report => "report",
            Self::Plan => "plan",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(role_master_admin, Role, Role::MasterAdmin, "master_admin");
    test_serde_roundtrip!(role_therapist, Role, Role::Therapist, "therapist");
    test_serde_roundtrip!(
        appointment_no_show,
        AppointmentStatus,
        AppointmentStatus::NoShow,
        "no_show"
    );
    test_serde_roundtrip!(
        billing_monthly_fixed,
        BillingMode,
        BillingMode::MonthlyFixed,
        "monthly_fixed"
    );
    test_serde_roundtrip!(
        resource_needs_repair,
        ResourceCondition,
        ResourceCondition::NeedsRepair,
        "needs_repair"
    );
    test_serde_roundtrip!(
        entity_type_ledger_entry,
        EntityType,
        EntityType::LedgerEntry,
        "ledger_entry"
    );
    test_serde_roundtrip!(
        audit_status_changed,
        AuditAction,
        AuditAction::StatusChanged,
        "status_changed"
    );

    #[test]
    fn admin_roles() {
        assert!(Role::MasterAdmin.is_admin());
        assert!(Role::ClinicAdmin.is_admin());
        assert!(!Role::Therapist.is_admin());
        assert!(!Role::Caregiver.is_admin());
    }

    #[test]
    fn appointment_valid_transitions() {
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Completed));
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Cancelled));
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::NoShow));
        assert!(AppointmentStatus::NoShow.can_transition_to(AppointmentStatus::Scheduled));
    }

    #[test]
    fn appointment_terminal_states() {
        assert!(AppointmentStatus::Completed.allowed_next_states().is_empty());
        assert!(AppointmentStatus::Cancelled.allowed_next_states().is_empty());
        assert!(!AppointmentStatus::NoShow.can_transition_to(AppointmentStatus::Completed));
    }

    #[test]
    fn ledger_transitions() {
        assert!(LedgerStatus::Pending.can_transition_to(LedgerStatus::Paid));
        assert!(LedgerStatus::Paid.can_transition_to(LedgerStatus::Pending));
        assert!(LedgerStatus::Pending.can_transition_to(LedgerStatus::Cancelled));
        assert!(!LedgerStatus::Paid.can_transition_to(LedgerStatus::Cancelled));
        assert!(!LedgerStatus::Cancelled.can_transition_to(LedgerStatus::Pending));
    }

    #[test]
    fn contract_transitions() {
        assert!(ContractStatus::Active.can_transition_to(ContractStatus::Finished));
        assert!(ContractStatus::Active.can_transition_to(ContractStatus::Cancelled));
        assert!(!ContractStatus::Finished.can_transition_to(ContractStatus::Active));
    }

    #[test]
    fn maintenance_orders_close_once() {
        assert!(MaintenanceStatus::Open.can_transition_to(MaintenanceStatus::InRepair));
        assert!(MaintenanceStatus::Testing.can_transition_to(MaintenanceStatus::InRepair));
        assert!(MaintenanceStatus::AwaitingPart.can_transition_to(MaintenanceStatus::Cancelled));
        assert!(!MaintenanceStatus::Completed.can_transition_to(MaintenanceStatus::Open));
        assert!(!MaintenanceStatus::Cancelled.can_transition_to(MaintenanceStatus::Completed));
        assert!(MaintenanceStatus::ACTIVE.iter().all(|s| !s.is_closed()));
    }

    test_serde_roundtrip!(
        maintenance_awaiting_part,
        MaintenanceStatus,
        MaintenanceStatus::AwaitingPart,
        "awaiting_part"
    );

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", Role::ClinicAdmin), "clinic_admin");
        assert_eq!(format!("{}", SessionType::Assessment), "assessment");
        assert_eq!(format!("{}", LedgerKind::Expense), "expense");
        assert_eq!(format!("{}", PromptCategory::Report), "report");
        assert_eq!(format!("{}", ReportStatus::Finalized), "finalized");
        assert_eq!(format!("{}", SubscriptionStatus::Trial), "trial");
        assert_eq!(format!("{}", EntityType::TherapistProfile), "therapist_profile");
        assert_eq!(format!("{}", EntityType::MaintenanceOrder), "maintenance_order");
        assert_eq!(format!("{}", MaintenanceKind::Preventive), "preventive");
    }
}
