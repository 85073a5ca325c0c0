//! Entity structs for all clinic records.
//!
//! Each entity maps to a table in the libSQL schema (`clinic-db/migrations`).
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for JSON
//! output and schema validation.

mod appointment;
mod audit;
mod clinic;
mod contract;
mod game_session;
mod ledger;
mod maintenance;
mod patient;
mod plan;
mod prompt;
mod report;
mod resource;
mod robot;
mod room;
mod user;

pub use appointment::Appointment;
pub use audit::AuditEntry;
pub use clinic::Clinic;
pub use contract::Contract;
pub use game_session::GameSession;
pub use ledger::LedgerEntry;
pub use maintenance::MaintenanceOrder;
pub use patient::{Anamnesis, Caregiver, Patient, PatientCaregiver};
pub use plan::InterventionPlan;
pub use prompt::PromptTemplate;
pub use report::SessionReport;
pub use resource::Resource;
pub use robot::Robot;
pub use room::Room;
pub use user::{TherapistProfile, User};
