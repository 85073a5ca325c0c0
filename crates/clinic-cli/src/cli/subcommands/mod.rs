pub mod appointment;
pub mod clinic;
pub mod contract;
pub mod game;
pub mod generate;
pub mod ledger;
pub mod patient;
pub mod plan;
pub mod prompt;
pub mod report;
pub mod resource;
pub mod robot;
pub mod room;
pub mod team;

pub use appointment::AppointmentCommands;
pub use clinic::ClinicCommands;
pub use contract::ContractCommands;
pub use game::GameCommands;
pub use generate::GenerateCommands;
pub use ledger::LedgerCommands;
pub use patient::PatientCommands;
pub use plan::PlanCommands;
pub use prompt::PromptCommands;
pub use report::ReportCommands;
pub use resource::ResourceCommands;
pub use robot::{MaintenanceCommands, RobotCommands};
pub use room::RoomCommands;
pub use team::TeamCommands;
