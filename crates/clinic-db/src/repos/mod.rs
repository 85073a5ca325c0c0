//! Repository modules. Each adds an `impl ClinicService` block for one
//! aggregate and keeps its SQL column list and row mapping private.

pub mod appointment;
pub mod audit;
pub mod backup;
pub mod clinic;
pub mod contract;
pub mod game;
pub mod ledger;
pub mod maintenance;
pub mod patient;
pub mod plan;
pub mod prompt;
pub mod report;
pub mod resource;
pub mod robot;
pub mod room;
pub mod user;
