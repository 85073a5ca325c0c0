pub mod appointment;
pub mod audit;
pub mod backup;
pub mod clinic;
pub mod config;
pub mod contract;
pub mod dispatch;
pub mod game;
pub mod generate;
pub mod init;
pub mod ledger;
pub mod patient;
pub mod plan;
pub mod prompt;
pub mod report;
pub mod resource;
pub mod robot;
pub mod room;
pub mod setup;
pub mod shared;
pub mod team;
pub mod variables;
