//! # clinic-core
//!
//! Core types shared across the clinic crates:
//! - Entity structs for every persisted record (patients, appointments, prompts, ...)
//! - Status enums with state machine transitions
//! - ID prefix constants
//! - The acting user identity used for clinic scoping
//! - Cross-cutting error types
//! - Audit detail payloads and command response types

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod responses;
