//! ID prefixes for generated entity IDs.
//!
//! IDs are produced by the database as `{prefix}-{8 hex chars}`, e.g. `pat-1a2b3c4d`.

pub const PREFIX_CLINIC: &str = "cln";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_PATIENT: &str = "pat";
pub const PREFIX_CAREGIVER: &str = "crg";
pub const PREFIX_ROOM: &str = "rom";
pub const PREFIX_RESOURCE: &str = "rsc";
pub const PREFIX_APPOINTMENT: &str = "apt";
pub const PREFIX_CONTRACT: &str = "ctr";
pub const PREFIX_LEDGER: &str = "led";
pub const PREFIX_ROBOT: &str = "rbt";
pub const PREFIX_MAINTENANCE: &str = "mnt";
pub const PREFIX_GAME_SESSION: &str = "gms";
pub const PREFIX_PROMPT: &str = "prm";
pub const PREFIX_REPORT: &str = "rpt";
pub const PREFIX_PLAN: &str = "pln";
pub const PREFIX_AUDIT: &str = "aud";

/// Every prefix in use, for exhaustive ID tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_CLINIC,
    PREFIX_USER,
    PREFIX_PATIENT,
    PREFIX_CAREGIVER,
    PREFIX_ROOM,
    PREFIX_RESOURCE,
    PREFIX_APPOINTMENT,
    PREFIX_CONTRACT,
    PREFIX_LEDGER,
    PREFIX_ROBOT,
    PREFIX_MAINTENANCE,
    PREFIX_GAME_SESSION,
    PREFIX_PROMPT,
    PREFIX_REPORT,
    PREFIX_PLAN,
    PREFIX_AUDIT,
];
