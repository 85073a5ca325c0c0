use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AppointmentCommands, ClinicCommands, ContractCommands, GameCommands, GenerateCommands,
    LedgerCommands, PatientCommands, PlanCommands, PromptCommands, ReportCommands,
    ResourceCommands, RobotCommands, RoomCommands, TeamCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create `.clinic/` with a starter config.
    Init(InitArgs),
    /// Show the resolved configuration.
    Config(ConfigArgs),
    /// First-run setup: create the first clinic and its admin, or a master admin.
    Setup(SetupArgs),
    /// Clinics (tenants).
    Clinic {
        #[command(subcommand)]
        action: ClinicCommands,
    },
    /// Team members and therapist profiles.
    Team {
        #[command(subcommand)]
        action: TeamCommands,
    },
    /// Patients, anamnesis, caregivers, therapist links.
    Patient {
        #[command(subcommand)]
        action: PatientCommands,
    },
    /// Therapy rooms.
    Room {
        #[command(subcommand)]
        action: RoomCommands,
    },
    /// Therapeutic resources (instruments, materials).
    Resource {
        #[command(subcommand)]
        action: ResourceCommands,
    },
    /// Agenda.
    Appointment {
        #[command(subcommand)]
        action: AppointmentCommands,
    },
    /// Patient service contracts.
    Contract {
        #[command(subcommand)]
        action: ContractCommands,
    },
    /// Receivables, payables, billing.
    Ledger {
        #[command(subcommand)]
        action: LedgerCommands,
    },
    /// Therapy robots.
    Robot {
        #[command(subcommand)]
        action: RobotCommands,
    },
    /// Music game sessions.
    Game {
        #[command(subcommand)]
        action: GameCommands,
    },
    /// AI prompt templates.
    Prompt {
        #[command(subcommand)]
        action: PromptCommands,
    },
    /// Generate a plan or report with the AI provider.
    Generate {
        #[command(subcommand)]
        action: GenerateCommands,
    },
    /// Session reports.
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
    /// Intervention plans.
    Plan {
        #[command(subcommand)]
        action: PlanCommands,
    },
    /// Query the audit trail.
    Audit(AuditArgs),
    /// Export every clinic's core data as JSON (master admin only).
    Backup(BackupArgs),
    /// List the `{{VARIABLE}}` names templates may use.
    Variables,
}

/// Arguments for `clinic init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing `.clinic/config.toml`.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `clinic config`.
#[derive(Clone, Debug, Args)]
pub struct ConfigArgs {
    /// Print secrets instead of redacting them.
    #[arg(long)]
    pub show_secrets: bool,
}

/// Arguments for `clinic setup`.
#[derive(Clone, Debug, Args)]
pub struct SetupArgs {
    /// Legal name of the first clinic.
    #[arg(long, required_unless_present = "master")]
    pub clinic: Option<String>,
    #[arg(long)]
    pub admin_name: String,
    #[arg(long)]
    pub admin_email: String,
    /// Create a platform master admin instead of a clinic.
    #[arg(long, conflicts_with = "clinic")]
    pub master: bool,
    #[arg(long)]
    pub max_therapists: Option<u32>,
}

/// Arguments for `clinic audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    /// Only entries recorded by this user.
    #[arg(long, value_name = "USER_ID")]
    pub by: Option<String>,
}

/// Arguments for `clinic backup`.
#[derive(Clone, Debug, Args)]
pub struct BackupArgs {
    /// Write the snapshot to this file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub output: Option<std::path::PathBuf>,
}
