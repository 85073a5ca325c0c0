use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Session report commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ReportCommands {
    /// Save or replace the report of an appointment.
    Save(ReportSaveArgs),
    /// Show the report of an appointment.
    Get { appointment: String },
    /// A patient's reports, most recent first.
    List { patient: String },
}

#[derive(Clone, Debug, Args)]
pub struct ReportSaveArgs {
    pub appointment: String,
    #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
    pub text: Option<String>,
    #[arg(long)]
    pub text_file: Option<PathBuf>,
    /// The therapist's raw notes.
    #[arg(long, default_value = "")]
    pub notes: String,
    #[arg(long)]
    pub prompt: Option<String>,
    /// Finalize the report and complete the appointment.
    #[arg(long)]
    pub finalize: bool,
}
