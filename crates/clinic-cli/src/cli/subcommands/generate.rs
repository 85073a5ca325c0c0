use std::path::PathBuf;

use clap::{Args, Subcommand};

/// AI generation commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GenerateCommands {
    /// Draft an intervention plan for a patient.
    Plan(GeneratePlanArgs),
    /// Draft the report of one session from the therapist's notes.
    Report(GenerateReportArgs),
}

#[derive(Clone, Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct GeneratePlanArgs {
    #[arg(long)]
    pub prompt: String,
    #[arg(long)]
    pub patient: String,
    /// Print the composed prompt without calling the AI provider.
    #[arg(long)]
    pub dry_run: bool,
    /// Send real names (debugging only).
    #[arg(long)]
    pub no_anonymize: bool,
    /// Store the generated plan under this title.
    #[arg(long)]
    pub save: Option<String>,
}

#[derive(Clone, Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct GenerateReportArgs {
    #[arg(long)]
    pub prompt: String,
    #[arg(long)]
    pub appointment: String,
    /// The therapist's account of the session.
    #[arg(long, conflicts_with = "notes_file", required_unless_present = "notes_file")]
    pub notes: Option<String>,
    #[arg(long)]
    pub notes_file: Option<PathBuf>,
    #[arg(long)]
    pub dry_run: bool,
    #[arg(long)]
    pub no_anonymize: bool,
    /// Store the generated report as a draft.
    #[arg(long)]
    pub save: bool,
    /// Store the generated report as final and complete the appointment.
    #[arg(long, conflicts_with = "save")]
    pub finalize: bool,
}
