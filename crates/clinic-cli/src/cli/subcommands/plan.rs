use std::path::PathBuf;

use clap::Subcommand;

/// Intervention plan commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PlanCommands {
    /// A patient's plans, newest first.
    List { patient: String },
    /// Show a plan.
    Get { id: String },
    /// Replace the edited text of a plan.
    Edit {
        id: String,
        #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
        text: Option<String>,
        #[arg(long)]
        text_file: Option<PathBuf>,
    },
    /// Delete a plan.
    Delete { id: String },
    /// Import a plan written outside the system.
    Import {
        patient: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        file: PathBuf,
    },
}
