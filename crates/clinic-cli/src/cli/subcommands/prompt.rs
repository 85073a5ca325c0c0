use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Prompt template commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PromptCommands {
    /// Create a template.
    Create(PromptCreateArgs),
    /// Show a template.
    Get { id: String },
    /// List visible templates.
    List {
        /// plan or report
        #[arg(long)]
        category: Option<String>,
        /// Only active templates.
        #[arg(long)]
        active: bool,
    },
    /// Update a template.
    Update(PromptUpdateArgs),
    /// Make a template available for generation.
    Activate { id: String },
    /// Hide a template from generation.
    Deactivate { id: String },
    /// Delete a template.
    Delete { id: String },
    /// Copy a template into one owned by the actor.
    Clone { id: String },
}

#[derive(Clone, Debug, Args)]
pub struct PromptCreateArgs {
    #[arg(long)]
    pub name: String,
    /// plan or report
    #[arg(long)]
    pub category: String,
    #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
    pub body: Option<String>,
    /// Read the template body from a file.
    #[arg(long)]
    pub body_file: Option<PathBuf>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f64>,
}

#[derive(Clone, Debug, Args)]
pub struct PromptUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,
    #[arg(long)]
    pub body_file: Option<PathBuf>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub temperature: Option<f64>,
}
