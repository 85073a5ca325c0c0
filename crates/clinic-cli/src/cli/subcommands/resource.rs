use clap::Subcommand;

/// Resource commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ResourceCommands {
    /// Register a resource.
    Create {
        name: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        goals: Option<String>,
        /// excellent, good, needs_repair, or out_of_service
        #[arg(long, default_value = "good")]
        condition: String,
    },
    /// List resources.
    List {
        /// Include out-of-service resources.
        #[arg(long)]
        all: bool,
    },
    /// Update a resource.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        goals: Option<String>,
        #[arg(long)]
        condition: Option<String>,
    },
    /// Delete a resource.
    Delete { id: String },
}
