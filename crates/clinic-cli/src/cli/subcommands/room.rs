use clap::Subcommand;

/// Room commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RoomCommands {
    /// Create a room.
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
        /// Hex color, e.g. #33aaff
        #[arg(long)]
        color: Option<String>,
    },
    /// List rooms.
    List {
        /// Include inactive rooms.
        #[arg(long)]
        all: bool,
    },
    /// Update a room.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a room.
    Delete { id: String },
}
