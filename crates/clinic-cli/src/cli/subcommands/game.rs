use clap::Subcommand;

/// Game session commands.
#[derive(Clone, Debug, Subcommand)]
pub enum GameCommands {
    /// Record a game played by a patient.
    Record {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        game: String,
        #[arg(long)]
        difficulty: Option<String>,
        #[arg(long)]
        score: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
        /// When it was played; defaults to now.
        #[arg(long)]
        played_at: Option<String>,
    },
    /// A patient's games, newest first.
    List { patient: String },
}
