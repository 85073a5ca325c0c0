use clap::{Args, Subcommand};

/// Team management commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TeamCommands {
    /// Add a team member.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        /// clinic_admin, therapist, or caregiver
        #[arg(long, default_value = "therapist")]
        role: String,
        /// Target clinic (master admin only).
        #[arg(long)]
        clinic: Option<String>,
    },
    /// List team members.
    List {
        #[arg(long)]
        role: Option<String>,
    },
    /// Show a team member.
    Get { id: String },
    /// Reactivate a team member.
    Activate { id: String },
    /// Deactivate a team member.
    Deactivate { id: String },
    /// Show a therapist's professional profile.
    Profile { id: String },
    /// Create or update a therapist's professional profile.
    SetProfile(ProfileArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ProfileArgs {
    pub id: String,
    #[arg(long)]
    pub registry: Option<String>,
    #[arg(long)]
    pub education: Option<String>,
    #[arg(long)]
    pub specialties: Option<String>,
    #[arg(long)]
    pub techniques: Option<String>,
    #[arg(long)]
    pub resources: Option<String>,
    #[arg(long)]
    pub style: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
}
