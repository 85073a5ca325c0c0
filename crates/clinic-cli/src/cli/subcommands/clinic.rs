use clap::{Args, Subcommand};

/// Clinic commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ClinicCommands {
    /// Create a clinic (master admin).
    Create {
        legal_name: String,
        #[arg(long)]
        trade_name: Option<String>,
        #[arg(long)]
        max_therapists: Option<u32>,
        #[arg(long)]
        plan: Option<String>,
    },
    /// Show a clinic; defaults to the actor's own.
    Get { id: Option<String> },
    /// List clinics (master admin).
    List,
    /// Update clinic profile or subscription fields.
    Update(ClinicUpdateArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ClinicUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub legal_name: Option<String>,
    #[arg(long)]
    pub trade_name: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub mission: Option<String>,
    /// Subscription status (master admin).
    #[arg(long)]
    pub subscription: Option<String>,
    /// Plan name (master admin).
    #[arg(long)]
    pub plan: Option<String>,
    /// Active therapist limit (master admin).
    #[arg(long)]
    pub max_therapists: Option<u32>,
}
