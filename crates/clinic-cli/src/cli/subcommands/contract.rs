use clap::{Args, Subcommand};

/// Contract commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ContractCommands {
    /// Create a contract.
    Create(ContractCreateArgs),
    /// List contracts.
    List {
        #[arg(long)]
        patient: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Show a contract.
    Get { id: String },
    /// The patient's active contract, if any.
    Active { patient: String },
    /// Change status: cancelled or finished.
    Status { id: String, status: String },
}

#[derive(Clone, Debug, Args)]
pub struct ContractCreateArgs {
    #[arg(long)]
    pub patient: String,
    #[arg(long)]
    pub therapist: Option<String>,
    /// Caregiver responsible for payment.
    #[arg(long)]
    pub caregiver: Option<String>,
    /// per_session or monthly_fixed
    #[arg(long, default_value = "per_session")]
    pub billing: String,
    /// Amount per session or per month, e.g. 150.00
    #[arg(long)]
    pub amount: String,
    #[arg(long)]
    pub start: String,
    #[arg(long)]
    pub end: Option<String>,
    /// Day of month payments are due.
    #[arg(long, default_value_t = 10)]
    pub due_day: u32,
    #[arg(long)]
    pub notes: Option<String>,
}
