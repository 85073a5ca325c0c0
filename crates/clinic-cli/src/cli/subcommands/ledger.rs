use clap::Subcommand;

/// Financial ledger commands.
#[derive(Clone, Debug, Subcommand)]
pub enum LedgerCommands {
    /// Record a receivable or payable.
    Add {
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: String,
        /// revenue or expense
        #[arg(long, default_value = "revenue")]
        kind: String,
        #[arg(long)]
        due: String,
        #[arg(long)]
        patient: Option<String>,
        #[arg(long)]
        caregiver: Option<String>,
    },
    /// List entries.
    List {
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Due month, YYYY-MM.
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        patient: Option<String>,
    },
    /// Show an entry.
    Get { id: String },
    /// Mark an entry paid.
    Settle {
        id: String,
        /// Payment method, e.g. pix, cash, card.
        #[arg(long)]
        method: String,
        /// Payment date; defaults to today.
        #[arg(long)]
        paid_on: Option<String>,
    },
    /// Undo a payment.
    Reverse { id: String },
    /// Cancel an entry and release its billed sessions.
    Cancel { id: String },
    /// Monthly revenue and expense summary.
    Summary {
        /// YYYY-MM; defaults to the current month.
        month: Option<String>,
    },
    /// Bill completed sessions into one receivable.
    Bill {
        #[arg(required = true)]
        appointments: Vec<String>,
        /// Contract to bill under; defaults to the patient's active contract.
        #[arg(long)]
        contract: Option<String>,
        /// Reference shown in the description, e.g. 03/2025.
        #[arg(long)]
        reference: String,
    },
}
