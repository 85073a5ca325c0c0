use clap::{Args, Subcommand};

/// Patient commands.
#[derive(Clone, Debug, Subcommand)]
pub enum PatientCommands {
    /// Register a patient.
    Create {
        #[arg(long)]
        name: String,
        /// Birth date, YYYY-MM-DD.
        #[arg(long)]
        birth_date: String,
        #[arg(long)]
        notes: Option<String>,
        /// Default session fee, e.g. 150.00
        #[arg(long)]
        fee: Option<String>,
    },
    /// Show a patient.
    Get { id: String },
    /// List patients.
    List {
        /// Include inactive patients.
        #[arg(long)]
        all: bool,
    },
    /// Update a patient.
    Update(PatientUpdateArgs),
    /// Delete a patient and their clinical records.
    Delete { id: String },
    /// Show the anamnesis.
    Anamnesis { id: String },
    /// Create or update the anamnesis.
    SetAnamnesis(AnamnesisArgs),
    /// Attach a caregiver.
    AddCaregiver(CaregiverArgs),
    /// List caregivers.
    Caregivers { id: String },
    /// Detach a caregiver.
    RemoveCaregiver { id: String, caregiver: String },
    /// Assign a therapist.
    Link { id: String, therapist: String },
    /// Remove a therapist assignment.
    Unlink { id: String, therapist: String },
    /// Therapists assigned to a patient.
    Therapists { id: String },
    /// Patients assigned to a therapist.
    OfTherapist { therapist: String },
}

#[derive(Clone, Debug, Args)]
pub struct PatientUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub birth_date: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub fee: Option<String>,
    #[arg(long, conflicts_with = "deactivate")]
    pub activate: bool,
    #[arg(long)]
    pub deactivate: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AnamnesisArgs {
    pub id: String,
    #[arg(long)]
    pub diagnosis: Option<String>,
    #[arg(long)]
    pub history: Option<String>,
    #[arg(long)]
    pub music: Option<String>,
    #[arg(long)]
    pub motor: Option<String>,
    #[arg(long)]
    pub sensitivities: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CaregiverArgs {
    pub id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
    #[arg(long)]
    pub relationship: Option<String>,
    #[arg(long)]
    pub primary: bool,
}
