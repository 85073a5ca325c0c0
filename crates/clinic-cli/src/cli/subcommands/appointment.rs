use clap::{Args, Subcommand};

/// Agenda commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AppointmentCommands {
    /// Book an appointment, optionally repeating weekly.
    Create(AppointmentCreateArgs),
    /// List appointments in a time window.
    List {
        /// Window start (YYYY-MM-DD or RFC 3339).
        #[arg(long)]
        from: Option<String>,
        /// Window end, exclusive.
        #[arg(long)]
        to: Option<String>,
        #[arg(long)]
        patient: Option<String>,
        #[arg(long)]
        therapist: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Show an appointment.
    Get { id: String },
    /// Reschedule or edit an appointment.
    Update(AppointmentUpdateArgs),
    /// Change status: scheduled, completed, cancelled, no_show.
    Status {
        id: String,
        status: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Delete an appointment.
    Delete {
        id: String,
        /// Also delete later unbilled appointments of the same patient and therapist.
        #[arg(long)]
        future: bool,
    },
}

#[derive(Clone, Debug, Args)]
pub struct AppointmentCreateArgs {
    #[arg(long)]
    pub patient: String,
    /// Defaults to the acting therapist.
    #[arg(long)]
    pub therapist: Option<String>,
    #[arg(long)]
    pub room: Option<String>,
    /// Start, RFC 3339 or `YYYY-MM-DD HH:MM` (UTC).
    #[arg(long)]
    pub start: String,
    #[arg(long, default_value_t = 50)]
    pub minutes: u32,
    /// individual, pair, or assessment
    #[arg(long, default_value = "individual")]
    pub session_type: String,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub fee: Option<String>,
    /// Repeat weekly through this date (inclusive).
    #[arg(long)]
    pub weekly_until: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AppointmentUpdateArgs {
    pub id: String,
    #[arg(long)]
    pub therapist: Option<String>,
    #[arg(long, conflicts_with = "no_room")]
    pub room: Option<String>,
    #[arg(long)]
    pub no_room: bool,
    #[arg(long)]
    pub start: Option<String>,
    /// New duration; keeps the current one when only `--start` is given.
    #[arg(long)]
    pub minutes: Option<u32>,
    #[arg(long)]
    pub session_type: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub fee: Option<String>,
}
