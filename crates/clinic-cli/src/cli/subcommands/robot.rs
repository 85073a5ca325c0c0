use clap::Subcommand;

/// Robot commands.
#[derive(Clone, Debug, Subcommand)]
pub enum RobotCommands {
    /// Register a robot by MAC address.
    Register {
        #[arg(long)]
        mac: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        serial: Option<String>,
        /// Owning clinic (master admin only).
        #[arg(long)]
        clinic: Option<String>,
    },
    /// List robots.
    List,
    /// Show a robot.
    Get { id: String },
    /// Update a robot.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        serial: Option<String>,
        #[arg(long)]
        status: Option<String>,
        /// Reassign to a clinic (master admin only).
        #[arg(long)]
        clinic: Option<String>,
    },
    /// Block a robot.
    Block { id: String },
    /// Unblock a robot.
    Unblock { id: String },
    /// Workshop orders for robots.
    Maintenance {
        #[command(subcommand)]
        action: MaintenanceCommands,
    },
}

/// `clinic robot maintenance` commands.
#[derive(Clone, Debug, Subcommand)]
pub enum MaintenanceCommands {
    /// Open an order for a robot.
    Open {
        robot: String,
        /// preventive, corrective, upgrade, preparation or other.
        #[arg(long, default_value = "corrective")]
        kind: String,
        #[arg(long)]
        defect: String,
        /// Keep the robot's operational status untouched.
        #[arg(long)]
        no_hold: bool,
    },
    /// List orders, newest first.
    List {
        /// Only orders still in the workshop.
        #[arg(long, conflicts_with = "status")]
        active: bool,
        #[arg(long)]
        status: Option<String>,
    },
    /// Show an order.
    Get { id: String },
    /// Every order of one robot.
    History { robot: String },
    /// Record diagnosis, solution, cost or a status change.
    Update {
        id: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        diagnosis: Option<String>,
        #[arg(long)]
        solution: Option<String>,
        /// Total cost, e.g. 150.00.
        #[arg(long)]
        cost: Option<String>,
        #[arg(long)]
        billed: Option<bool>,
    },
    /// Complete an order and mark the robot available.
    Close { id: String },
}
