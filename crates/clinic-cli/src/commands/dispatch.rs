use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Setup(args) => commands::setup::handle(&args, ctx, flags).await,
        Commands::Clinic { action } => commands::clinic::handle(&action, ctx, flags).await,
        Commands::Team { action } => commands::team::handle(&action, ctx, flags).await,
        Commands::Patient { action } => commands::patient::handle(&action, ctx, flags).await,
        Commands::Room { action } => commands::room::handle(&action, ctx, flags).await,
        Commands::Resource { action } => commands::resource::handle(&action, ctx, flags).await,
        Commands::Appointment { action } => {
            commands::appointment::handle(&action, ctx, flags).await
        }
        Commands::Contract { action } => commands::contract::handle(&action, ctx, flags).await,
        Commands::Ledger { action } => commands::ledger::handle(&action, ctx, flags).await,
        Commands::Robot { action } => commands::robot::handle(&action, ctx, flags).await,
        Commands::Game { action } => commands::game::handle(&action, ctx, flags).await,
        Commands::Prompt { action } => commands::prompt::handle(&action, ctx, flags).await,
        Commands::Generate { action } => commands::generate::handle(&action, ctx, flags).await,
        Commands::Report { action } => commands::report::handle(&action, ctx, flags).await,
        Commands::Plan { action } => commands::plan::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Backup(args) => commands::backup::handle(&args, ctx, flags).await,
        Commands::Init(_) | Commands::Config(_) | Commands::Variables => {
            unreachable!("init/config/variables are pre-dispatched in main")
        }
    }
}
