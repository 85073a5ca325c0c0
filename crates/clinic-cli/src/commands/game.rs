use clinic_db::repos::game::NewGameSession;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GameCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_datetime;
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic game`.
pub async fn handle(
    action: &GameCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        GameCommands::Record {
            patient,
            game,
            difficulty,
            score,
            notes,
            played_at,
        } => {
            let session = svc
                .record_game_session(&NewGameSession {
                    patient_id: patient.clone(),
                    game_name: game.clone(),
                    difficulty: difficulty.clone(),
                    score: *score,
                    notes: notes.clone(),
                    played_at: played_at
                        .as_deref()
                        .map(|raw| parse_datetime(raw, "played-at"))
                        .transpose()?,
                })
                .await?;
            output(&session, flags.format)
        }
        GameCommands::List { patient } => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let sessions = svc.list_game_sessions(patient, limit).await?;
            output(&json!({ "game_sessions": sessions }), flags.format)
        }
    }
}
