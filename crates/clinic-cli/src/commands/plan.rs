use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PlanCommands;
use crate::commands::shared::input::read_text;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::{output, output_text};

/// Handle `clinic plan`.
pub async fn handle(
    action: &PlanCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        PlanCommands::List { patient } => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let plans = svc.list_plans(patient, limit).await?;
            output(&json!({ "plans": plans }), flags.format)
        }
        PlanCommands::Get { id } => {
            let plan = svc.get_plan(id).await?;
            output_text(&plan.final_text, &plan, flags.format)
        }
        PlanCommands::Edit {
            id,
            text,
            text_file,
        } => {
            let text = read_text(text.as_deref(), text_file.as_deref(), "text")?;
            output(&svc.update_plan_text(id, &text).await?, flags.format)
        }
        PlanCommands::Delete { id } => {
            svc.delete_plan(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        PlanCommands::Import {
            patient,
            title,
            file,
        } => {
            let text = read_text(None, Some(file), "file")?;
            output(&svc.import_plan(patient, title, &text).await?, flags.format)
        }
    }
}
