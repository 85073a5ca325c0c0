use clinic_core::enums::ReportStatus;
use clinic_db::repos::report::ReportDraft;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ReportCommands;
use crate::cli::subcommands::report::ReportSaveArgs;
use crate::commands::shared::input::read_text;
use crate::commands::shared::limit::effective_limit;
use crate::context::AppContext;
use crate::output::{output, output_text};

/// Handle `clinic report`.
pub async fn handle(
    action: &ReportCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        ReportCommands::Save(args) => save(args, ctx, flags).await,
        ReportCommands::Get { appointment } => match svc.get_report_by_appointment(appointment).await? {
            Some(report) => output_text(&report.generated_text, &report, flags.format),
            None => anyhow::bail!("appointment {appointment} has no report yet"),
        },
        ReportCommands::List { patient } => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let reports = svc.list_reports(patient, limit).await?;
            output(&json!({ "reports": reports }), flags.format)
        }
    }
}

async fn save(args: &ReportSaveArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let text = read_text(args.text.as_deref(), args.text_file.as_deref(), "text")?;
    let status = if args.finalize {
        ReportStatus::Finalized
    } else {
        ReportStatus::Draft
    };
    let report = ctx
        .service
        .save_report(&ReportDraft {
            appointment_id: args.appointment.clone(),
            prompt_id: args.prompt.clone(),
            raw_notes: args.notes.clone(),
            generated_text: text,
            status,
        })
        .await?;
    output(&report, flags.format)
}
