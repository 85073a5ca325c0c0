use clinic_ai::gemini::GeminiClient;
use clinic_ai::{GenerateOptions, Generation, Generator, PromptComposer};
use clinic_core::enums::ReportStatus;
use clinic_db::repos::plan::NewPlan;
use clinic_db::repos::report::ReportDraft;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GenerateCommands;
use crate::cli::subcommands::generate::{GeneratePlanArgs, GenerateReportArgs};
use crate::commands::shared::input::read_text;
use crate::context::AppContext;
use crate::output::output_text;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct GenerateResponse<T: Serialize> {
    #[serde(flatten)]
    generation: Generation,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<T>,
}

/// Handle `clinic generate`.
pub async fn handle(
    action: &GenerateCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        GenerateCommands::Plan(args) => plan(args, ctx, flags).await,
        GenerateCommands::Report(args) => report(args, ctx, flags).await,
    }
}

fn composer(ctx: &AppContext) -> PromptComposer {
    PromptComposer::new(
        ctx.config.anonymization.clone(),
        ctx.config.gemini.default_model.clone(),
    )
    .with_date_format(ctx.config.general.date_format.clone())
}

fn options(no_anonymize: bool) -> GenerateOptions {
    if no_anonymize {
        tracing::warn!("anonymization disabled; real names will be sent to the AI provider");
    }
    GenerateOptions {
        anonymize: !no_anonymize,
    }
}

fn generator(ctx: &AppContext) -> anyhow::Result<Generator<GeminiClient>> {
    let client = GeminiClient::from_config(&ctx.config.gemini)
        .map_err(|error| anyhow::anyhow!("{error}; set CLINIC_GEMINI__API_KEY or gemini.api_key"))?;
    Ok(Generator::new(composer(ctx), client))
}

async fn plan(args: &GeneratePlanArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let opts = options(args.no_anonymize);
    let today = ctx.today();

    if args.dry_run {
        let composed = composer(ctx)
            .compose_plan(&ctx.service, &args.prompt, &args.patient, today, opts)
            .await?;
        return output_text(&composed.prompt, &composed, flags.format);
    }

    let generator = generator(ctx)?;
    let progress = Progress::spinner("generating intervention plan");
    let generation = match generator
        .generate_plan(&ctx.service, &args.prompt, &args.patient, today, opts)
        .await
    {
        Ok(generation) => {
            progress.finish_clear();
            generation
        }
        Err(error) => {
            progress.finish_err("generation failed");
            return Err(error.into());
        }
    };

    let saved = match &args.save {
        Some(title) => Some(
            ctx.service
                .save_plan(&NewPlan {
                    patient_id: args.patient.clone(),
                    prompt_id: Some(args.prompt.clone()),
                    title: title.clone(),
                    original_text: generation.text.clone(),
                    final_text: None,
                    model_label: Some(generation.model.clone()),
                })
                .await?,
        ),
        None => None,
    };

    let text = generation.text.clone();
    output_text(&text, &GenerateResponse { generation, saved }, flags.format)
}

async fn report(args: &GenerateReportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let notes = read_text(args.notes.as_deref(), args.notes_file.as_deref(), "notes")?;
    let opts = options(args.no_anonymize);

    if args.dry_run {
        let composed = composer(ctx)
            .compose_report(&ctx.service, &args.prompt, &args.appointment, &notes, opts)
            .await?;
        return output_text(&composed.prompt, &composed, flags.format);
    }

    let generator = generator(ctx)?;
    let progress = Progress::spinner("generating session report");
    let generation = match generator
        .generate_report(&ctx.service, &args.prompt, &args.appointment, &notes, opts)
        .await
    {
        Ok(generation) => {
            progress.finish_clear();
            generation
        }
        Err(error) => {
            progress.finish_err("generation failed");
            return Err(error.into());
        }
    };

    let status = if args.finalize {
        Some(ReportStatus::Finalized)
    } else if args.save {
        Some(ReportStatus::Draft)
    } else {
        None
    };
    let saved = match status {
        Some(status) => Some(
            ctx.service
                .save_report(&ReportDraft {
                    appointment_id: args.appointment.clone(),
                    prompt_id: Some(args.prompt.clone()),
                    raw_notes: notes,
                    generated_text: generation.text.clone(),
                    status,
                })
                .await?,
        ),
        None => None,
    };

    let text = generation.text.clone();
    output_text(&text, &GenerateResponse { generation, saved }, flags.format)
}
