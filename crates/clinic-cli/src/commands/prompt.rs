use clinic_core::enums::PromptCategory;
use clinic_db::repos::prompt::NewPrompt;
use clinic_db::updates::prompt::PromptUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PromptCommands;
use crate::cli::subcommands::prompt::{PromptCreateArgs, PromptUpdateArgs};
use crate::commands::shared::input::{optional_text, read_text};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{clearable, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic prompt`.
pub async fn handle(
    action: &PromptCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        PromptCommands::Create(args) => create(args, ctx, flags).await,
        PromptCommands::Get { id } => output(&svc.get_prompt(id).await?, flags.format),
        PromptCommands::List { category, active } => {
            let category = category
                .as_deref()
                .map(|raw| parse_enum::<PromptCategory>(raw, "category"))
                .transpose()?;
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let prompts = match (category, *active) {
                (Some(category), true) => svc.list_active_prompts(category, limit).await?,
                (category, only_active) => {
                    let mut prompts = svc.list_prompts(category, limit).await?;
                    if only_active {
                        prompts.retain(|prompt| prompt.active);
                    }
                    prompts
                }
            };
            output(&json!({ "prompts": prompts }), flags.format)
        }
        PromptCommands::Update(args) => update(args, ctx, flags).await,
        PromptCommands::Activate { id } => output(&svc.set_prompt_active(id, true).await?, flags.format),
        PromptCommands::Deactivate { id } => {
            output(&svc.set_prompt_active(id, false).await?, flags.format)
        }
        PromptCommands::Delete { id } => {
            svc.delete_prompt(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        PromptCommands::Clone { id } => output(&svc.clone_prompt(id).await?, flags.format),
    }
}

async fn create(args: &PromptCreateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let body = read_text(args.body.as_deref(), args.body_file.as_deref(), "body")?;
    let prompt = ctx
        .service
        .create_prompt(&NewPrompt {
            name: args.name.clone(),
            description: args.description.clone(),
            body,
            model: args.model.clone(),
            temperature: args.temperature,
            category: parse_enum::<PromptCategory>(&args.category, "category")?,
        })
        .await?;
    warn_unknown_placeholders(&prompt.body);
    output(&prompt, flags.format)
}

async fn update(args: &PromptUpdateArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut builder = PromptUpdateBuilder::new();
    if let Some(name) = &args.name {
        builder = builder.name(name.as_str());
    }
    if let Some(raw) = &args.category {
        builder = builder.category(parse_enum::<PromptCategory>(raw, "category")?);
    }
    let body = optional_text(args.body.as_deref(), args.body_file.as_deref())?;
    if let Some(body) = &body {
        builder = builder.body(body.as_str());
    }
    if let Some(description) = clearable(args.description.as_ref()) {
        builder = builder.description(description);
    }
    if let Some(model) = clearable(args.model.as_ref()) {
        builder = builder.model(model);
    }
    if let Some(temperature) = args.temperature {
        builder = builder.temperature(Some(temperature));
    }

    let prompt = ctx.service.update_prompt(&args.id, builder.build()).await?;
    if body.is_some() {
        warn_unknown_placeholders(&prompt.body);
    }
    output(&prompt, flags.format)
}

/// Placeholders outside the catalog render empty at generation time.
fn warn_unknown_placeholders(body: &str) {
    for name in unknown_placeholders(body) {
        tracing::warn!(placeholder = %name, "template uses an unknown variable; it will render empty");
    }
}

fn unknown_placeholders(body: &str) -> Vec<String> {
    clinic_ai::template::placeholders(body)
        .into_iter()
        .filter(|name| clinic_ai::variables::lookup(name).is_none())
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::unknown_placeholders;

    #[test]
    fn flags_only_names_outside_the_catalog() {
        let body = "Paciente: {{NOME}}, {{IDADE}} anos. {{HUMOR}}";
        assert_eq!(unknown_placeholders(body), vec!["HUMOR".to_string()]);
    }
}
