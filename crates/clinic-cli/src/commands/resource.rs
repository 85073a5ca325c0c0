use clinic_core::enums::ResourceCondition;
use clinic_db::repos::resource::NewResource;
use clinic_db::updates::resource::ResourceUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ResourceCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::{clearable, parse_enum};
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic resource`.
pub async fn handle(
    action: &ResourceCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        ResourceCommands::Create {
            name,
            location,
            quantity,
            goals,
            condition,
        } => {
            let resource = svc
                .create_resource(&NewResource {
                    name: name.clone(),
                    location: location.clone(),
                    quantity: *quantity,
                    therapeutic_goals: goals.clone(),
                    condition: parse_enum::<ResourceCondition>(condition, "condition")?,
                })
                .await?;
            output(&resource, flags.format)
        }
        ResourceCommands::List { all } => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let resources = svc.list_resources(!all, limit).await?;
            output(&json!({ "resources": resources }), flags.format)
        }
        ResourceCommands::Update {
            id,
            name,
            location,
            quantity,
            goals,
            condition,
        } => {
            let mut builder = ResourceUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if let Some(location) = clearable(location.as_ref()) {
                builder = builder.location(location);
            }
            if let Some(quantity) = quantity {
                builder = builder.quantity(*quantity);
            }
            if let Some(goals) = clearable(goals.as_ref()) {
                builder = builder.therapeutic_goals(goals);
            }
            if let Some(raw) = condition {
                builder = builder.condition(parse_enum::<ResourceCondition>(raw, "condition")?);
            }
            output(&svc.update_resource(id, builder.build()).await?, flags.format)
        }
        ResourceCommands::Delete { id } => {
            svc.delete_resource(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
