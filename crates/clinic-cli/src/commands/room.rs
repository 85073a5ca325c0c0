use clinic_db::updates::room::RoomUpdateBuilder;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RoomCommands;
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::clearable;
use crate::context::AppContext;
use crate::output::output;

/// Handle `clinic room`.
pub async fn handle(
    action: &RoomCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        RoomCommands::Create {
            name,
            description,
            capacity,
            color,
        } => {
            let room = svc
                .create_room(name, description.as_deref(), *capacity, color.as_deref())
                .await?;
            output(&room, flags.format)
        }
        RoomCommands::List { all } => {
            let limit = effective_limit(flags.limit, ctx.default_limit());
            let rooms = svc.list_rooms(!all, limit).await?;
            output(&json!({ "rooms": rooms }), flags.format)
        }
        RoomCommands::Update {
            id,
            name,
            description,
            capacity,
            color,
            active,
        } => {
            let mut builder = RoomUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if let Some(description) = clearable(description.as_ref()) {
                builder = builder.description(description);
            }
            if let Some(capacity) = capacity {
                builder = builder.capacity((*capacity > 0).then_some(*capacity));
            }
            if let Some(color) = clearable(color.as_ref()) {
                builder = builder.color(color);
            }
            if let Some(active) = active {
                builder = builder.active(*active);
            }
            output(&svc.update_room(id, builder.build()).await?, flags.format)
        }
        RoomCommands::Delete { id } => {
            svc.delete_room(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
